//! Data written to the collection by the seed command.

use anyhow::{Context, Result};
use chrono::Utc;
use image_catalog::{CollectionResponse, arch_in_tag, fixtures};
use log::debug;
use std::path::Path;

/// Load the seed payload from `path`, or fall back to the built-in data set
///
/// Tags without an `arch` list get one derived from their name; a missing
/// `updated` timestamp is set to now.
pub fn load_seed(path: Option<&Path>) -> Result<CollectionResponse> {
    let Some(path) = path else {
        debug!("No seed file configured, seeding the built-in data set");
        return Ok(fixtures::mock_images());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let mut payload: CollectionResponse = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    fill_missing_architectures(&mut payload);
    payload.updated_at.get_or_insert_with(Utc::now);
    debug!(
        "Loaded {} repositories from {}",
        payload.images.len(),
        path.display()
    );

    Ok(payload)
}

fn fill_missing_architectures(payload: &mut CollectionResponse) {
    for tag in payload
        .images
        .iter_mut()
        .flat_map(|image| image.tags.iter_mut())
        .filter(|tag| tag.architectures.is_empty())
    {
        tag.architectures = arch_in_tag(&tag.name);
    }
}
