//! Placeholder catalog shown when the collection store is not reachable,
//! e.g. during local development.

use chrono::Utc;

use crate::model::{CollectionResponse, ImageRepository, Tag};

const MOCK_REPOSITORY: &str = "registry.example.com/mock/sensor/falcon-mock";
const MOCK_DIGEST: &str = "sha256:1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
const MOCK_DESCRIPTION: &str =
    "Placeholder image used to display something in the UI when running offline.";

fn mock_image(name: &str, latest: &str, tags: Vec<Tag>) -> ImageRepository {
    let mut image = ImageRepository::new(name, MOCK_REPOSITORY);
    image.description = MOCK_DESCRIPTION.to_string();
    image.latest_tag = latest.to_string();
    image.latest_digest = Some(MOCK_DIGEST.to_string());
    image.login = Some("fc-mock123456789mock123456789mock12".to_string());
    image.password = Some("mock".repeat(16) + "==");
    image.pull_token = Some("mock".repeat(10) + "=");
    image.tags = tags;
    image
}

/// Three mock repositories: multi-arch, single tag, and one with more tags
/// than fit on a default page
pub fn mock_images() -> CollectionResponse {
    let multi_arch = mock_image(
        "Mock Sensor (Multi-Arch)",
        "1.23-4567.DEV.mock.us-0",
        vec![
            Tag::new("1.22-4567.DEV.mock.us-0", &["x86_64", "aarch64"]).with_digest(MOCK_DIGEST),
            Tag::new("1.23-4567.DEV.mock.us-0", &["x86_64", "aarch64", "ppc64le"])
                .with_digest(MOCK_DIGEST),
        ],
    );

    let single = mock_image(
        "Mock Sensor",
        "1.23-4567.DEV.mock.us-0",
        vec![Tag::new("1.23-4567.DEV.mock.us-0", &["x86_64"]).with_digest(MOCK_DIGEST)],
    );

    let many = mock_image(
        "Mock Sensor (More than 10)",
        "1.23.0",
        (11..=21)
            .chain(std::iter::once(23))
            .map(|minor| Tag::new(&format!("1.{}.0", minor), &["x86_64"]).with_digest(MOCK_DIGEST))
            .collect(),
    );

    CollectionResponse {
        updated_at: Some(Utc::now()),
        duration_ms: 0,
        images: vec![multi_arch, single, many],
        errors: None,
    }
}
