use image_catalog::{Engine, ImageRepository, Tag};

use super::credential_display;
use crate::state::RowState;

/// View model for the detail panel of an expanded repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryDetailViewModel {
    pub title: String,
    /// Label/value pairs shown above the tag table
    pub fields: Vec<(&'static str, String)>,
    pub tags: TagTableViewModel,
}

/// One page of tags plus its pagination header
#[derive(Debug, Clone, PartialEq)]
pub struct TagTableViewModel {
    /// "Page 2/3 | 11 - 20 of 25 | 10 per page"
    pub header: String,
    pub rows: Vec<TagRowItem>,
    /// Cursor within `rows`, `None` when the table has no focus
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagRowItem {
    pub name: String,
    pub digest: String,
    pub architectures: String,
}

/// Pull commands for a single tag
#[derive(Debug, Clone, PartialEq)]
pub struct PullCommandsViewModel {
    pub title: String,
    /// (label, command) in display order
    pub commands: Vec<(String, String)>,
}

impl RepositoryDetailViewModel {
    pub fn from_state(image: &ImageRepository, row: &RowState, tags_focused: bool) -> Self {
        let latest = match image.latest_digest.as_deref() {
            Some(digest) => format!("{} ({})", image.latest_tag, digest),
            None => image.latest_tag.clone(),
        };

        let mut fields = vec![
            ("Repository", image.repository_path.clone()),
            ("Latest", latest),
        ];
        if !image.description.is_empty() {
            fields.insert(0, ("Description", image.description.clone()));
        }
        // Only repositories behind a private registry carry credentials
        if image.login.is_some() || image.password.is_some() || image.pull_token.is_some() {
            fields.push(("Login", image.login.clone().unwrap_or_else(|| "-".into())));
            fields.push((
                "Password",
                credential_display(image.password.as_deref(), row.show_password),
            ));
            fields.push((
                "Pull token",
                credential_display(image.pull_token.as_deref(), row.show_pull_token),
            ));
        }

        Self {
            title: format!(" {} ", image.name),
            fields,
            tags: TagTableViewModel::from_state(&image.tags, row, tags_focused),
        }
    }
}

impl TagTableViewModel {
    pub fn from_state(tags: &[Tag], row: &RowState, focused: bool) -> Self {
        let pager = &row.pager;
        let total = tags.len();
        let rows: Vec<TagRowItem> = pager
            .page(tags)
            .into_iter()
            .map(|tag| TagRowItem {
                digest: tag.short_digest().to_string(),
                architectures: tag.architectures.join(", "),
                name: tag.name,
            })
            .collect();

        let header = format!(
            "Page {}/{} | {} | {} per page",
            pager.page_number(),
            pager.page_count(total),
            pager.range_label(total),
            pager.page_size()
        );

        let selected = (focused && !rows.is_empty()).then(|| row.tag_cursor.min(rows.len() - 1));

        Self {
            header,
            rows,
            selected,
        }
    }
}

impl PullCommandsViewModel {
    pub fn from_tag(image: &ImageRepository, tag: &Tag) -> Self {
        let mut commands: Vec<(String, String)> = Engine::ALL
            .iter()
            .map(|engine| {
                (
                    format!("{} (tag)", engine.command()),
                    image.pull_by_tag(*engine, &tag.name),
                )
            })
            .collect();

        if let Some(digest) = tag.digest.as_deref() {
            commands.extend(Engine::ALL.iter().map(|engine| {
                (
                    format!("{} (digest)", engine.command()),
                    image.pull_by_digest(*engine, digest),
                )
            }));
        }

        Self {
            title: format!(" Pull {}:{} ", image.name, tag.name),
            commands,
        }
    }
}
