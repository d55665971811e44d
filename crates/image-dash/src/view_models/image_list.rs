use chrono::{DateTime, Utc};
use image_catalog::Phase;

use crate::state::{ConnectionState, ImagesState};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// View model for the repository list - all presentation data pre-computed
#[derive(Debug, Clone, PartialEq)]
pub struct ImageListViewModel {
    /// Pre-formatted panel title, e.g. "Images (3) [Ready]"
    pub title: String,
    pub body: ListBody,
    /// Inline error banner, shown above the body whenever an error is held
    pub banner: Option<String>,
    /// "Last synced: ..." footer
    pub footer: String,
}

/// What fills the list panel
#[derive(Debug, Clone, PartialEq)]
pub enum ListBody {
    /// Skeleton rows with a spinner while a load is pending
    Loading { spinner: &'static str, message: String },
    /// Failed before anything was ever shown
    Error { message: String },
    /// Loaded fine but the collection holds no repositories
    Empty { message: String, hint: String },
    Rows {
        rows: Vec<ImageRowItem>,
        selected: Option<usize>,
    },
}

/// A single repository row
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRowItem {
    /// "▶" collapsed, "▼" expanded
    pub marker: &'static str,
    pub name: String,
    pub latest: String,
    pub registry: String,
    /// Pre-formatted count, e.g. "12 tags"
    pub tag_count: String,
    pub description: String,
}

impl ImageListViewModel {
    /// Build view model from the image list state
    pub fn from_state(images: &ImagesState, spinner_frame: usize) -> Self {
        let list = images.list.state();

        let body = match list.phase {
            Phase::Loading => ListBody::Loading {
                spinner: SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()],
                message: loading_message(images.connection).to_string(),
            },
            // Images from an earlier load stay visible under the banner
            Phase::Error if list.images.is_empty() => match list.last_error.as_ref() {
                Some(err) => ListBody::Error {
                    message: err.message.clone(),
                },
                None => ListBody::Empty {
                    message: "Nothing loaded".to_string(),
                    hint: "Press r to reload or s to sync".to_string(),
                },
            },
            Phase::Empty => ListBody::Empty {
                message: "No images in the collection yet".to_string(),
                hint: "Press s to sync images from the registries".to_string(),
            },
            Phase::Error | Phase::Ready => ListBody::Rows {
                rows: list
                    .images
                    .iter()
                    .map(|image| {
                        let expanded = images
                            .rows
                            .get(&image.name)
                            .is_some_and(|row| row.expanded);
                        ImageRowItem {
                            marker: if expanded { "▼" } else { "▶" },
                            name: image.name.clone(),
                            latest: image.latest_tag.clone(),
                            registry: image.registry_host.clone(),
                            tag_count: tag_count_label(image.tags.len()),
                            description: image.description.clone(),
                        }
                    })
                    .collect(),
                selected: images.table_state.selected(),
            },
        };

        let banner = match (&body, list.last_error.as_ref()) {
            // The error body already shows the message
            (ListBody::Error { .. }, _) => None,
            (_, Some(err)) => Some(match err.code {
                Some(code) => format!("{} ({})", err.message, code),
                None => err.message.clone(),
            }),
            (_, None) => None,
        };

        let title = format!(
            " Images ({}) [{}] ",
            list.images.len(),
            list.phase.label()
        );

        Self {
            title,
            body,
            banner,
            footer: last_synced_label(list.last_synced_at),
        }
    }
}

fn loading_message(connection: ConnectionState) -> &'static str {
    match connection {
        ConnectionState::Disconnected | ConnectionState::Connecting => "Connecting...",
        ConnectionState::Failed => "Not connected - press r to retry",
        ConnectionState::Connected => "Loading images...",
    }
}

fn tag_count_label(count: usize) -> String {
    match count {
        1 => "1 tag".to_string(),
        n => format!("{} tags", n),
    }
}

pub fn last_synced_label(last_synced_at: Option<DateTime<Utc>>) -> String {
    match last_synced_at {
        Some(at) => format!("Last synced: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => "Last synced: never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image_catalog::{CollectionResponse, ImageRepository, RawError, Tag};

    use crate::state::RowState;

    fn loaded(images: Vec<ImageRepository>) -> ImagesState {
        let mut state = ImagesState {
            connection: ConnectionState::Connected,
            ..ImagesState::default()
        };
        let ticket = state.list.begin_load(true).unwrap();
        state.list.complete_load(
            ticket,
            Ok(CollectionResponse {
                updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()),
                images,
                ..CollectionResponse::default()
            }),
        );
        state
    }

    fn repo(name: &str, tags: usize) -> ImageRepository {
        let mut repo = ImageRepository::new(name, &format!("registry.example.com/{}", name));
        repo.tags = (1..=tags)
            .map(|i| Tag::new(&format!("v{}", i), &["x86_64"]))
            .collect();
        repo
    }

    #[test]
    fn test_loading_shows_spinner() {
        let state = ImagesState::default();
        let vm = ImageListViewModel::from_state(&state, 3);
        assert_eq!(
            vm.body,
            ListBody::Loading {
                spinner: "⠸",
                message: "Connecting...".to_string()
            }
        );
        assert_eq!(vm.footer, "Last synced: never");
        assert!(vm.banner.is_none());
    }

    #[test]
    fn test_empty_collection_offers_sync() {
        let vm = ImageListViewModel::from_state(&loaded(vec![]), 0);
        assert!(matches!(vm.body, ListBody::Empty { ref hint, .. } if hint.contains("s to sync")));
        assert_eq!(vm.footer, "Last synced: 2025-03-01 10:00:00 UTC");
        assert_eq!(vm.title, " Images (0) [Empty] ");
    }

    #[test]
    fn test_rows_mark_expanded_repository() {
        let mut state = loaded(vec![repo("a", 1), repo("b", 3)]);
        state.table_state.select(Some(1));
        let mut row = RowState::new(10);
        row.expanded = true;
        state.rows.insert("b".to_string(), row);

        let vm = ImageListViewModel::from_state(&state, 0);
        let ListBody::Rows { rows, selected } = vm.body else {
            panic!("expected rows");
        };
        assert_eq!(selected, Some(1));
        assert_eq!(rows[0].marker, "▶");
        assert_eq!(rows[0].tag_count, "1 tag");
        assert_eq!(rows[1].marker, "▼");
        assert_eq!(rows[1].tag_count, "3 tags");
        assert_eq!(rows[1].registry, "registry.example.com");
    }

    #[test]
    fn test_error_keeps_previous_rows_under_banner() {
        let mut state = loaded(vec![repo("a", 1)]);
        let ticket = state.list.begin_load(true).unwrap();
        state
            .list
            .complete_load(ticket, Err(RawError::from("boom")));

        let vm = ImageListViewModel::from_state(&state, 0);
        assert!(matches!(vm.body, ListBody::Rows { ref rows, .. } if rows.len() == 1));
        assert_eq!(vm.banner.as_deref(), Some("boom"));
    }

    #[test]
    fn test_first_load_failure_fills_panel() {
        let mut state = ImagesState {
            connection: ConnectionState::Connected,
            ..ImagesState::default()
        };
        let ticket = state.list.begin_load(true).unwrap();
        state
            .list
            .complete_load(ticket, Err(RawError::from("boom")));

        let vm = ImageListViewModel::from_state(&state, 0);
        assert_eq!(
            vm.body,
            ListBody::Error {
                message: "boom".to_string()
            }
        );
        assert!(vm.banner.is_none());
    }

    #[test]
    fn test_dismissed_first_failure_shows_empty_state() {
        let mut state = ImagesState {
            connection: ConnectionState::Connected,
            ..ImagesState::default()
        };
        let ticket = state.list.begin_load(true).unwrap();
        state
            .list
            .complete_load(ticket, Err(RawError::from("boom")));
        state.list.dismiss_error();

        let vm = ImageListViewModel::from_state(&state, 0);
        assert!(matches!(
            vm.body,
            ListBody::Empty { ref message, ref hint }
                if message == "Nothing loaded" && hint.contains("r to reload")
        ));
        assert!(vm.banner.is_none());
        assert_eq!(vm.title, " Images (0) [Error] ");
    }
}
