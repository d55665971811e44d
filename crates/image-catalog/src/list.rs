//! Load lifecycle of the image list screen.
//!
//! The list is a plain state machine with named transitions. Network work is
//! done by whoever holds the client; it reports back through
//! [`ImageList::complete_load`] with the ticket it was handed when the load
//! began. Completions that are older than what is already displayed, or that
//! arrive after [`ImageList::unmount`], are dropped.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::{
    error::{RawError, ViewError, normalize},
    model::{CollectionResponse, ImageRepository},
};

/// Discrete state of the list screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Loading,
    Error,
    Empty,
    Ready,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Loading => "Loading",
            Phase::Error => "Error",
            Phase::Empty => "Empty",
            Phase::Ready => "Ready",
        }
    }
}

/// Everything the list screen renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListViewState {
    pub phase: Phase,
    pub images: Vec<ImageRepository>,
    pub last_error: Option<ViewError>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Handed out when a load begins and returned with its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    keep_error: bool,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct ImageList {
    state: ListViewState,
    issued: u64,
    applied: u64,
    mounted: bool,
}

impl Default for ImageList {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageList {
    pub fn new() -> Self {
        Self {
            state: ListViewState::default(),
            issued: 0,
            applied: 0,
            mounted: true,
        }
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn images(&self) -> &[ImageRepository] {
        &self.state.images
    }

    pub fn last_error(&self) -> Option<&ViewError> {
        self.state.last_error.as_ref()
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.state.last_synced_at
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Reload and sync requests are ignored while this is true
    pub fn is_busy(&self) -> bool {
        self.state.phase == Phase::Loading
    }

    /// Start a load; `None` when there is nothing to do (not connected yet,
    /// or the screen is gone)
    pub fn begin_load(&mut self, connected: bool) -> Option<LoadTicket> {
        if !self.mounted || !connected {
            debug!(
                "Skipping image load (mounted: {}, connected: {})",
                self.mounted, connected
            );
            return None;
        }
        Some(self.issue(false))
    }

    /// Start a sync; returns false when it must be skipped
    pub fn begin_sync(&mut self, connected: bool) -> bool {
        if !self.mounted || !connected {
            debug!(
                "Skipping image sync (mounted: {}, connected: {})",
                self.mounted, connected
            );
            return false;
        }
        self.state.phase = Phase::Loading;
        true
    }

    /// Record the trigger outcome and start the refresh that always follows
    ///
    /// A trigger failure is shown immediately and stays visible through the
    /// refresh, even if the refresh itself succeeds.
    pub fn complete_sync_trigger(&mut self, outcome: Result<(), RawError>) -> Option<LoadTicket> {
        if !self.mounted {
            debug!("Dropping sync trigger result after unmount");
            return None;
        }
        let keep_error = match outcome {
            Ok(()) => false,
            Err(raw) => {
                let err = normalize(raw);
                warn!("Sync trigger failed: {}", err);
                self.state.last_error = Some(err);
                true
            }
        };
        Some(self.issue(keep_error))
    }

    /// Apply the outcome of the load identified by `ticket`
    ///
    /// Returns whether the state changed.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<CollectionResponse, RawError>,
    ) -> bool {
        if !self.mounted {
            debug!("Dropping load #{} after unmount", ticket.seq);
            return false;
        }
        if ticket.seq <= self.applied {
            warn!(
                "Dropping stale load #{} (already showing #{})",
                ticket.seq, self.applied
            );
            return false;
        }
        self.applied = ticket.seq;

        match outcome {
            Ok(response) => {
                if let Some(updated) = response.updated_at {
                    self.state.last_synced_at = Some(updated);
                }
                self.state.images = response.images;
                self.state.phase = if self.state.images.is_empty() {
                    Phase::Empty
                } else {
                    Phase::Ready
                };
                if !ticket.keep_error {
                    self.state.last_error = None;
                }
                debug!(
                    "Load #{} applied: {} images ({})",
                    ticket.seq,
                    self.state.images.len(),
                    self.state.phase.label()
                );
            }
            Err(raw) => {
                let err = normalize(raw);
                warn!("Load #{} failed: {}", ticket.seq, err);
                self.state.last_error = Some(err);
                self.state.phase = Phase::Error;
            }
        }
        true
    }

    /// Surface a failure that happened outside a load (e.g. while connecting)
    pub fn record_error(&mut self, raw: impl Into<RawError>) {
        if !self.mounted {
            return;
        }
        self.state.last_error = Some(normalize(raw));
        self.state.phase = Phase::Error;
    }

    pub fn dismiss_error(&mut self) {
        self.state.last_error = None;
    }

    /// Tear the screen down; later completions become no-ops
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    fn issue(&mut self, keep_error: bool) -> LoadTicket {
        self.issued += 1;
        self.state.phase = Phase::Loading;
        LoadTicket {
            seq: self.issued,
            keep_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    fn response(names: &[&str]) -> CollectionResponse {
        CollectionResponse {
            images: names
                .iter()
                .map(|name| {
                    let mut image = ImageRepository::new(name, "registry.example.com/x");
                    image.tags.push(Tag::new("v1", &["x86_64"]));
                    image
                })
                .collect(),
            ..CollectionResponse::default()
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let list = ImageList::new();
        assert_eq!(list.phase(), Phase::Loading);
        assert!(list.images().is_empty());
        assert!(list.last_error().is_none());
    }

    #[test]
    fn test_begin_load_requires_connection() {
        let mut list = ImageList::new();
        list.record_error("offline");
        assert!(list.begin_load(false).is_none());
        assert_eq!(list.phase(), Phase::Error);
    }

    #[test]
    fn test_older_completion_does_not_overwrite_newer() {
        let mut list = ImageList::new();
        let first = list.begin_load(true).unwrap();
        let second = list.begin_load(true).unwrap();

        assert!(list.complete_load(second, Ok(response(&["new"]))));
        assert!(!list.complete_load(first, Ok(response(&["old"]))));

        assert_eq!(list.images()[0].name, "new");
        assert_eq!(list.phase(), Phase::Ready);
    }

    #[test]
    fn test_in_order_completions_last_wins() {
        let mut list = ImageList::new();
        let first = list.begin_load(true).unwrap();
        let second = list.begin_load(true).unwrap();

        assert!(list.complete_load(first, Ok(response(&["old"]))));
        assert!(list.complete_load(second, Ok(response(&[]))));

        assert_eq!(list.phase(), Phase::Empty);
    }

    #[test]
    fn test_completion_after_unmount_is_ignored() {
        let mut list = ImageList::new();
        let ticket = list.begin_load(true).unwrap();
        list.unmount();

        assert!(!list.complete_load(ticket, Err("late".into())));
        assert_eq!(list.phase(), Phase::Loading);
        assert!(list.last_error().is_none());
        assert!(list.begin_load(true).is_none());
    }

    #[test]
    fn test_successful_load_clears_previous_error() {
        let mut list = ImageList::new();
        let ticket = list.begin_load(true).unwrap();
        list.complete_load(ticket, Err("boom".into()));
        assert_eq!(list.phase(), Phase::Error);

        let ticket = list.begin_load(true).unwrap();
        list.complete_load(ticket, Ok(response(&["a"])));
        assert_eq!(list.phase(), Phase::Ready);
        assert!(list.last_error().is_none());
    }

    #[test]
    fn test_failed_trigger_error_survives_refresh() {
        let mut list = ImageList::new();
        assert!(list.begin_sync(true));
        assert!(list.is_busy());

        let ticket = list
            .complete_sync_trigger(Err("function timed out".into()))
            .unwrap();
        assert_eq!(
            list.last_error().map(|e| e.message.as_str()),
            Some("function timed out")
        );

        list.complete_load(ticket, Ok(response(&["a"])));
        assert_eq!(list.phase(), Phase::Ready);
        assert_eq!(
            list.last_error().map(|e| e.message.as_str()),
            Some("function timed out")
        );
    }

    #[test]
    fn test_begin_sync_requires_connection() {
        let mut list = ImageList::new();
        let ticket = list.begin_load(true).unwrap();
        list.complete_load(ticket, Ok(response(&["a"])));

        assert!(!list.begin_sync(false));
        assert_eq!(list.phase(), Phase::Ready);
    }
}
