use std::sync::Arc;

use log::{debug, info};

use crate::{
    client::{CatalogClient, DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY, DEFAULT_SYNC_PATH, fetch_images},
    error::RawError,
    list::{ImageList, ListViewState},
};

/// Drives an [`ImageList`] against an injected client, one command at a time
///
/// Each command awaits its network work before returning, so commands issued
/// through one controller never overlap. Front-ends that need overlapping
/// requests use [`ImageList`] tickets directly.
#[derive(Debug)]
pub struct ImageListController<C> {
    client: Arc<C>,
    list: ImageList,
    collection: String,
    object_key: String,
    sync_path: String,
}

impl<C: CatalogClient> ImageListController<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            list: ImageList::new(),
            collection: DEFAULT_COLLECTION.to_string(),
            object_key: DEFAULT_OBJECT_KEY.to_string(),
            sync_path: DEFAULT_SYNC_PATH.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: &str, object_key: &str) -> Self {
        self.collection = collection.to_string();
        self.object_key = object_key.to_string();
        self
    }

    pub fn with_sync_path(mut self, sync_path: &str) -> Self {
        self.sync_path = sync_path.to_string();
        self
    }

    pub fn list(&self) -> &ImageList {
        &self.list
    }

    pub fn state(&self) -> &ListViewState {
        self.list.state()
    }

    /// Connect the client and load once it reports connected
    pub async fn mount(&mut self) {
        if let Err(err) = self.client.connect().await {
            self.list.record_error(err);
            return;
        }
        if !self.client.is_connected() {
            self.list
                .record_error("connect() completed but not connected");
            return;
        }
        info!("Connected, loading images from '{}'", self.collection);
        self.load().await;
    }

    pub async fn load(&mut self) {
        let Some(ticket) = self.list.begin_load(self.client.is_connected()) else {
            return;
        };
        let outcome = fetch_images(&*self.client, &self.collection, &self.object_key).await;
        self.list.complete_load(ticket, outcome);
    }

    /// Trigger the remote sync job, then refresh regardless of its outcome
    pub async fn sync(&mut self) {
        if !self.list.begin_sync(self.client.is_connected()) {
            return;
        }
        debug!("Posting sync trigger to {}", self.sync_path);
        let trigger = self
            .client
            .post(&self.sync_path, None)
            .await
            .map_err(RawError::from);
        let Some(ticket) = self.list.complete_sync_trigger(trigger) else {
            return;
        };
        let outcome = fetch_images(&*self.client, &self.collection, &self.object_key).await;
        self.list.complete_load(ticket, outcome);
    }

    pub fn unmount(&mut self) {
        self.list.unmount();
    }
}
