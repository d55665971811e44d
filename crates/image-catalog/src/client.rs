//! Collaborator contracts the list state machine is driven through.
//!
//! Implementations live elsewhere: [`crate::memory::InMemoryCatalog`] for
//! offline use and tests, and an HTTP client in the front-end binary.

use std::future::Future;

use serde_json::Value;

use crate::{
    error::{CatalogError, RawError},
    model::CollectionResponse,
};

/// Collection holding the synced image list
pub const DEFAULT_COLLECTION: &str = "images";

/// Object key the whole image list is stored under
pub const DEFAULT_OBJECT_KEY: &str = "all";

/// Path of the remote sync job
pub const DEFAULT_SYNC_PATH: &str = "/sync-images";

/// Handle to the remote platform
///
/// Before `connect()` has succeeded every capability is expected to be
/// unusable; callers check [`Connection::is_connected`] and skip quietly.
pub trait Connection: Send + Sync {
    fn connect(&self) -> impl Future<Output = Result<(), CatalogError>> + Send;

    fn is_connected(&self) -> bool;
}

/// Read/write access to a key/value collection
pub trait CollectionStore: Send + Sync {
    fn read_all(
        &self,
        collection: &str,
        key: &str,
    ) -> impl Future<Output = Result<CollectionResponse, CatalogError>> + Send;

    fn write(
        &self,
        collection: &str,
        key: &str,
        record: &CollectionResponse,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    fn delete(
        &self,
        collection: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Fire-and-wait trigger of a remote function
pub trait RemoteTrigger: Send + Sync {
    fn post(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Everything the image list needs from a client
pub trait CatalogClient: Connection + CollectionStore + RemoteTrigger {}

impl<T> CatalogClient for T where T: Connection + CollectionStore + RemoteTrigger {}

/// Read the image list and treat embedded error records as a failure
pub async fn fetch_images<C>(
    client: &C,
    collection: &str,
    key: &str,
) -> Result<CollectionResponse, RawError>
where
    C: CollectionStore,
{
    let response = client.read_all(collection, key).await?;
    if let Some(errors) = response.reported_errors() {
        return Err(RawError::Records(errors.to_vec()));
    }
    Ok(response)
}
