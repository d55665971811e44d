//! Image Catalog
//!
//! Model and client-side logic for browsing container image repositories
//! stored in a managed collection: a paged, newest-first view of each
//! repository's tags and the Loading/Error/Empty/Ready lifecycle of the list.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use image_catalog::{ImageListController, InMemoryCatalog, Phase, derive_page, fixtures};
//!
//! # async fn run() {
//! let client = Arc::new(InMemoryCatalog::with_images(fixtures::mock_images()));
//! let mut controller = ImageListController::new(client);
//! controller.mount().await;
//!
//! if controller.state().phase == Phase::Ready {
//!     let image = &controller.state().images[0];
//!     for tag in derive_page(&image.tags, 1, 10) {
//!         println!("{} {}", tag.name, tag.architectures.join(","));
//!     }
//! }
//! # }
//! ```

mod client;
mod controller;
mod error;
pub mod fixtures;
mod list;
mod memory;
mod model;
mod pager;

pub use client::{
    CatalogClient, CollectionStore, Connection, DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY,
    DEFAULT_SYNC_PATH, RemoteTrigger, fetch_images,
};
pub use controller::ImageListController;
pub use error::{CatalogError, RawError, ViewError, normalize};
pub use list::{ImageList, ListViewState, LoadTicket, Phase};
pub use memory::InMemoryCatalog;
pub use model::*;
pub use pager::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, PagerState, derive_page};
