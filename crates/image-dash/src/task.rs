/// Background task system for network work that must not block the UI
use ::log::{debug, error, warn};
use image_catalog::{
    CatalogError, CollectionResponse, CollectionStore, Connection, LoadTicket, RawError,
    RemoteTrigger, fetch_images,
};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::Backend;

/// Results from background task execution
/// These are sent back to the main loop and converted to Actions
#[derive(Debug)]
pub enum TaskResult {
    /// Connect finished; `Ok` carries whether the handle reports connected
    Connected(Result<bool, CatalogError>),

    /// Image collection read for the load identified by the ticket
    ImagesLoaded(LoadTicket, Result<CollectionResponse, RawError>),

    /// Remote sync job returned
    SyncTriggered(Result<(), RawError>),

    /// Seed data written (number of repositories)
    SeedComplete(Result<usize, String>),

    /// Collection object deleted
    PurgeComplete(Result<(), String>),
}

/// Background tasks that can be executed asynchronously
#[derive(Debug)]
pub enum BackgroundTask {
    Connect {
        client: Arc<Backend>,
    },
    LoadImages {
        client: Arc<Backend>,
        collection: String,
        object_key: String,
        ticket: LoadTicket,
    },
    TriggerSync {
        client: Arc<Backend>,
        path: String,
    },
    Seed {
        client: Arc<Backend>,
        collection: String,
        object_key: String,
        payload: CollectionResponse,
    },
    Purge {
        client: Arc<Backend>,
        collection: String,
        object_key: String,
    },
}

/// Background task worker; each task runs on its own tokio task so a slow
/// sync never holds up a reload
pub fn start_task_worker(
    mut task_rx: mpsc::UnboundedReceiver<BackgroundTask>,
    result_tx: mpsc::UnboundedSender<TaskResult>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(task) = task_rx.recv().await {
            let result_tx = result_tx.clone();
            tokio::spawn(async move {
                let result = process_task(task).await;
                // The UI may already be gone
                let _ = result_tx.send(result);
            });
        }
    })
}

async fn process_task(task: BackgroundTask) -> TaskResult {
    match task {
        BackgroundTask::Connect { client } => {
            debug!("Connecting catalog client...");
            let result = client.connect().await.map(|()| client.is_connected());
            if let Err(err) = &result {
                error!("Connect failed: {}", err);
            }
            TaskResult::Connected(result)
        }
        BackgroundTask::LoadImages {
            client,
            collection,
            object_key,
            ticket,
        } => {
            debug!(
                "Loading {}/{} (load #{})...",
                collection,
                object_key,
                ticket.seq()
            );
            let result = fetch_images(&*client, &collection, &object_key).await;
            match &result {
                Ok(response) => debug!(
                    "Load #{} returned {} images",
                    ticket.seq(),
                    response.images.len()
                ),
                Err(err) => warn!("Load #{} failed: {:?}", ticket.seq(), err),
            }
            TaskResult::ImagesLoaded(ticket, result)
        }
        BackgroundTask::TriggerSync { client, path } => {
            debug!("Posting sync trigger to {}", path);
            let result = client.post(&path, None).await.map_err(RawError::from);
            TaskResult::SyncTriggered(result)
        }
        BackgroundTask::Seed {
            client,
            collection,
            object_key,
            payload,
        } => {
            let count = payload.images.len();
            debug!(
                "Seeding {}/{} with {} repositories",
                collection, object_key, count
            );
            let result = client
                .write(&collection, &object_key, &payload)
                .await
                .map(|()| count)
                .map_err(|e| e.to_string());
            TaskResult::SeedComplete(result)
        }
        BackgroundTask::Purge {
            client,
            collection,
            object_key,
        } => {
            debug!("Purging {}/{}", collection, object_key);
            let result = client
                .delete(&collection, &object_key)
                .await
                .map_err(|e| e.to_string());
            TaskResult::PurgeComplete(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_catalog::{ImageList, InMemoryCatalog, fixtures};

    fn mock_backend(catalog: InMemoryCatalog) -> Arc<Backend> {
        Arc::new(Backend::Mock(catalog))
    }

    #[tokio::test]
    async fn test_connect_reports_connected_flag() {
        let client = mock_backend(InMemoryCatalog::new());
        let result = process_task(BackgroundTask::Connect { client }).await;
        assert!(matches!(result, TaskResult::Connected(Ok(true))));

        let refusing = mock_backend(InMemoryCatalog::new().refusing_connection());
        let result = process_task(BackgroundTask::Connect { client: refusing }).await;
        assert!(matches!(result, TaskResult::Connected(Ok(false))));
    }

    #[tokio::test]
    async fn test_seed_then_load_through_worker() {
        let client = mock_backend(InMemoryCatalog::new());
        client.connect().await.unwrap();

        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let worker = start_task_worker(task_rx, result_tx);

        task_tx
            .send(BackgroundTask::Seed {
                client: client.clone(),
                collection: "images".to_string(),
                object_key: "all".to_string(),
                payload: fixtures::mock_images(),
            })
            .unwrap();
        match result_rx.recv().await {
            Some(TaskResult::SeedComplete(Ok(count))) => assert_eq!(count, 3),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut list = ImageList::new();
        let ticket = list.begin_load(true).unwrap();
        task_tx
            .send(BackgroundTask::LoadImages {
                client,
                collection: "images".to_string(),
                object_key: "all".to_string(),
                ticket,
            })
            .unwrap();
        match result_rx.recv().await {
            Some(TaskResult::ImagesLoaded(returned, Ok(response))) => {
                assert_eq!(returned, ticket);
                assert_eq!(response.images.len(), 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        worker.abort();
    }

    #[tokio::test]
    async fn test_purge_then_load_reports_missing_object() {
        let client = mock_backend(InMemoryCatalog::with_images(fixtures::mock_images()));
        client.connect().await.unwrap();

        let result = process_task(BackgroundTask::Purge {
            client: client.clone(),
            collection: "images".to_string(),
            object_key: "all".to_string(),
        })
        .await;
        assert!(matches!(result, TaskResult::PurgeComplete(Ok(()))));

        let ticket = ImageList::new().begin_load(true).unwrap();
        let result = process_task(BackgroundTask::LoadImages {
            client,
            collection: "images".to_string(),
            object_key: "all".to_string(),
            ticket,
        })
        .await;
        assert!(matches!(
            result,
            TaskResult::ImagesLoaded(_, Err(RawError::Records(_)))
        ));
    }

    #[tokio::test]
    async fn test_failed_trigger_is_reported() {
        let catalog = InMemoryCatalog::new();
        catalog.fail_next_trigger(CatalogError::Remote {
            code: 500,
            message: "Error getting registry token".to_string(),
        });
        let client = mock_backend(catalog);
        client.connect().await.unwrap();

        let result = process_task(BackgroundTask::TriggerSync {
            client,
            path: "/sync-images".to_string(),
        })
        .await;
        assert!(matches!(result, TaskResult::SyncTriggered(Err(_))));
    }
}
