/// Effect system for Redux architecture
/// Reducers return (State, Vec<Effect>) where Effects describe side effects to perform
/// The update() function executes these effects
use ::log::{debug, error};
use anyhow::Result;
use image_catalog::LoadTicket;
use std::{env, sync::Arc};

use crate::{
    App,
    actions::Action,
    client::Backend,
    seed,
    state::TaskStatus,
    task::BackgroundTask,
};

/// Effects that reducers can request to be performed
#[derive(Debug, Clone)]
pub enum Effect {
    /// Load .env file if no credentials are set
    LoadEnvFile,

    /// Drop the current client so the next InitializeClient rebuilds it
    ResetClient,

    /// Build the catalog client (must happen after LoadEnvFile)
    InitializeClient,

    /// Connect the client in the background
    Connect,

    /// Read the image collection; the ticket comes back with the result
    LoadImages { ticket: LoadTicket },

    /// Post to the remote sync job
    TriggerSync,

    /// Write the seed data set to the collection
    SeedCollection,

    /// Delete the collection object
    PurgeCollection,
}

/// Execute an effect, returning follow-up actions to dispatch
pub async fn execute_effect(app: &mut App, effect: Effect) -> Result<Vec<Action>> {
    let mut follow_up_actions = Vec::new();

    match effect {
        Effect::LoadEnvFile => {
            if env::var("FALCON_ACCESS_TOKEN").is_err() && env::var("FALCON_CLIENT_ID").is_err() {
                match dotenvy::dotenv() {
                    Ok(path) => {
                        debug!("Loaded .env file from: {:?}", path);
                    }
                    Err(_) => {
                        // Not an error: credentials may come from the environment
                        debug!(".env file not found, will rely on environment variables");
                    }
                }
            }
        }

        Effect::ResetClient => {
            // In-flight tasks keep their own handle
            if app.client.take().is_some() {
                debug!("Catalog client dropped for reconnect");
            }
        }

        Effect::InitializeClient => {
            if app.client.is_some() {
                return Ok(follow_up_actions);
            }
            match Backend::from_config(&app.store.state().config) {
                Ok(backend) => {
                    debug!(
                        "Catalog client initialized ({})",
                        if backend.is_mock() { "mock" } else { "http" }
                    );
                    app.client = Some(Arc::new(backend));
                }
                Err(err) => {
                    error!("Failed to initialize catalog client: {}", err);
                    follow_up_actions.push(Action::ConnectComplete(Err(err)));
                }
            }
        }

        Effect::Connect => {
            // Initialization failures were already reported
            let Some(client) = app.client.clone() else {
                return Ok(follow_up_actions);
            };
            let _ = app.task_tx.send(BackgroundTask::Connect { client });
        }

        Effect::LoadImages { ticket } => {
            let config = &app.store.state().config;
            let task = BackgroundTask::LoadImages {
                client: app.client()?,
                collection: config.collection.clone(),
                object_key: config.object_key.clone(),
                ticket,
            };
            let _ = app.task_tx.send(task);
        }

        Effect::TriggerSync => {
            follow_up_actions.push(Action::SetTaskStatus(Some(TaskStatus::running(
                "Syncing images...",
            ))));
            let task = BackgroundTask::TriggerSync {
                client: app.client()?,
                path: app.store.state().config.sync_path.clone(),
            };
            let _ = app.task_tx.send(task);
        }

        Effect::SeedCollection => {
            let config = &app.store.state().config;
            match seed::load_seed(config.seed_file.as_deref()) {
                Ok(payload) => {
                    let task = BackgroundTask::Seed {
                        client: app.client()?,
                        collection: config.collection.clone(),
                        object_key: config.object_key.clone(),
                        payload,
                    };
                    follow_up_actions.push(Action::SetTaskStatus(Some(TaskStatus::running(
                        "Seeding collection...",
                    ))));
                    let _ = app.task_tx.send(task);
                }
                Err(err) => {
                    follow_up_actions.push(Action::SeedComplete(Err(format!("{:#}", err))));
                }
            }
        }

        Effect::PurgeCollection => {
            let config = &app.store.state().config;
            let task = BackgroundTask::Purge {
                client: app.client()?,
                collection: config.collection.clone(),
                object_key: config.object_key.clone(),
            };
            follow_up_actions.push(Action::SetTaskStatus(Some(TaskStatus::running(
                "Purging collection...",
            ))));
            let _ = app.task_tx.send(task);
        }
    }

    Ok(follow_up_actions)
}
