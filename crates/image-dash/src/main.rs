use anyhow::Result;
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    },
    prelude::*,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use ::log::{debug, error};

use crate::actions::Action;
use crate::client::Backend;
use crate::config::Config;
use crate::effect::execute_effect;
use crate::state::*;
use crate::store::Store;
use crate::task::{BackgroundTask, TaskResult, start_task_worker};
use crate::theme::Theme;
use crate::view_models::tag_table::PullCommandsViewModel;

mod actions;
mod client;
mod config;
mod effect;
mod log_capture;
mod reducer;
mod seed;
mod shortcuts;
mod state;
mod store;
mod task;
mod theme;
mod view_models;
mod views;

pub struct App {
    // Redux store - centralized state management
    pub store: Store,
    // Communication channels
    pub action_tx: mpsc::UnboundedSender<Action>,
    pub task_tx: mpsc::UnboundedSender<BackgroundTask>,
    // Catalog client, created during bootstrap after .env is loaded
    pub client: Option<Arc<Backend>>,
}

pub fn initialize_panic_handler() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Restoring the terminal is best effort; the panic is what matters
        let _ = shutdown();
        original_hook(panic_info);
    }));
}

fn startup() -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stderr(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(())
}

fn shutdown() -> Result<()> {
    crossterm::execute!(std::io::stderr(), crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::terminal::disable_raw_mode()?;
    Ok(())
}

async fn update(app: &mut App, msg: Action) -> Result<Action> {
    let msg = if app.store.state().ui.pull_popup.is_some() {
        match msg {
            Action::ClosePullPopup
            | Action::ToggleDebugConsole
            | Action::TickSpinner
            | Action::None => msg,
            // Completions keep flowing while the popup is open
            Action::ConnectComplete(_)
            | Action::ImagesLoaded(..)
            | Action::SyncTriggered(_)
            | Action::SeedComplete(_)
            | Action::PurgeComplete(_)
            | Action::SetTaskStatus(_)
            | Action::UpdateDebugConsoleViewport(_) => msg,
            Action::Back | Action::Confirm | Action::Quit => Action::ClosePullPopup,
            _ => return Ok(Action::None),
        }
    } else if app.store.state().ui.show_shortcuts {
        // When shortcuts panel is open, remap navigation to shortcuts scrolling
        match msg {
            Action::NavigateNext => Action::ScrollShortcutsDown,
            Action::NavigatePrevious => Action::ScrollShortcutsUp,
            Action::Back | Action::Quit => Action::ToggleShortcuts,
            Action::ToggleShortcuts
            | Action::ToggleDebugConsole
            | Action::TickSpinner
            | Action::None => msg,
            Action::ConnectComplete(_)
            | Action::ImagesLoaded(..)
            | Action::SyncTriggered(_)
            | Action::SeedComplete(_)
            | Action::PurgeComplete(_)
            | Action::SetTaskStatus(_)
            | Action::UpdateDebugConsoleViewport(_) => msg,
            _ => return Ok(Action::None),
        }
    } else {
        msg
    };

    // Dispatch action to reducers, get effects back
    let effects = app.store.dispatch(msg);

    // Execute effects returned by reducers and dispatch follow-up actions
    for effect in effects {
        let follow_up_actions = execute_effect(app, effect).await?;

        for action in follow_up_actions {
            let nested_effects = app.store.dispatch(action);
            for nested_effect in nested_effects {
                let nested_actions = execute_effect(app, nested_effect).await?;
                for nested_action in nested_actions {
                    let _ = app.action_tx.send(nested_action);
                }
            }
        }
    }

    Ok(Action::None)
}

fn start_event_handler(
    app: &App,
    tx: mpsc::UnboundedSender<Action>,
) -> (tokio::task::JoinHandle<()>, Arc<Mutex<bool>>) {
    let tick_rate = std::time::Duration::from_millis(250);
    let pull_popup_shared = app.store.state().ui.pull_popup_shared.clone();
    // Clone the pending key state for two-key combinations
    let pending_key_shared = app.store.state().ui.pending_key.clone();
    // Create shared debug console state for event loop
    let debug_console_open_shared = Arc::new(Mutex::new(false));
    let debug_console_open = debug_console_open_shared.clone();

    let handle = tokio::spawn(async move {
        loop {
            let action = match crossterm::event::poll(tick_rate) {
                Ok(true) => {
                    let ctx = KeyEventContext {
                        pull_popup_open: *pull_popup_shared.lock().unwrap(),
                        debug_console_open: *debug_console_open.lock().unwrap(),
                        pending_key_shared: &pending_key_shared,
                    };
                    handle_events(&ctx).unwrap_or(Action::None)
                }
                Ok(false) => Action::None,
                Err(err) => {
                    error!("Failed to poll terminal events: {}", err);
                    Action::None
                }
            };

            if tx.send(action).is_err() {
                break;
            }
        }
    });

    (handle, debug_console_open_shared)
}

/// Convert TaskResult to Action - the single place where task results become actions
fn result_to_action(result: TaskResult) -> Action {
    match result {
        TaskResult::Connected(res) => Action::ConnectComplete(res),
        TaskResult::ImagesLoaded(ticket, res) => Action::ImagesLoaded(ticket, res),
        TaskResult::SyncTriggered(res) => Action::SyncTriggered(res),
        TaskResult::SeedComplete(res) => Action::SeedComplete(res),
        TaskResult::PurgeComplete(res) => Action::PurgeComplete(res),
    }
}

async fn run_with_log_buffer(log_buffer: log_capture::LogBuffer) -> Result<()> {
    let mut t = Terminal::new(CrosstermBackend::new(std::io::stderr()))?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let (task_tx, task_rx) = mpsc::unbounded_channel();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();

    let mut app = App::new(action_tx.clone(), task_tx, log_buffer);

    let (event_task, debug_console_shared) = start_event_handler(&app, app.action_tx.clone());
    let worker_task = start_task_worker(task_rx, result_tx);

    app.action_tx.send(Action::Bootstrap)?;

    loop {
        // Sync the shared flags for the event handler
        *app.store.state().ui.pull_popup_shared.lock().unwrap() =
            app.store.state().ui.pull_popup.is_some();
        *debug_console_shared.lock().unwrap() = app.store.state().debug_console.is_open;

        t.draw(|f| {
            ui(f, &mut app);
        })?;

        // Prioritize results over actions to show incremental progress
        let maybe_action = tokio::time::timeout(std::time::Duration::from_millis(100), async {
            tokio::select! {
                biased;
                Some(result) = result_rx.recv() => Some(result_to_action(result)),
                Some(action) = action_rx.recv() => Some(action),
                else => None
            }
        })
        .await;

        match maybe_action {
            Ok(Some(action)) => {
                if let Err(err) = update(&mut app, action).await {
                    error!("Error updating app: {:#}", err);
                    app.store.state_mut().task.status =
                        Some(TaskStatus::error(format!("{:#}", err)));
                }
            }
            Ok(None) => break, // Channel closed
            Err(_) => {
                // Timeout - tick spinner animation
                let _ = app.action_tx.send(Action::TickSpinner);
            }
        }

        if app.store.state().ui.should_quit {
            debug!("Quit requested, shutting down");
            break;
        }
    }

    event_task.abort();
    worker_task.abort();

    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Image list (+ detail)
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    crate::views::image_list::render_image_list(f, chunks[0], app);
    crate::views::status_bar::render_status_bar(f, app, chunks[1]);

    if let Some(vm) = pull_commands_view_model(app.store.state()) {
        crate::views::pull_popup::render_pull_popup(
            f,
            chunks[0],
            &vm,
            &app.store.state().theme,
        );
    }

    // Render shortcuts panel on top of everything if visible
    if app.store.state().ui.show_shortcuts {
        let max_scroll = crate::views::help::render_shortcuts_panel(
            f,
            chunks[0],
            app.store.state().ui.shortcuts_scroll,
            &app.store.state().theme,
        );
        app.store.state_mut().ui.shortcuts_max_scroll = max_scroll;
    }

    // Render debug console (Quake-style drop-down) if visible
    if app.store.state().debug_console.is_open {
        let viewport_height = crate::views::debug_console::render_debug_console(f, f.area(), app);
        // Update viewport height for page down scrolling
        app.store
            .dispatch(Action::UpdateDebugConsoleViewport(viewport_height));
    }
}

/// Pull commands for the popup; `None` when closed or the tag is gone after a reload
fn pull_commands_view_model(state: &AppState) -> Option<PullCommandsViewModel> {
    let popup = state.ui.pull_popup.as_ref()?;
    let image = state
        .images
        .list
        .images()
        .iter()
        .find(|image| image.name == popup.image_name)?;
    let tag = image.find_tag(&popup.tag_name)?;
    Some(PullCommandsViewModel::from_tag(image, tag))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize debug console logger before anything else
    let log_buffer = log_capture::init_logger()?;
    initialize_panic_handler();
    startup()?;
    let result = run_with_log_buffer(log_buffer).await;
    shutdown()?;
    result
}

impl App {
    fn new(
        action_tx: mpsc::UnboundedSender<Action>,
        task_tx: mpsc::UnboundedSender<BackgroundTask>,
        log_buffer: log_capture::LogBuffer,
    ) -> App {
        let mut config = Config::load();
        config.mock = config.use_mock();

        let initial_state = AppState {
            ui: UiState::default(),
            images: ImagesState {
                default_page_size: config.page_size,
                ..ImagesState::default()
            },
            task: TaskState::default(),
            debug_console: DebugConsoleState {
                logs: log_buffer,
                ..DebugConsoleState::default()
            },
            config,
            theme: Theme::default(),
        };

        App {
            store: Store::new(initial_state),
            action_tx,
            task_tx,
            client: None, // Initialized during bootstrap after .env is loaded
        }
    }

    fn client(&self) -> Result<Arc<Backend>> {
        self.client.clone().ok_or_else(|| {
            anyhow::anyhow!("Catalog client not initialized; it is created during bootstrap")
        })
    }
}

/// Context for key event handling
struct KeyEventContext<'a> {
    pull_popup_open: bool,
    debug_console_open: bool,
    pending_key_shared: &'a Arc<Mutex<Option<PendingKeyPress>>>,
}

fn handle_events(ctx: &KeyEventContext) -> Result<Action> {
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, ctx),
        _ => Action::None,
    })
}

fn handle_key_event(key: KeyEvent, ctx: &KeyEventContext) -> Action {
    // Handle debug console keys if console is open (before general shortcuts)
    if ctx.debug_console_open {
        match key.code {
            KeyCode::Char('`') | KeyCode::Char('~') | KeyCode::Esc => {
                return Action::ToggleDebugConsole;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                return Action::ScrollDebugConsoleDown;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                return Action::ScrollDebugConsoleUp;
            }
            KeyCode::Char(' ') => {
                return Action::PageDebugConsoleDown;
            }
            KeyCode::Char('a') => {
                return Action::ToggleDebugAutoScroll;
            }
            KeyCode::Char('c') => {
                return Action::ClearDebugLogs;
            }
            // Fall through to general shortcuts (e.g. '?' for help)
            _ => {}
        }
    }

    // The pull popup only closes; two-key prefixes must not start behind it
    if ctx.pull_popup_open {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Action::ClosePullPopup,
            KeyCode::Char('`') | KeyCode::Char('~') => Action::ToggleDebugConsole,
            _ => Action::None,
        };
    }

    // Use the shortcuts module to find the action for this key (with two-key support)
    let mut pending_guard = ctx.pending_key_shared.lock().unwrap();
    let (action, should_clear, new_pending_char) =
        crate::shortcuts::find_action_for_key_with_pending(&key, pending_guard.as_ref());

    if should_clear {
        *pending_guard = None;
    }
    if let Some(pending_char) = new_pending_char {
        *pending_guard = Some(PendingKeyPress {
            key: pending_char,
            timestamp: std::time::Instant::now(),
        });
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(
        pending: &Arc<Mutex<Option<PendingKeyPress>>>,
        pull_popup_open: bool,
        debug_console_open: bool,
    ) -> KeyEventContext<'_> {
        KeyEventContext {
            pull_popup_open,
            debug_console_open,
            pending_key_shared: pending,
        }
    }

    #[test]
    fn test_two_key_purge_goes_through_pending_state() {
        let pending = Arc::new(Mutex::new(None));
        let ctx = ctx(&pending, false, false);

        assert!(matches!(
            handle_key_event(press(KeyCode::Char('g')), &ctx),
            Action::None
        ));
        assert_eq!(pending.lock().unwrap().as_ref().map(|p| p.key), Some('g'));

        assert!(matches!(
            handle_key_event(press(KeyCode::Char('p')), &ctx),
            Action::PurgeCollection
        ));
        assert!(pending.lock().unwrap().is_none());
    }

    #[test]
    fn test_popup_swallows_shortcuts() {
        let pending = Arc::new(Mutex::new(None));
        let ctx = ctx(&pending, true, false);

        assert!(matches!(
            handle_key_event(press(KeyCode::Char('s')), &ctx),
            Action::None
        ));
        assert!(matches!(
            handle_key_event(press(KeyCode::Esc), &ctx),
            Action::ClosePullPopup
        ));
    }

    #[test]
    fn test_debug_console_captures_navigation() {
        let pending = Arc::new(Mutex::new(None));
        let ctx = ctx(&pending, false, true);

        assert!(matches!(
            handle_key_event(press(KeyCode::Char('j')), &ctx),
            Action::ScrollDebugConsoleDown
        ));
        assert!(matches!(
            handle_key_event(press(KeyCode::Char('r')), &ctx),
            Action::ReloadImages
        ));
    }

    #[test]
    fn test_result_to_action_keeps_ticket() {
        let ticket = image_catalog::ImageList::new().begin_load(true).unwrap();
        let action = result_to_action(TaskResult::ImagesLoaded(
            ticket,
            Err(image_catalog::RawError::from("boom")),
        ));
        assert!(matches!(action, Action::ImagesLoaded(t, Err(_)) if t == ticket));
    }

    #[test]
    fn test_pull_commands_follow_popup_selection() {
        let mut state = AppState::default();
        let ticket = state.images.list.begin_load(true).unwrap();
        state.images.list.complete_load(
            ticket,
            Ok(image_catalog::CollectionResponse {
                images: image_catalog::fixtures::mock_images().images,
                ..Default::default()
            }),
        );
        let image = state.images.list.images()[0].clone();
        let tag = image.tags[0].clone();

        assert!(pull_commands_view_model(&state).is_none());

        state.ui.pull_popup = Some(PullPopupState {
            image_name: image.name.clone(),
            tag_name: tag.name.clone(),
        });
        let vm = pull_commands_view_model(&state).unwrap();
        assert!(vm.commands[0].1.ends_with(&format!(":{}", tag.name)));

        state.ui.pull_popup = Some(PullPopupState {
            image_name: image.name,
            tag_name: "gone".to_string(),
        });
        assert!(pull_commands_view_model(&state).is_none());
    }
}
