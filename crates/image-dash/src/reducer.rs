use ::log::debug;
use image_catalog::Tag;

use crate::{actions::Action, effect::Effect, state::*};

/// Reported when `connect()` returns without error but the handle is still
/// not usable
pub const NOT_CONNECTED_AFTER_CONNECT: &str = "connect() completed but not connected";

/// Root reducer that delegates to sub-reducers based on action type
/// Pure function: takes state and action, returns (new state, effects to perform)
pub fn reduce(mut state: AppState, action: &Action) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    // The popup needs the tag under the cursor before navigation moves it
    if let Action::Confirm = action
        && state.images.focus == Focus::Tags
        && let (Some(image), Some(tag)) =
            (state.images.selected_image(), state.images.selected_tag())
    {
        state.ui.pull_popup = Some(PullPopupState {
            image_name: image.name.clone(),
            tag_name: tag.name,
        });
    }

    let (ui_state, ui_effects) = ui_reducer(state.ui, action);
    state.ui = ui_state;
    effects.extend(ui_effects);

    let (images_state, images_effects) = images_reducer(state.images, action);
    state.images = images_state;
    effects.extend(images_effects);

    let (task_state, task_effects) = task_reducer(state.task, action);
    state.task = task_state;
    effects.extend(task_effects);

    let (debug_console_state, debug_console_effects) =
        debug_console_reducer(state.debug_console, action);
    state.debug_console = debug_console_state;
    effects.extend(debug_console_effects);

    // A reload may remove the tag the pull popup points at
    if let Action::ImagesLoaded(..) = action
        && let Some(popup) = &state.ui.pull_popup
        && !state
            .images
            .list
            .images()
            .iter()
            .any(|image| image.name == popup.image_name && image.find_tag(&popup.tag_name).is_some())
    {
        state.ui.pull_popup = None;
    }

    (state, effects)
}

/// UI state reducer - handles UI-related actions
fn ui_reducer(mut state: UiState, action: &Action) -> (UiState, Vec<Effect>) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleShortcuts => {
            state.show_shortcuts = !state.show_shortcuts;
            state.shortcuts_scroll = 0;
        }
        Action::ScrollShortcutsUp => {
            state.shortcuts_scroll = state.shortcuts_scroll.saturating_sub(1);
        }
        Action::ScrollShortcutsDown => {
            if state.shortcuts_scroll < state.shortcuts_max_scroll {
                state.shortcuts_scroll += 1;
            }
        }
        Action::ClosePullPopup => {
            state.pull_popup = None;
        }
        Action::TickSpinner => {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
        }
        _ => {}
    }

    (state, vec![])
}

/// Image list reducer - drives the load lifecycle and per-row pagers
fn images_reducer(mut state: ImagesState, action: &Action) -> (ImagesState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::Bootstrap => {
            state.connection = ConnectionState::Connecting;
            effects.push(Effect::LoadEnvFile);
            effects.push(Effect::InitializeClient);
            effects.push(Effect::Connect);
        }
        Action::ConnectComplete(Ok(true)) => {
            state.connection = ConnectionState::Connected;
            if let Some(ticket) = state.list.begin_load(true) {
                effects.push(Effect::LoadImages { ticket });
            }
        }
        Action::ConnectComplete(Ok(false)) => {
            state.connection = ConnectionState::Failed;
            state.list.record_error(NOT_CONNECTED_AFTER_CONNECT);
        }
        Action::ConnectComplete(Err(err)) => {
            state.connection = ConnectionState::Failed;
            state.list.record_error(err.clone());
        }
        Action::ReloadImages => {
            if state.connection == ConnectionState::Failed {
                // Manual reconnect; nothing retries on its own
                state.connection = ConnectionState::Connecting;
                effects.push(Effect::ResetClient);
                effects.push(Effect::LoadEnvFile);
                effects.push(Effect::InitializeClient);
                effects.push(Effect::Connect);
            } else if state.list.is_busy() {
                debug!("Reload ignored while loading");
            } else if let Some(ticket) = state.list.begin_load(state.is_connected()) {
                effects.push(Effect::LoadImages { ticket });
            }
        }
        Action::SyncImages => {
            if state.list.is_busy() {
                debug!("Sync ignored while loading");
            } else if state.list.begin_sync(state.is_connected()) {
                effects.push(Effect::TriggerSync);
            }
        }
        Action::SyncTriggered(outcome) => {
            if let Some(ticket) = state.list.complete_sync_trigger(outcome.clone()) {
                effects.push(Effect::LoadImages { ticket });
            }
        }
        Action::ImagesLoaded(ticket, outcome) => {
            if state.list.complete_load(*ticket, outcome.clone()) {
                reconcile_rows(&mut state);
            }
        }
        Action::SeedCollection => {
            if state.list.is_busy() || !state.is_connected() {
                debug!("Seed ignored (busy or not connected)");
            } else {
                effects.push(Effect::SeedCollection);
            }
        }
        Action::PurgeCollection => {
            if state.list.is_busy() || !state.is_connected() {
                debug!("Purge ignored (busy or not connected)");
            } else {
                effects.push(Effect::PurgeCollection);
            }
        }
        Action::SeedComplete(Ok(_)) | Action::PurgeComplete(Ok(())) => {
            if let Some(ticket) = state.list.begin_load(state.is_connected()) {
                effects.push(Effect::LoadImages { ticket });
            }
        }
        Action::DismissError => {
            state.list.dismiss_error();
        }
        Action::NavigateNext => match state.focus {
            Focus::Images => select_image(&mut state, 1),
            Focus::Tags => move_tag_cursor(&mut state, 1),
        },
        Action::NavigatePrevious => match state.focus {
            Focus::Images => select_image(&mut state, -1),
            Focus::Tags => move_tag_cursor(&mut state, -1),
        },
        Action::NavigateRight => turn_page(&mut state, true),
        Action::NavigateLeft => turn_page(&mut state, false),
        Action::ToggleFocus => {
            state.focus = match state.focus {
                Focus::Images if selected_row_is_expanded(&state) => Focus::Tags,
                _ => Focus::Images,
            };
        }
        Action::Confirm => {
            if state.focus == Focus::Images
                && let Some(row) = state.selected_row_mut()
            {
                row.expanded = !row.expanded;
                row.tag_cursor = 0;
                if row.expanded {
                    state.focus = Focus::Tags;
                }
            }
        }
        Action::Back => match state.focus {
            Focus::Tags => state.focus = Focus::Images,
            Focus::Images => {
                if let Some(row) = state.selected_row_mut() {
                    row.expanded = false;
                }
            }
        },
        Action::CyclePageSize => {
            if let Some(row) = state.selected_row_mut()
                && row.expanded
            {
                row.pager.cycle_page_size();
                row.tag_cursor = 0;
            }
        }
        Action::TogglePassword => {
            if let Some(row) = state.selected_row_mut()
                && row.expanded
            {
                row.show_password = !row.show_password;
            }
        }
        Action::TogglePullToken => {
            if let Some(row) = state.selected_row_mut()
                && row.expanded
            {
                row.show_pull_token = !row.show_pull_token;
            }
        }
        Action::Quit => {
            state.list.unmount();
        }
        _ => {}
    }

    (state, effects)
}

fn selected_row_is_expanded(state: &ImagesState) -> bool {
    state.selected_row().is_some_and(|row| row.expanded)
}

/// Move the repository selection, wrapping at both ends
fn select_image(state: &mut ImagesState, delta: isize) {
    let len = state.list.images().len();
    if len == 0 {
        state.table_state.select(None);
        return;
    }
    let next = match state.table_state.selected() {
        Some(i) if delta > 0 => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.table_state.select(Some(next));
}

/// Move the tag cursor, crossing into the neighbouring page at the edges
fn move_tag_cursor(state: &mut ImagesState, delta: isize) {
    let Some(total) = state.selected_image().map(|img| img.tags.len()) else {
        return;
    };
    let tags = selected_tags(state);
    let Some(row) = state.selected_row_mut() else {
        return;
    };
    let page_len = row.pager.page(&tags).len();

    if delta > 0 {
        if row.tag_cursor + 1 < page_len {
            row.tag_cursor += 1;
        } else if row.pager.page_number() < row.pager.page_count(total) {
            row.pager.next_page(total);
            row.tag_cursor = 0;
        }
    } else if row.tag_cursor > 0 {
        row.tag_cursor -= 1;
    } else if row.pager.page_number() > 1 {
        row.pager.previous_page();
        row.tag_cursor = row.pager.page(&tags).len().saturating_sub(1);
    }
}

fn turn_page(state: &mut ImagesState, forward: bool) {
    let total = selected_tags(state).len();
    if let Some(row) = state.selected_row_mut()
        && row.expanded
    {
        if forward {
            row.pager.next_page(total);
        } else {
            row.pager.previous_page();
        }
        row.tag_cursor = 0;
    }
}

fn selected_tags(state: &ImagesState) -> Vec<Tag> {
    state
        .selected_image()
        .map(|img| img.tags.clone())
        .unwrap_or_default()
}

/// Bring row state in line with freshly loaded images
fn reconcile_rows(state: &mut ImagesState) {
    let images = state.list.images();

    state
        .rows
        .retain(|name, _| images.iter().any(|img| &img.name == name));
    for image in images {
        if let Some(row) = state.rows.get_mut(&image.name) {
            row.pager.clamp_to(image.tags.len());
            let page_len = row.pager.page(&image.tags).len();
            row.tag_cursor = row.tag_cursor.min(page_len.saturating_sub(1));
        }
    }

    let len = images.len();
    match state.table_state.selected() {
        _ if len == 0 => state.table_state.select(None),
        Some(i) if i >= len => state.table_state.select(Some(len - 1)),
        None => state.table_state.select(Some(0)),
        Some(_) => {}
    }

    if state.focus == Focus::Tags && !selected_row_is_expanded(state) {
        state.focus = Focus::Images;
    }
}

/// Task status reducer
fn task_reducer(mut state: TaskState, action: &Action) -> (TaskState, Vec<Effect>) {
    match action {
        Action::SetTaskStatus(status) => {
            state.status = status.clone();
        }
        Action::Bootstrap => {
            state.status = Some(TaskStatus::running("Connecting..."));
        }
        Action::ConnectComplete(result) => {
            state.status = Some(match result {
                Ok(true) => TaskStatus::success("Connected"),
                Ok(false) => TaskStatus::error(NOT_CONNECTED_AFTER_CONNECT),
                Err(err) => TaskStatus::error(format!("Connection failed: {}", err)),
            });
        }
        Action::SyncTriggered(result) => {
            state.status = Some(match result {
                Ok(()) => TaskStatus::success("Sync completed, refreshing images"),
                Err(_) => TaskStatus::warning("Sync failed, refreshing images"),
            });
        }
        Action::SeedComplete(result) => {
            state.status = Some(match result {
                Ok(count) => TaskStatus::success(format!("Seeded {} repositories", count)),
                Err(err) => TaskStatus::error(format!("Seeding failed: {}", err)),
            });
        }
        Action::PurgeComplete(result) => {
            state.status = Some(match result {
                Ok(()) => TaskStatus::success("Collection purged"),
                Err(err) => TaskStatus::error(format!("Purge failed: {}", err)),
            });
        }
        Action::DismissError => {
            if state
                .status
                .as_ref()
                .is_some_and(|s| s.status_type == TaskStatusType::Error)
            {
                state.status = None;
            }
        }
        _ => {}
    }

    (state, vec![])
}

/// Debug console state reducer - handles debug console actions
fn debug_console_reducer(
    mut state: DebugConsoleState,
    action: &Action,
) -> (DebugConsoleState, Vec<Effect>) {
    match action {
        Action::ToggleDebugConsole => {
            state.is_open = !state.is_open;
            // Reset scroll when opening
            if state.is_open {
                state.scroll_offset = 0;
            }
        }
        Action::ScrollDebugConsoleUp => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            state.auto_scroll = false;
        }
        Action::ScrollDebugConsoleDown => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
            state.auto_scroll = false;
        }
        Action::PageDebugConsoleDown => {
            // Keep one line of context
            let page_size = state.viewport_height.saturating_sub(1).max(1);
            state.scroll_offset = state.scroll_offset.saturating_add(page_size);
            state.auto_scroll = false;
        }
        Action::ToggleDebugAutoScroll => {
            state.auto_scroll = !state.auto_scroll;
        }
        Action::ClearDebugLogs => {
            if let Ok(mut logs) = state.logs.lock() {
                logs.clear();
            }
            state.scroll_offset = 0;
        }
        Action::UpdateDebugConsoleViewport(height) => {
            state.viewport_height = *height;
        }
        _ => {}
    }

    (state, vec![])
}
