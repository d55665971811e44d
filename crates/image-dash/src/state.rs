use image_catalog::{ImageList, ImageRepository, PagerState, Tag};
use ratatui::widgets::TableState;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{config::Config, theme::Theme};

/// Root application state following Redux pattern
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub ui: UiState,
    pub images: ImagesState,
    pub task: TaskState,
    pub debug_console: DebugConsoleState,
    pub config: Config,
    pub theme: Theme,
}

/// Pending key press for two-key combinations
#[derive(Debug, Clone)]
pub struct PendingKeyPress {
    pub key: char,
    pub timestamp: std::time::Instant,
}

/// UI-specific state (shortcuts panel, spinner, quit flag)
#[derive(Debug, Clone)]
pub struct UiState {
    pub show_shortcuts: bool,
    pub shortcuts_scroll: usize,
    pub shortcuts_max_scroll: usize,
    pub spinner_frame: usize,
    pub should_quit: bool,
    /// Pull command popup for one tag (None = hidden)
    pub pull_popup: Option<PullPopupState>,
    /// Shared with the event handler so popup keys are routed correctly
    pub pull_popup_shared: Arc<Mutex<bool>>,
    /// Pending key press for two-key combinations (3 second timeout)
    pub pending_key: Arc<Mutex<Option<PendingKeyPress>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullPopupState {
    pub image_name: String,
    pub tag_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Which table receives navigation keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Images,
    Tags,
}

/// Image list screen: the load lifecycle plus per-row presentation state
#[derive(Debug, Clone)]
pub struct ImagesState {
    pub list: ImageList,
    pub connection: ConnectionState,
    pub table_state: TableState,
    pub focus: Focus,
    /// Per-repository row state, keyed by repository name
    pub rows: HashMap<String, RowState>,
    pub default_page_size: usize,
}

/// State of one repository row; every row pages independently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowState {
    pub expanded: bool,
    pub pager: PagerState,
    /// Index into the visible page
    pub tag_cursor: usize,
    pub show_password: bool,
    pub show_pull_token: bool,
}

impl RowState {
    pub fn new(page_size: usize) -> Self {
        Self {
            expanded: false,
            pager: PagerState::new(page_size),
            tag_cursor: 0,
            show_password: false,
            show_pull_token: false,
        }
    }
}

impl ImagesState {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn selected_image(&self) -> Option<&ImageRepository> {
        self.table_state
            .selected()
            .and_then(|i| self.list.images().get(i))
    }

    pub fn selected_row(&self) -> Option<&RowState> {
        self.selected_image().and_then(|img| self.rows.get(&img.name))
    }

    /// Row state of the selected repository, created on first access
    pub fn selected_row_mut(&mut self) -> Option<&mut RowState> {
        let name = self.selected_image()?.name.clone();
        let page_size = self.default_page_size;
        Some(
            self.rows
                .entry(name)
                .or_insert_with(|| RowState::new(page_size)),
        )
    }

    /// Tag under the cursor of the selected, expanded repository
    pub fn selected_tag(&self) -> Option<Tag> {
        let image = self.selected_image()?;
        let row = self.rows.get(&image.name)?;
        if !row.expanded {
            return None;
        }
        row.pager.page(&image.tags).into_iter().nth(row.tag_cursor)
    }
}

/// Background task status state
#[derive(Debug, Clone, Default)]
pub struct TaskState {
    pub status: Option<TaskStatus>,
}

/// Debug console state (Quake-style drop-down console)
#[derive(Debug, Clone)]
pub struct DebugConsoleState {
    pub is_open: bool,
    pub scroll_offset: usize,
    pub auto_scroll: bool,   // Follow new logs as they arrive
    pub height_percent: u16, // Height as percentage of screen
    pub logs: crate::log_capture::LogBuffer,
    pub viewport_height: usize, // Updated during rendering for page down
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    pub message: String,
    pub status_type: TaskStatusType,
}

impl TaskStatus {
    pub fn running(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_type: TaskStatusType::Running,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_type: TaskStatusType::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_type: TaskStatusType::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_type: TaskStatusType::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatusType {
    Running,
    Success,
    Error,
    Warning,
}

// Default implementations

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_shortcuts: false,
            shortcuts_scroll: 0,
            shortcuts_max_scroll: 0,
            spinner_frame: 0,
            should_quit: false,
            pull_popup: None,
            pull_popup_shared: Arc::new(Mutex::new(false)),
            pending_key: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for ImagesState {
    fn default() -> Self {
        Self {
            list: ImageList::new(),
            connection: ConnectionState::default(),
            table_state: TableState::default(),
            focus: Focus::default(),
            rows: HashMap::new(),
            default_page_size: image_catalog::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for DebugConsoleState {
    fn default() -> Self {
        Self {
            is_open: false,
            scroll_offset: 0,
            auto_scroll: true,
            height_percent: 50,
            logs: crate::log_capture::DebugConsoleLogger::create_buffer(),
            viewport_height: 20,
        }
    }
}
