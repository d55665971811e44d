use image_catalog::{CatalogError, CollectionResponse, LoadTicket, RawError};

/// Action enum - represents all possible actions in the application
/// Actions are dispatched to the reducer to update state
#[derive(Debug, Clone)]
pub enum Action {
    // User-initiated actions
    Bootstrap,
    ReloadImages,
    SyncImages,
    SeedCollection,
    PurgeCollection,
    DismissError,

    // Image list navigation
    NavigateNext,
    NavigatePrevious,
    NavigateLeft,
    NavigateRight,
    ToggleFocus,
    Confirm, // Expand row, or open pull commands for the selected tag
    Back,
    CyclePageSize,
    TogglePassword,
    TogglePullToken,
    ClosePullPopup,

    ToggleShortcuts,
    ScrollShortcutsUp,
    ScrollShortcutsDown,

    // State update actions (dispatched internally)
    SetTaskStatus(Option<crate::state::TaskStatus>),
    TickSpinner,

    // Background task completion notifications
    ConnectComplete(Result<bool, CatalogError>),
    ImagesLoaded(LoadTicket, Result<CollectionResponse, RawError>),
    SyncTriggered(Result<(), RawError>),
    SeedComplete(Result<usize, String>),
    PurgeComplete(Result<(), String>),

    // Debug console (Quake-style drop-down)
    ToggleDebugConsole,
    ScrollDebugConsoleUp,
    ScrollDebugConsoleDown,
    PageDebugConsoleDown,
    ToggleDebugAutoScroll,
    ClearDebugLogs,
    UpdateDebugConsoleViewport(usize),

    Quit,
    None,
}
