pub mod debug_console;
pub mod help;
pub mod image_list;
pub mod pull_popup;
pub mod status_bar;
