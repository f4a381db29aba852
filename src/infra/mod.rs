pub mod http;
pub mod shortcut;
