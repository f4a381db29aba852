pub mod note;
pub mod resolve;
