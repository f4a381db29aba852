pub mod markup;
pub mod presenter;

pub use markup::{Node, NodeHandle, WeakNodeHandle};
pub use presenter::{Presenter, color_for_type};
