//! Inline ticket references inside editable note text.

pub mod matcher;
pub mod plugin;
pub mod view;
pub mod widget;

pub use matcher::{Decoration, DecorationKind, DecorationSet, InlineMatch, TicketMatcher, find_inline_matches};
pub use plugin::{DecorationEngine, InlineDecorations, MatcherHandle};
pub use view::{EditorView, Selection, TextView, ViewSnapshot, ViewUpdate};
pub use widget::InlineTicketWidget;
