use std::ops::Range;

/// Main selection of an editor, as byte offsets into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }
}

/// What the decoration engine needs from the host editor.
pub trait EditorView {
    fn text(&self) -> &str;
    fn selection(&self) -> Selection;
    fn is_live_preview(&self) -> bool;

    /// Byte ranges currently on screen.
    fn visible_ranges(&self) -> Vec<Range<usize>> {
        vec![0..self.text().len()]
    }
}

/// A transaction applied to a view, described by what changed.
pub struct ViewUpdate<'a> {
    pub view: &'a dyn EditorView,
    pub doc_changed: bool,
    pub start_selection: Selection,
    pub start_live_preview: bool,
}

impl ViewUpdate<'_> {
    pub fn selection_changed(&self) -> bool {
        self.start_selection != self.view.selection()
    }

    pub fn mode_changed(&self) -> bool {
        self.start_live_preview != self.view.is_live_preview()
    }

    pub fn needs_rebuild(&self) -> bool {
        self.doc_changed || self.selection_changed() || self.mode_changed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSnapshot {
    version: u64,
    selection: Selection,
    live_preview: bool,
}

/// In-memory editor view used by the CLI host and tests.
#[derive(Debug, Clone)]
pub struct TextView {
    text: String,
    version: u64,
    selection: Selection,
    live_preview: bool,
    visible: Option<Vec<Range<usize>>>,
}

impl TextView {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: 0,
            selection: Selection::default(),
            live_preview: true,
            visible: None,
        }
    }

    pub fn with_cursor(mut self, pos: usize) -> Self {
        self.set_selection(Selection::cursor(pos));
        self
    }

    pub fn with_live_preview(mut self, live_preview: bool) -> Self {
        self.live_preview = live_preview;
        self
    }

    pub fn with_visible_ranges(mut self, ranges: Vec<Range<usize>>) -> Self {
        self.visible = Some(ranges);
        self
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            version: self.version,
            selection: self.selection,
            live_preview: self.live_preview,
        }
    }

    /// Describes everything that changed since `start` was taken.
    pub fn update_since(&self, start: ViewSnapshot) -> ViewUpdate<'_> {
        ViewUpdate {
            view: self,
            doc_changed: start.version != self.version,
            start_selection: start.selection,
            start_live_preview: start.live_preview,
        }
    }

    /// Replaces `range` with `insert`; the selection is clamped into the new text.
    pub fn replace_range(&mut self, range: Range<usize>, insert: &str) {
        self.text.replace_range(range, insert);
        self.version += 1;
        self.set_selection(self.selection);
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection {
            anchor: floor_char_boundary(&self.text, selection.anchor),
            head: floor_char_boundary(&self.text, selection.head),
        };
    }

    pub fn set_live_preview(&mut self, live_preview: bool) {
        self.live_preview = live_preview;
    }
}

impl EditorView for TextView {
    fn text(&self) -> &str {
        &self.text
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn is_live_preview(&self) -> bool {
        self.live_preview
    }

    fn visible_ranges(&self) -> Vec<Range<usize>> {
        match &self.visible {
            Some(ranges) => ranges.clone(),
            None => vec![0..self.text.len()],
        }
    }
}

pub(crate) fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
