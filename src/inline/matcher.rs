use std::ops::Range;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::cache::TicketCache;
use crate::infra::shortcut::TicketClient;
use crate::inline::view::{EditorView, floor_char_boundary};
use crate::inline::widget::InlineTicketWidget;
use crate::render::Presenter;

pub const INLINE_TICKET_PATTERN: &str = r"(-?)([A-Z0-9]+-[0-9]+)";
pub const MARK_TAG: &str = "div";
pub const MARK_CLASS: &str = "HyperMD-codeblock HyperMD-codeblock-bg jira-issue-inline-mark";

fn inline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(INLINE_TICKET_PATTERN).expect("valid inline pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    pub range: Range<usize>,
    pub key: String,
    pub compact: bool,
}

pub fn find_inline_matches(text: &str) -> Vec<InlineMatch> {
    inline_pattern()
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            Some(InlineMatch {
                range: whole.range(),
                key: captures[2].to_string(),
                compact: !captures[1].is_empty(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    Mark,
    Replace,
}

/// Marks are used whenever the raw text must stay editable: outside live
/// preview, or while the cursor touches the match.
pub fn decoration_kind(range: &Range<usize>, head: usize, live_preview: bool) -> DecorationKind {
    let touches_cursor = head >= range.start && head <= range.end;
    if !live_preview || touches_cursor {
        DecorationKind::Mark
    } else {
        DecorationKind::Replace
    }
}

#[derive(Debug)]
pub enum Decoration {
    Mark {
        range: Range<usize>,
        tag: &'static str,
        class: &'static str,
    },
    Replace {
        range: Range<usize>,
        widget: InlineTicketWidget,
    },
}

impl Decoration {
    pub fn range(&self) -> &Range<usize> {
        match self {
            Decoration::Mark { range, .. } | Decoration::Replace { range, .. } => range,
        }
    }

    pub fn kind(&self) -> DecorationKind {
        match self {
            Decoration::Mark { .. } => DecorationKind::Mark,
            Decoration::Replace { .. } => DecorationKind::Replace,
        }
    }

    pub fn widget(&self) -> Option<&InlineTicketWidget> {
        match self {
            Decoration::Replace { widget, .. } => Some(widget),
            Decoration::Mark { .. } => None,
        }
    }
}

/// Decorations of one build, ordered by start offset.
#[derive(Debug, Default)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }
}

/// Turns inline ticket matches into decorations bound to shared cache and client.
pub struct TicketMatcher {
    presenter: Rc<Presenter>,
    client: Rc<TicketClient>,
    cache: Rc<TicketCache>,
}

impl TicketMatcher {
    pub fn new(presenter: Rc<Presenter>, client: Rc<TicketClient>, cache: Rc<TicketCache>) -> Self {
        Self {
            presenter,
            client,
            cache,
        }
    }

    pub fn create_decorations(&self, view: &dyn EditorView) -> DecorationSet {
        let text = view.text();
        let head = view.selection().head;
        let live_preview = view.is_live_preview();

        let mut decorations = Vec::new();
        for block in line_blocks(text, view.visible_ranges()) {
            for found in find_inline_matches(&text[block.clone()]) {
                let range = found.range.start + block.start..found.range.end + block.start;
                decorations.push(self.decorate(range, found.key, found.compact, head, live_preview));
            }
        }
        DecorationSet { decorations }
    }

    fn decorate(
        &self,
        range: Range<usize>,
        key: String,
        compact: bool,
        head: usize,
        live_preview: bool,
    ) -> Decoration {
        match decoration_kind(&range, head, live_preview) {
            DecorationKind::Mark => Decoration::Mark {
                range,
                tag: MARK_TAG,
                class: MARK_CLASS,
            },
            DecorationKind::Replace => Decoration::Replace {
                range,
                widget: InlineTicketWidget::new(key, compact, &self.presenter, &self.client, &self.cache),
            },
        }
    }
}

/// Expands visible ranges to whole lines and merges any that overlap or touch.
fn line_blocks(text: &str, ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut blocks: Vec<Range<usize>> = ranges
        .into_iter()
        .map(|range| {
            let start = floor_char_boundary(text, range.start);
            let end = floor_char_boundary(text, range.end.max(range.start));
            let start = text[..start].rfind('\n').map_or(0, |idx| idx + 1);
            let end = text[end..].find('\n').map_or(text.len(), |idx| end + idx);
            start..end
        })
        .collect();
    blocks.sort_by_key(|block| block.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last) if block.start <= last.end + 1 => last.end = last.end.max(block.end),
            _ => merged.push(block),
        }
    }
    merged
}
