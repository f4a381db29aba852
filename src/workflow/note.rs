//! Batch rendering of a whole note, used by the command line host.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::context::PluginContext;
use crate::fence::FENCE_LANGUAGE;
use crate::inline::{Decoration, DecorationEngine, DecorationSet, Selection, TextView};
use crate::render::markup::escape_html;
use crate::render::{Node, NodeHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceBlock {
    /// Whole block, opening and closing fence lines included.
    pub range: Range<usize>,
    pub body: String,
}

/// Locates `shortcut-ticket` fenced code blocks. An unclosed block runs to the end of the note.
pub fn find_ticket_fences(text: &str) -> Vec<FenceBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<FenceBlock> = None;

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.split_whitespace().next() == Some(FENCE_LANGUAGE) =>
            {
                open = Some(FenceBlock {
                    range: through_line_end(text, range),
                    body: String::new(),
                });
            }
            Event::Text(chunk) => {
                if let Some(block) = open.as_mut() {
                    block.body.push_str(&chunk);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = open.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }
    blocks
}

fn through_line_end(text: &str, mut range: Range<usize>) -> Range<usize> {
    if !text[..range.end].ends_with('\n') && text[range.end..].starts_with('\n') {
        range.end += 1;
    }
    range
}

/// Byte ranges of `text` outside every fence, trimmed to end before the fence line.
fn prose_ranges(text: &str, fences: &[FenceBlock]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut pos = 0;
    for fence in fences {
        let end = fence.range.start.saturating_sub(1).max(pos);
        if end > pos {
            ranges.push(pos..end);
        }
        pos = fence.range.end;
    }
    if pos < text.len() {
        ranges.push(pos..text.len());
    }
    ranges
}

pub struct RenderedNote {
    text: String,
    fences: Vec<(FenceBlock, NodeHandle)>,
    engine: DecorationEngine,
}

impl RenderedNote {
    pub fn fences(&self) -> impl Iterator<Item = (&FenceBlock, &NodeHandle)> {
        self.fences.iter().map(|(block, target)| (block, target))
    }

    pub fn decorations(&self) -> &DecorationSet {
        self.engine.decorations()
    }

    /// Current state of the note as HTML; reflects whatever fetches have settled.
    pub fn to_html(&self) -> String {
        enum Piece<'a> {
            Fence(&'a NodeHandle),
            Inline(&'a Decoration),
        }

        let mut pieces: Vec<(Range<usize>, Piece<'_>)> = self
            .fences
            .iter()
            .map(|(block, target)| (block.range.clone(), Piece::Fence(target)))
            .chain(
                self.decorations()
                    .iter()
                    .map(|deco| (deco.range().clone(), Piece::Inline(deco))),
            )
            .collect();
        pieces.sort_by_key(|(range, _)| range.start);

        let mut out = String::from("<div class=\"markdown-preview-view\">");
        let mut pos = 0;
        for (range, piece) in pieces {
            if range.start < pos {
                continue;
            }
            out.push_str(&escape_html(&self.text[pos..range.start]));
            match piece {
                Piece::Fence(target) => out.push_str(&target.to_html()),
                Piece::Inline(Decoration::Mark { tag, class, .. }) => {
                    let mark = Node::new(tag)
                        .with_class(class)
                        .with_text(&self.text[range.clone()]);
                    out.push_str(&mark.to_html());
                }
                Piece::Inline(Decoration::Replace { widget, .. }) => {
                    out.push_str(&widget.to_dom().to_html())
                }
            }
            pos = range.end;
        }
        out.push_str(&escape_html(&self.text[pos..]));
        out.push_str("</div>");
        out
    }
}

/// Renders every ticket fence and decorates inline references outside them.
pub fn render_note(ctx: &PluginContext, text: &str, cursor: usize, live_preview: bool) -> RenderedNote {
    let fences = find_ticket_fences(text);

    let rendered: Vec<(FenceBlock, NodeHandle)> = fences
        .iter()
        .map(|block| {
            let target = NodeHandle::new(Node::div(&format!("block-language-{FENCE_LANGUAGE}")));
            ctx.fence().render(&block.body, &target);
            (block.clone(), target)
        })
        .collect();

    let mut view = TextView::new(text)
        .with_live_preview(live_preview)
        .with_visible_ranges(prose_ranges(text, &fences));
    view.set_selection(Selection::cursor(cursor));
    let engine = ctx.inline().attach(&view);

    RenderedNote {
        text: text.to_string(),
        fences: rendered,
        engine,
    }
}
