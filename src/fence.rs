//! Rendering of ` ```shortcut-ticket ` blocks: one ticket reference per line.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::cache::TicketCache;
use crate::domain::ticket::TicketView;
use crate::infra::shortcut::TicketClient;
use crate::inline::view::floor_char_boundary;
use crate::render::{Node, NodeHandle, Presenter, WeakNodeHandle};
use crate::workflow::resolve::fetch_into_cache;

pub const FENCE_LANGUAGE: &str = "shortcut-ticket";
pub const FENCE_TEMPLATE: &str = "```shortcut-ticket\n\n```";

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("valid number pattern"))
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)/([A-Z0-9]+-[0-9]+)\s*$").expect("valid link pattern"))
}

/// Ticket key referenced by a single fence line, if any.
///
/// The first digit run wins, unless it is the numeric tail of a trailing
/// `/KEY-123` link segment, in which case the whole key is returned.
pub fn extract_ticket_key(line: &str) -> Option<String> {
    let number = number_pattern().find(line)?;
    if let Some(key) = link_pattern().captures(line).and_then(|c| c.get(1)) {
        if key.start() <= number.start() && number.end() <= key.end() {
            return Some(key.as_str().to_string());
        }
    }
    Some(number.as_str().to_string())
}

/// Keys of every line that references a ticket, in line order.
pub fn extract_ticket_keys(source: &str) -> Vec<String> {
    source.lines().filter_map(extract_ticket_key).collect()
}

/// Inserts an empty ticket fence at `cursor` (clamped to a char boundary).
pub fn insert_ticket_fence(text: &str, cursor: usize) -> String {
    let at = floor_char_boundary(text, cursor);
    let mut out = String::with_capacity(text.len() + FENCE_TEMPLATE.len());
    out.push_str(&text[..at]);
    out.push_str(FENCE_TEMPLATE);
    out.push_str(&text[at..]);
    out
}

/// Rendered slots of one block, in first-discovery order.
#[derive(Default)]
struct BlockSlots {
    slots: Vec<(String, Node)>,
}

impl BlockSlots {
    fn contains(&self, key: &str) -> bool {
        self.slots.iter().any(|(slot_key, _)| slot_key == key)
    }

    fn set(&mut self, key: &str, node: Node) {
        match self.slots.iter_mut().find(|(slot_key, _)| slot_key == key) {
            Some((_, slot)) => *slot = node,
            None => self.slots.push((key.to_string(), node)),
        }
    }

    fn nodes(&self) -> Vec<Node> {
        self.slots.iter().map(|(_, node)| node.clone()).collect()
    }
}

pub struct FenceRenderer {
    presenter: Rc<Presenter>,
    client: Rc<TicketClient>,
    cache: Rc<TicketCache>,
}

impl FenceRenderer {
    pub fn new(presenter: Rc<Presenter>, client: Rc<TicketClient>, cache: Rc<TicketCache>) -> Self {
        Self {
            presenter,
            client,
            cache,
        }
    }

    /// Renders `source` into `target`, fetching uncached tickets in the background.
    ///
    /// Cached tickets render right away; misses show a placeholder and the
    /// whole block is re-flowed as each fetch settles.
    pub fn render(&self, source: &str, target: &NodeHandle) {
        debug!(source, "rendering ticket fence");
        let slots = Rc::new(RefCell::new(BlockSlots::default()));
        let mut pending = Vec::new();

        for key in extract_ticket_keys(source) {
            if slots.borrow().contains(&key) {
                continue;
            }
            debug!(key = %key, "ticket reference found");
            let view = match self.cache.get(&key) {
                Some(entry) => entry.payload.to_view(&key),
                None => {
                    pending.push(key.clone());
                    TicketView::Loading { key: key.clone() }
                }
            };
            slots
                .borrow_mut()
                .set(&key, self.presenter.render_view(&view, false, false));
        }

        reflow(&self.presenter, target, &slots.borrow());

        for key in pending {
            let presenter = Rc::clone(&self.presenter);
            let client = Rc::clone(&self.client);
            let cache = Rc::clone(&self.cache);
            let slots = Rc::clone(&slots);
            let target = target.downgrade();
            tokio::task::spawn_local(async move {
                let payload = fetch_into_cache(&client, &cache, &key).await;
                let node = presenter.render_view(&payload.to_view(&key), false, false);
                slots.borrow_mut().set(&key, node);
                reflow_detached(&presenter, &target, &slots.borrow());
            });
        }
    }
}

fn reflow(presenter: &Presenter, target: &NodeHandle, slots: &BlockSlots) {
    let children = if slots.slots.is_empty() {
        vec![presenter.render_no_items()]
    } else {
        slots.nodes()
    };
    target.replace_children(vec![presenter.render_container(children)]);
}

fn reflow_detached(presenter: &Presenter, target: &WeakNodeHandle, slots: &BlockSlots) {
    match target.upgrade() {
        Some(target) => reflow(presenter, &target, slots),
        None => debug!("fence target detached, dropping update"),
    }
}
