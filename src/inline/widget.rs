use std::rc::Rc;

use tracing::debug;

use crate::cache::TicketCache;
use crate::domain::ticket::TicketView;
use crate::infra::shortcut::TicketClient;
use crate::render::{Node, NodeHandle, Presenter};
use crate::workflow::resolve::fetch_into_cache;

pub const WIDGET_CLASS: &str = "ji-inline-issue jira-issue-container";

/// Replacement widget for one inline ticket reference.
///
/// Owns its fragment; a fetch that settles after the widget is gone only
/// updates the cache.
#[derive(Debug)]
pub struct InlineTicketWidget {
    key: String,
    compact: bool,
    container: NodeHandle,
}

impl InlineTicketWidget {
    pub fn new(
        key: impl Into<String>,
        compact: bool,
        presenter: &Rc<Presenter>,
        client: &Rc<TicketClient>,
        cache: &Rc<TicketCache>,
    ) -> Self {
        let widget = Self {
            key: key.into(),
            compact,
            container: NodeHandle::new(Node::span(WIDGET_CLASS)),
        };
        widget.build_tag(presenter, client, cache);
        widget
    }

    fn build_tag(&self, presenter: &Rc<Presenter>, client: &Rc<TicketClient>, cache: &Rc<TicketCache>) {
        if let Some(entry) = cache.get(&self.key) {
            let view = entry.payload.to_view(&self.key);
            self.container
                .replace_children(vec![presenter.render_view(&view, self.compact, true)]);
            return;
        }

        let loading = TicketView::Loading {
            key: self.key.clone(),
        };
        self.container
            .replace_children(vec![presenter.render_view(&loading, self.compact, true)]);

        let key = self.key.clone();
        let compact = self.compact;
        let presenter = Rc::clone(presenter);
        let client = Rc::clone(client);
        let cache = Rc::clone(cache);
        let target = self.container.downgrade();
        tokio::task::spawn_local(async move {
            let payload = fetch_into_cache(&client, &cache, &key).await;
            match target.upgrade() {
                Some(container) => container.replace_children(vec![presenter.render_view(
                    &payload.to_view(&key),
                    compact,
                    true,
                )]),
                None => debug!(key = %key, "inline widget detached, dropping update"),
            }
        });
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn to_dom(&self) -> NodeHandle {
        self.container.clone()
    }
}
