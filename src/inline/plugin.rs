use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::cache::TicketCache;
use crate::infra::shortcut::TicketClient;
use crate::inline::matcher::{DecorationSet, TicketMatcher};
use crate::inline::view::{EditorView, ViewUpdate};
use crate::render::Presenter;

/// Shared slot holding the current matcher; swapping it is seen by every engine.
#[derive(Clone)]
pub struct MatcherHandle(Rc<RefCell<TicketMatcher>>);

impl MatcherHandle {
    pub fn new(matcher: TicketMatcher) -> Self {
        Self(Rc::new(RefCell::new(matcher)))
    }

    pub fn replace(&self, matcher: TicketMatcher) {
        *self.0.borrow_mut() = matcher;
    }

    pub fn create_decorations(&self, view: &dyn EditorView) -> DecorationSet {
        self.0.borrow().create_decorations(view)
    }
}

/// Per-view decoration state, rebuilt from scratch on every qualifying update.
pub struct DecorationEngine {
    matcher: MatcherHandle,
    decorations: DecorationSet,
    builds: usize,
}

impl DecorationEngine {
    pub fn new(matcher: MatcherHandle, view: &dyn EditorView) -> Self {
        let decorations = matcher.create_decorations(view);
        Self {
            matcher,
            decorations,
            builds: 1,
        }
    }

    /// Returns whether the decoration set was rebuilt.
    pub fn update(&mut self, update: &ViewUpdate<'_>) -> bool {
        if !update.needs_rebuild() {
            return false;
        }
        self.decorations = self.matcher.create_decorations(update.view);
        self.builds += 1;
        debug!(
            count = self.decorations.len(),
            builds = self.builds,
            "rebuilt inline decorations"
        );
        true
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn destroy(&mut self) {
        self.decorations = DecorationSet::default();
    }
}

/// Owns the matcher that every attached engine builds from.
pub struct InlineDecorations {
    matcher: MatcherHandle,
}

impl InlineDecorations {
    pub fn new(presenter: Rc<Presenter>, client: Rc<TicketClient>, cache: Rc<TicketCache>) -> Self {
        Self {
            matcher: MatcherHandle::new(TicketMatcher::new(presenter, client, cache)),
        }
    }

    /// Rebinds the matcher to new shared instances; attached engines pick it up
    /// on their next rebuild.
    pub fn rebuild(&self, presenter: Rc<Presenter>, client: Rc<TicketClient>, cache: Rc<TicketCache>) {
        self.matcher
            .replace(TicketMatcher::new(presenter, client, cache));
    }

    pub fn attach(&self, view: &dyn EditorView) -> DecorationEngine {
        DecorationEngine::new(self.matcher.clone(), view)
    }

    pub fn matcher(&self) -> MatcherHandle {
        self.matcher.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedTicket;
    use crate::inline::matcher::DecorationKind;
    use crate::inline::view::{Selection, TextView};
    use crate::render::NodeHandle;
    use crate::test_support::{StubTransport, run_local, sample_ticket, settle};

    fn shared(transport: Rc<StubTransport>) -> (Rc<Presenter>, Rc<TicketClient>, Rc<TicketCache>) {
        let client = Rc::new(TicketClient::new("t", transport, "https://api.test"));
        let presenter = Rc::new(Presenter::new(client.clone()));
        (presenter, client, Rc::new(TicketCache::new()))
    }

    fn kinds(engine: &DecorationEngine) -> Vec<DecorationKind> {
        engine.decorations().iter().map(|deco| deco.kind()).collect()
    }

    fn first_widget_dom(engine: &DecorationEngine) -> NodeHandle {
        engine
            .decorations()
            .iter()
            .find_map(|deco| deco.widget())
            .expect("replace decoration")
            .to_dom()
    }

    #[tokio::test]
    async fn rebuilds_only_on_qualifying_updates() {
        run_local(async {
            let (presenter, client, cache) = shared(Rc::new(StubTransport::new()));
            cache.add("ABC-1", CachedTicket::Ticket(sample_ticket("ABC-1", 500)));
            let inline = InlineDecorations::new(presenter, client, cache);

            let mut view = TextView::new("x ABC-1 y").with_cursor(0);
            let mut engine = inline.attach(&view);
            assert_eq!(kinds(&engine), vec![DecorationKind::Replace]);

            let start = view.snapshot();
            assert!(!engine.update(&view.update_since(start)));
            assert_eq!(engine.builds(), 1);

            view.set_selection(Selection::cursor(4));
            assert!(engine.update(&view.update_since(start)));
            assert_eq!(kinds(&engine), vec![DecorationKind::Mark]);

            let start = view.snapshot();
            view.set_live_preview(false);
            view.set_selection(Selection::cursor(0));
            assert!(engine.update(&view.update_since(start)));
            assert_eq!(kinds(&engine), vec![DecorationKind::Mark]);

            let start = view.snapshot();
            view.set_live_preview(true);
            view.replace_range(9..9, " DEF-2");
            assert!(engine.update(&view.update_since(start)));
            assert_eq!(
                kinds(&engine),
                vec![DecorationKind::Replace, DecorationKind::Replace]
            );
            assert_eq!(engine.builds(), 4);

            engine.destroy();
            assert!(engine.decorations().is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn fresh_widgets_are_created_on_each_rebuild() {
        run_local(async {
            let transport = Rc::new(StubTransport::new());
            let (presenter, client, cache) = shared(transport.clone());
            let inline = InlineDecorations::new(presenter, client, cache);

            let mut view = TextView::new("ABC-1 y").with_cursor(7);
            let mut engine = inline.attach(&view);
            let first = first_widget_dom(&engine);

            let start = view.snapshot();
            view.set_selection(Selection::cursor(6));
            engine.update(&view.update_since(start));
            let second = first_widget_dom(&engine);

            first.replace_children(Vec::new());
            assert!(!second.snapshot().children.is_empty());

            settle().await;
            assert_eq!(transport.calls_to("/stories/ABC-1"), 2);
        })
        .await;
    }

    #[tokio::test]
    async fn rebuilt_matcher_is_used_by_existing_engine() {
        run_local(async {
            let old_transport = Rc::new(StubTransport::new());
            let (presenter, client, cache) = shared(old_transport.clone());
            let inline = InlineDecorations::new(presenter, client, cache.clone());

            let mut view = TextView::new("ABC-1 y").with_cursor(7);
            let mut engine = inline.attach(&view);
            settle().await;
            assert_eq!(old_transport.calls_to("/stories/ABC-1"), 1);

            cache.clear();
            let new_transport = Rc::new(StubTransport::new());
            let new_client = Rc::new(TicketClient::new("t2", new_transport.clone(), "https://api.test"));
            let new_presenter = Rc::new(Presenter::new(new_client.clone()));
            inline.rebuild(new_presenter, new_client, cache);

            let start = view.snapshot();
            view.replace_range(7..7, "!");
            assert!(engine.update(&view.update_since(start)));
            settle().await;

            assert_eq!(old_transport.calls_to("/stories/ABC-1"), 1);
            assert_eq!(new_transport.calls_to("/stories/ABC-1"), 1);
            assert_eq!(
                new_transport.calls()[0].header_value("Shortcut-Token"),
                Some("t2")
            );
        })
        .await;
    }
}
