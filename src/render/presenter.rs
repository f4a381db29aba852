use std::rc::Rc;

use crate::domain::ticket::{Ticket, TicketView};
use crate::infra::shortcut::TicketClient;
use crate::render::markup::Node;

const THEME: &str = "is-dark";
const SHORTCUT_ICON_URL: &str = "https://shortcut.com/icons/icon-48x48.png";
const DEFAULT_STATUS_CLASS: &str = "is-info";
const UNKNOWN_STATE_NAME: &str = "Unknown";

pub const CONTAINER_CLASS: &str = "jira-issue-container";
pub const NO_ITEMS_MESSAGE: &str = "No valid issues found";

/// Badge class for a workflow state category (or a named color).
pub fn color_for_type(kind: &str) -> &'static str {
    match kind {
        "blue-gray" => "is-info",
        "yellow" => "is-warning",
        "green" => "is-success",
        "red" => "is-danger",
        "medium-gray" => "is-dark",
        "unstarted" => "is-dark",
        "started" => "is-info",
        "done" => "is-success",
        _ => DEFAULT_STATUS_CLASS,
    }
}

/// Builds detached nodes for tickets, failures and loading placeholders.
pub struct Presenter {
    client: Rc<TicketClient>,
}

impl Presenter {
    pub fn new(client: Rc<TicketClient>) -> Self {
        Self { client }
    }

    pub fn render_container(&self, children: Vec<Node>) -> Node {
        Node::div(CONTAINER_CLASS).with_children(children)
    }

    pub fn render_loading_item(&self, key: &str, inline: bool) -> Node {
        let row = if inline {
            Node::span("ji-tags has-addons")
        } else {
            Node::div("ji-tags has-addons")
        };

        row.with_child(Node::span(&format!("ji-tag {THEME}")).with_child(Node::span("spinner")))
            .with_child(
                Node::new("a")
                    .with_class(&format!("ji-tag is-link {THEME}"))
                    .with_text(key),
            )
            .with_child(Node::span(&format!("ji-tag {THEME}")).with_text("Loading ..."))
    }

    pub fn render_ticket(&self, ticket: &Ticket, compact: bool) -> Node {
        let icon = Node::new("img")
            .with_class("fit-content")
            .with_attr("src", SHORTCUT_ICON_URL)
            .with_attr("alt", ticket.name.as_str())
            .with_attr("title", ticket.name.as_str());

        let mut row = Node::div("ji-tags has-addons")
            .with_child(Node::span(&format!("ji-tag {THEME} ji-sm-tag")).with_child(icon))
            .with_child(
                Node::new("a")
                    .with_class(&format!("ji-tag is-link {THEME} no-wrap"))
                    .with_attr("href", ticket.app_url.as_str())
                    .with_attr("title", ticket.app_url.as_str())
                    .with_text(ticket.id.as_str()),
            );

        if !compact {
            row = row.with_child(
                Node::span(&format!("ji-tag {THEME} ticket-summary")).with_text(ticket.name.as_str()),
            );
        }

        row.with_child(self.render_status(ticket.workflow_state_id))
    }

    fn render_status(&self, workflow_state_id: u64) -> Node {
        let state = self.client.get_workflow_state(workflow_state_id);
        let (name, color, kind) = match &state {
            Some(state) => (state.name.as_str(), state.color.as_deref(), state.kind.as_str()),
            None => (UNKNOWN_STATE_NAME, None, ""),
        };

        let mut badge = Node::span(&format!("ji-tag no-wrap {}", color_for_type(kind)));
        if let Some(color) = color {
            badge = badge.with_attr("style", format!("background-color: {color}"));
        }
        badge.with_attr("title", name).with_text(name)
    }

    pub fn render_ticket_error(&self, key: &str, message: &str) -> Node {
        Node::div("ji-tags has-addons")
            .with_child(Node::span("ji-tag is-delete is-danger"))
            .with_child(Node::span("ji-tag is-danger is-light").with_text(key))
            .with_child(Node::span("ji-tag is-danger").with_text(message))
    }

    pub fn render_no_items(&self) -> Node {
        Node::div("ji-tags has-addons")
            .with_child(Node::span("ji-tag is-danger is-light").with_text("JiraIssue"))
            .with_child(Node::span("ji-tag is-danger").with_text(NO_ITEMS_MESSAGE))
    }

    pub fn render_view(&self, view: &TicketView, compact: bool, inline: bool) -> Node {
        match view {
            TicketView::Loading { key } => self.render_loading_item(key, inline),
            TicketView::Ready(ticket) => self.render_ticket(ticket, compact),
            TicketView::Failed { key, message } => self.render_ticket_error(key, message),
        }
    }
}
