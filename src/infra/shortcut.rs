use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ticket::{Ticket, Workflow, WorkflowState};
use crate::error::{AppError, AppResult};
use crate::services::{HttpRequest, HttpTransport};

pub const DEFAULT_BASE_URL: &str = "https://api.app.shortcut.com";
const TOKEN_HEADER: &str = "Shortcut-Token";

/// Client for the Shortcut REST API.
///
/// Holds the workflow-state table used to color status badges. The table is
/// filled by a background bootstrap started in [`TicketClient::connect`];
/// until it lands every lookup is a plain miss.
pub struct TicketClient {
    transport: Rc<dyn HttpTransport>,
    base_url: String,
    api_token: String,
    workflow_states: RefCell<HashMap<u64, WorkflowState>>,
    bootstrap: RefCell<Option<JoinHandle<()>>>,
}

impl TicketClient {
    pub fn new(
        api_token: impl Into<String>,
        transport: Rc<dyn HttpTransport>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_token: api_token.into(),
            workflow_states: RefCell::new(HashMap::new()),
            bootstrap: RefCell::new(None),
        }
    }

    /// Builds a client against the public API and starts loading workflow states.
    ///
    /// Must be called from inside a `tokio::task::LocalSet`.
    pub fn connect(api_token: impl Into<String>, transport: Rc<dyn HttpTransport>) -> Rc<Self> {
        Self::connect_to(DEFAULT_BASE_URL, api_token, transport)
    }

    pub fn connect_to(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        transport: Rc<dyn HttpTransport>,
    ) -> Rc<Self> {
        let client = Rc::new(Self::new(api_token, transport, base_url));
        let weak = Rc::downgrade(&client);
        let handle = tokio::task::spawn_local(async move {
            let Some(client) = weak.upgrade() else {
                return;
            };
            if let Err(err) = client.load_workflow_states().await {
                warn!("failed to load workflow states: {err}");
            }
        });
        *client.bootstrap.borrow_mut() = Some(handle);
        client
    }

    /// Waits for the bootstrap started by [`TicketClient::connect`], if any.
    pub async fn wait_until_ready(&self) {
        let handle = self.bootstrap.borrow_mut().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("workflow state bootstrap did not finish: {err}");
            }
        }
    }

    pub async fn load_workflow_states(&self) -> AppResult<usize> {
        let workflows = self.get_workflow_states().await?;
        let mut table = self.workflow_states.borrow_mut();
        for state in workflows.into_iter().flat_map(|workflow| workflow.states) {
            table.insert(state.id, state);
        }
        info!(count = table.len(), "loaded workflow states");
        Ok(table.len())
    }

    pub async fn get_ticket(&self, id: &str) -> AppResult<Ticket> {
        let response = self
            .transport
            .get(self.request(&format!("stories/{id}")))
            .await?;

        if response.status != 200 {
            return Err(AppError::Fetch {
                id: id.to_string(),
                status: response.status,
            });
        }

        debug!(id, "fetched story");
        serde_json::from_value(response.body)
            .map_err(|err| AppError::Decode(format!("story {id}: {err}")))
    }

    pub async fn get_workflow_states(&self) -> AppResult<Vec<Workflow>> {
        let response = self.transport.get(self.request("workflows")).await?;

        if response.status != 200 {
            return Err(AppError::WorkflowFetch {
                status: response.status,
            });
        }

        serde_json::from_value(response.body)
            .map_err(|err| AppError::Decode(format!("workflows: {err}")))
    }

    pub fn get_workflow_state(&self, state_id: u64) -> Option<WorkflowState> {
        self.workflow_states.borrow().get(&state_id).cloned()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v3/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(self.endpoint(path))
            .header("Content-Type", "application/json")
            .header(TOKEN_HEADER, self.api_token.as_str())
    }
}
