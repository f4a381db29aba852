use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::cache::Clock;
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::services::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    pub fn at(millis: i64) -> Self {
        Self(Rc::new(Cell::new(millis)))
    }

    pub fn advance(&self, millis: i64) {
        self.0.set(self.0.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.get()
    }
}

/// Transport answering from a fixed route table; unknown paths get a 404.
pub struct StubTransport {
    routes: Vec<(String, HttpResponse)>,
    calls: RefCell<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn route(mut self, path: &str, status: u16, body: Value) -> Self {
        self.routes
            .push((path.to_string(), HttpResponse { status, body }));
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|request| request.url.ends_with(path))
            .count()
    }
}

#[async_trait(?Send)]
impl HttpTransport for StubTransport {
    async fn get(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let response = self
            .routes
            .iter()
            .find(|(path, _)| request.url.ends_with(path.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(HttpResponse {
                status: 404,
                body: Value::Null,
            });
        self.calls.borrow_mut().push(request);
        Ok(response)
    }
}

pub fn sample_ticket(id: &str, workflow_state_id: u64) -> Ticket {
    Ticket {
        id: id.to_string(),
        name: format!("Story {id}"),
        app_url: format!("https://app.shortcut.com/acme/story/{id}"),
        workflow_state_id,
    }
}

pub fn story_body(id: u64, name: &str, workflow_state_id: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "app_url": format!("https://app.shortcut.com/acme/story/{id}"),
        "workflow_state_id": workflow_state_id,
    })
}

pub fn workflows_body() -> Value {
    json!([{
        "id": 1,
        "name": "Engineering",
        "states": [
            {"id": 499, "name": "Backlog", "color": "#bbbbbb", "type": "unstarted"},
            {"id": 500, "name": "In Progress", "color": "#ffd700", "type": "started"},
            {"id": 501, "name": "Done", "type": "done"}
        ]
    }])
}

pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// Lets locally spawned fetches against a [`StubTransport`] run to completion.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
