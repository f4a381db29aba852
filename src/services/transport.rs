use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status code plus the parsed JSON body. Non-JSON bodies arrive as a string value.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// GET-only transport used by the tracker client.
///
/// Implementations run on the single event thread, so futures are not `Send`.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn get(&self, request: HttpRequest) -> AppResult<HttpResponse>;
}
