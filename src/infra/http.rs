use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::services::{HttpRequest, HttpResponse, HttpTransport};

pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let mut builder = self.http.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AppError::Transport(format!("failed to call {}: {err}", request.url)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("failed to read response: {err}")))?;

        Ok(HttpResponse {
            status,
            body: parse_body(&text),
        })
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
