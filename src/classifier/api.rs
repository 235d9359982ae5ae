//! HTTP implementation of [`ClassificationService`].

use serde::Serialize;
use url::Url;

use crate::config::{ConfigError, ServiceSettings};
use crate::http_client;
use crate::model::{DebugInfo, HistoryEntry, ServiceHealth};
use crate::stats::StatsSummary;

use super::wire::{self, PredictRequest, RawPrediction};
use super::{ClassificationService, ClientError};

/// Status and body of a completed HTTP exchange, successful or not.
struct HttpReply {
    status: u16,
    body: String,
}

impl HttpReply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP+JSON client for the classification service.
#[derive(Clone, Debug)]
pub struct HttpClassifier {
    agent: ureq::Agent,
    base_url: Url,
    max_response_bytes: usize,
}

impl HttpClassifier {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            agent: http_client::build_agent(settings),
            base_url: settings.parsed_base_url()?,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Transport(format!("Invalid endpoint {path}: {err}")))
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<HttpReply, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(method, url = %url, "Classification service request");
        let request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let result = match body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_json(body),
            None => request.call(),
        };
        let (status, response) = match result {
            Ok(response) => (response.status(), response),
            Err(ureq::Error::Status(code, response)) => (code, response),
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!(method, url = %url, "Classification service unreachable: {err}");
                return Err(ClientError::Transport(err.to_string()));
            }
        };
        let body = http_client::read_body_limited(response, self.max_response_bytes)
            .map_err(ClientError::Transport)?;
        if !(200..300).contains(&status) {
            tracing::warn!(method, url = %url, status, "Classification service returned an error status");
        }
        Ok(HttpReply { status, body })
    }

    fn get(&self, path: &str) -> Result<HttpReply, ClientError> {
        self.send("GET", path, None::<&()>)
    }

    fn get_ok(&self, path: &str) -> Result<String, ClientError> {
        let reply = self.get(path)?;
        if !reply.is_success() {
            return Err(wire::status_failure(reply.status, &reply.body));
        }
        Ok(reply.body)
    }
}

impl ClassificationService for HttpClassifier {
    fn check_health(&self) -> Result<ServiceHealth, ClientError> {
        let body = self.get_ok("health").map_err(into_connection_error)?;
        wire::parse_health(&body)
    }

    fn predict(&self, text: &str) -> Result<RawPrediction, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("Text cannot be empty".to_string()));
        }
        let reply = self.send("POST", "predict", Some(&PredictRequest { text }))?;
        if !reply.is_success() {
            return Err(wire::prediction_failure(reply.status, &reply.body));
        }
        wire::parse_prediction(&reply.body)
    }

    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        wire::parse_history(&self.get_ok("history")?)
    }

    fn fetch_stats(&self) -> Result<Option<StatsSummary>, ClientError> {
        wire::parse_stats(&self.get_ok("stats")?)
    }

    fn delete_history_entry(&self, id: u64) -> Result<(), ClientError> {
        let reply = self.send("DELETE", &format!("history/{id}"), None::<&()>)?;
        match reply.status {
            200..=299 => Ok(()),
            404 => Err(ClientError::NotFound(id)),
            status => Err(wire::status_failure(status, &reply.body)),
        }
    }

    fn clear_history(&self) -> Result<(), ClientError> {
        let reply = self.send("DELETE", "history/clear", None::<&()>)?;
        if !reply.is_success() {
            return Err(wire::status_failure(reply.status, &reply.body));
        }
        Ok(())
    }

    fn fetch_debug_info(&self) -> Result<DebugInfo, ClientError> {
        wire::parse_debug(&self.get_ok("debug")?)
    }
}

/// Any failed health check means the service cannot be used right now.
fn into_connection_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Transport(message) => {
            ClientError::Connection(format!("Classification service unavailable: {message}"))
        }
        other => other,
    }
}
