//! HTTP transport for the Logtail ingestion API
//!
//! Each payload is one `POST` with a bearer token and a JSON body. The
//! connect phase and the whole request have separate time budgets.

use super::Transport;
use crate::core::{DeliveryConfig, Result, SinkError};
use std::io;
use ureq::{Agent, AgentBuilder};

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Blocking HTTP transport backed by a pooled `ureq` agent
///
/// # Example
///
/// ```no_run
/// use rust_logtail_sink::core::DeliveryConfig;
/// use rust_logtail_sink::transport::{HttpTransport, Transport};
///
/// let mut config = DeliveryConfig::new("source-token");
/// config.endpoint = "http://localhost:8080/logs".to_string();
///
/// let transport = HttpTransport::new(&config);
/// transport.send(br#"[]"#).expect("delivery failed");
/// ```
pub struct HttpTransport {
    agent: Agent,
    endpoint: String,
    authorization: String,
}

impl HttpTransport {
    pub fn new(config: &DeliveryConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(config.connection_timeout)
            .timeout(config.timeout)
            .build();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            authorization: format!("Bearer {}", config.token),
        }
    }

    fn classify_transport_error(&self, err: &ureq::Transport) -> SinkError {
        if is_timeout(err) {
            SinkError::timeout(&self.endpoint, err.to_string())
        } else {
            SinkError::network(&self.endpoint, err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, payload: &[u8]) -> Result<()> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .send_bytes(payload);

        match response {
            Ok(response) if (200..300).contains(&response.status()) => Ok(()),
            // Anything below 400 that is not 2xx (e.g. an unfollowed redirect)
            Ok(response) => Err(SinkError::http_status(
                &self.endpoint,
                response.status(),
                response.status_text().to_string(),
            )),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(SinkError::http_status(
                    &self.endpoint,
                    status,
                    truncate(body, MAX_ERROR_BODY),
                ))
            }
            Err(ureq::Error::Transport(err)) => Err(self.classify_transport_error(&err)),
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn is_timeout(err: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = cause.source();
    }
    err.to_string().contains("timed out")
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
