//! Transport: "send a request, read the body as a byte stream".
//!
//! Connection handling, TLS and status checks belong to the transport.
//! The client above it only sees a reader.

use crate::error::Result;
use serde::Serialize;
use std::io::Read;
use std::time::Duration;

/// Response body handed back by a transport.
pub type ResponseBody = Box<dyn Read + Send>;

/// Request body for the generate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateRequest<'a> {
    /// Model name.
    pub model: &'a str,
    /// Fully framed prompt.
    pub prompt: &'a str,
    /// Whether to ask for a newline-delimited JSON stream.
    pub stream: bool,
}

/// Something that can deliver a generate request and return its body.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response body once headers arrive.
    fn send(&self, request: &GenerateRequest<'_>) -> Result<ResponseBody>;
}

/// Blocking HTTP transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport posting to `endpoint`.
    ///
    /// `timeout` bounds the whole request including body reads; `None`
    /// leaves a slow stream running for as long as the server keeps it open.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(timeout).build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &GenerateRequest<'_>) -> Result<ResponseBody> {
        tracing::debug!(endpoint = %self.endpoint, model = request.model, stream = request.stream, "sending generate request");
        let response = self.agent.post(self.endpoint.as_str()).send_json(request)?;
        Ok(Box::new(response.into_body().into_reader()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateRequest { model: "llama3:8b", prompt: "Hi", stream: true };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "llama3:8b", "prompt": "Hi", "stream": true}));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let transport = HttpTransport::new("http://127.0.0.1:9/api/generate", Some(Duration::from_secs(2)));
        let request = GenerateRequest { model: "m", prompt: "p", stream: false };
        assert!(transport.send(&request).is_err());
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9/api/generate");
    }
}
