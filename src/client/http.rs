//! Blocking HTTP key source backed by a `ureq` agent.

use crate::client::provider::KeySource;
use crate::common::config::EndpointConfig;
use crate::contract::SchemeId;
use crate::error::{BenchError, Result};
use std::time::Duration;
use tracing::debug;

/// Fetches key-issuing payloads over HTTP GET.
///
/// Both timeouts are finite so that a hung issuer stalls one tick only.
pub struct HttpKeySource {
    agent: ureq::Agent,
    endpoints: EndpointConfig,
}

impl HttpKeySource {
    pub fn new(endpoints: EndpointConfig, connect_timeout: Duration, request_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(request_timeout)
            .build();
        Self { agent, endpoints }
    }

    pub fn endpoint(&self, scheme: SchemeId) -> &str {
        match scheme {
            SchemeId::Rsa => &self.endpoints.rsa,
            SchemeId::MlKem => &self.endpoints.ml_kem,
        }
    }
}

impl KeySource for HttpKeySource {
    fn fetch(&self, scheme: SchemeId) -> Result<String> {
        let url = self.endpoint(scheme);
        debug!(scheme = %scheme, url = %url, "requesting public key");

        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => {
                BenchError::transport(scheme, format!("HTTP status {} from {}", code, url))
            }
            ureq::Error::Transport(t) => BenchError::transport(scheme, format!("{}: {}", url, t)),
        })?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(BenchError::transport(
                scheme,
                format!("HTTP status {} from {}", status, url),
            ));
        }

        response
            .into_string()
            .map_err(|e| BenchError::transport(scheme, format!("读取响应失败: {}", e)))
    }
}
