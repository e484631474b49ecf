//! HTTP client for a remote SPARQL endpoint.
//!
//! One blocking round-trip per query: the query text is POSTed form-encoded
//! (the Fuseki convention) with a JSON results Accept header, and the
//! response body is deserialized into [`SparqlResults`]. There is no retry,
//! caching or backoff; a failed query propagates to the caller.

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::results::SparqlResults;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for a SPARQL endpoint.
///
/// Held and passed explicitly; there is no process-wide endpoint state.
/// Credentials are plain optional fields, filled by the caller (the CLI reads
/// them from flags and environment, never interactively).
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        EndpointConfig {
            url: url.into(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Client for executing SELECT queries against one endpoint.
pub struct SparqlClient {
    config: EndpointConfig,
    client: Client,
}

impl SparqlClient {
    pub fn new(config: EndpointConfig) -> Result<SparqlClient> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HarvestError::Http(e.to_string()))?;

        Ok(SparqlClient { config, client })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.config.url
    }

    /// Execute a SELECT query and return the parsed JSON result set.
    pub async fn select(&self, query: &str) -> Result<SparqlResults> {
        debug!(url = %self.config.url, bytes = query.len(), "sending SPARQL query");

        let mut request = self
            .client
            .post(&self.config.url)
            .form(&[("query", query)])
            .header("Accept", SPARQL_RESULTS_JSON);

        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| HarvestError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HarvestError::Endpoint { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::Http(e.to_string()))?;
        let results: SparqlResults = serde_json::from_str(&body)?;

        debug!(rows = results.results.bindings.len(), "received result set");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = EndpointConfig::new("http://ldf.fi/coco/sparql")
            .with_credentials("reader", "secret")
            .with_timeout_secs(60);

        assert_eq!(config.url, "http://ldf.fi/coco/sparql");
        assert_eq!(config.username.as_deref(), Some("reader"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 60);
    }
}
