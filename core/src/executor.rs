//! Async request executor.
//!
//! # Design
//! Every public operation funnels through `HalalScanner::execute`:
//! build (via `HalalClient`) → send with a deadline → classify → decode.
//! The deadline is `tokio::time::timeout`, which owns both the timer and the
//! in-flight transport future. Whichever way the call ends, both are dropped
//! together, so a timer is never left pending and a transport call that
//! overruns is aborted rather than detached.
//!
//! The network itself sits behind `Transport`; `ReqwestTransport` is the
//! default, tests plug in fakes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::client::{classify_response, HalalClient};
use crate::config::ScannerConfig;
use crate::error::{Result, ScannerError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AnalyzeResult, IngredientDetail, SearchParams, SearchResult};

/// A transport-level failure: DNS, refused connection, broken body, ...
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Performs one HTTP round-trip. Non-2xx statuses are data, not errors:
/// return them as `HttpResponse` and let the executor classify them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Async client for the ingredient API.
///
/// Holds immutable configuration and a shared transport; clones are cheap
/// and calls are independent of each other.
#[derive(Clone)]
pub struct HalalScanner {
    client: HalalClient,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for HalalScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalalScanner")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl HalalScanner {
    /// Scanner backed by `ReqwestTransport`.
    #[cfg(feature = "reqwest")]
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_transport(config, crate::transport::ReqwestTransport::new())
    }

    pub fn with_transport(config: ScannerConfig, transport: impl Transport + 'static) -> Self {
        Self {
            client: HalalClient::new(config),
            transport: Arc::new(transport),
        }
    }

    /// The sans-IO half, for building requests without sending them.
    pub fn client(&self) -> &HalalClient {
        &self.client
    }

    pub fn device_id(&self) -> &str {
        self.client.device_id()
    }

    /// Search the catalog.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResult> {
        let request = self.client.build_search(params)?;
        self.execute(request).await
    }

    /// Detail record for one ingredient. `lang` is a language code such as
    /// "en", `name` the ingredient's URL slug.
    pub async fn check(&self, lang: &str, name: &str) -> Result<IngredientDetail> {
        let request = self.client.build_check(lang, name)?;
        self.execute(request).await
    }

    /// Queue a batch of ingredient names for classification.
    pub async fn analyze<S: AsRef<str>>(&self, ingredients: &[S]) -> Result<AnalyzeResult> {
        let request = self.client.build_analyze(ingredients)?;
        self.execute(request).await
    }

    /// Send an arbitrary request relative to the base URL.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<T> {
        self.execute(self.client.build_request(method, endpoint, body, headers))
            .await
    }

    /// Run one request under the configured timeout and classify the
    /// outcome. Never retries.
    pub async fn execute<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let endpoint = request.endpoint.clone();
        debug!(method = request.method.as_str(), %endpoint, "sending request");

        let outcome = tokio::time::timeout(self.client.timeout(), self.transport.send(request)).await;
        let response = match outcome {
            Err(_) => {
                debug!(%endpoint, timeout = ?self.client.timeout(), "request timed out");
                return Err(ScannerError::timed_out(&endpoint));
            }
            Ok(Err(err)) => {
                debug!(%endpoint, error = %err, "transport failed");
                return Err(ScannerError::network(&endpoint, err.to_string()));
            }
            Ok(Ok(response)) => response,
        };

        debug!(%endpoint, status = response.status, "response received");
        classify_response(&endpoint, response)
    }
}
