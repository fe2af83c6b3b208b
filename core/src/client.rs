//! Stateless HTTP request builder and response classifier for the
//! ingredient API.
//!
//! # Design
//! `HalalClient` holds only its resolved configuration. Each operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`; the round-trip in
//! between belongs to someone else (see `executor`). All status handling
//! lives in `classify_response`, so every path through the crate applies
//! the same policy.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ResolvedConfig, ScannerConfig};
use crate::error::{Result, ScannerError};
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE_JSON};
use crate::types::{
    AnalyzeRequest, AnalyzeResult, HalalStatus, IngredientDetail, QueuedIngredient, SearchParams,
    SearchResult,
};

pub const SEARCH_PATH: &str = "/v1/public/ingredients";
pub const DETAIL_PATH: &str = "/v1/public/ingredients";
pub const ANALYZE_PATH: &str = "/v1/queue/ingredients/json";

/// Characters left alone inside a path segment: alphanumerics and
/// `- _ . ! ~ * ' ( )`. Everything else, `/` and `?` included, is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Search filters under their wire names, in wire order. Empty strings and
/// zero numbers are treated as absent.
#[derive(Serialize)]
struct SearchQuery<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<HalalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verified_only: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    e_number: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<u32>,
}

impl<'a> From<&'a SearchParams> for SearchQuery<'a> {
    fn from(params: &'a SearchParams) -> Self {
        let flag = |on: bool| on.then_some("true");
        let text = |value: &'a Option<String>| value.as_deref().filter(|v| !v.is_empty());
        let number = |value: Option<u32>| value.filter(|n| *n > 0);
        SearchQuery {
            search: &params.query,
            status: params.status,
            category: text(&params.category),
            language: text(&params.language),
            verified_only: flag(params.verified_only),
            e_number: flag(params.e_number),
            page: number(params.page),
            per_page: number(params.per_page),
        }
    }
}

/// Synchronous, stateless client for the ingredient API.
///
/// Builds `HttpRequest` values and classifies `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct HalalClient {
    config: ResolvedConfig,
}

impl HalalClient {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config: config.resolve(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn device_id(&self) -> &str {
        &self.config.device_id
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Generic request against `endpoint` (relative path, query included).
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: impl Into<String>,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> HttpRequest {
        let endpoint = endpoint.into();
        HttpRequest {
            method,
            url: format!("{}{endpoint}", self.config.base_url),
            endpoint,
            headers: merge_headers(headers),
            body,
        }
    }

    pub fn build_search(&self, params: &SearchParams) -> Result<HttpRequest> {
        let query = serde_urlencoded::to_string(SearchQuery::from(params))
            .map_err(|e| ScannerError::network(SEARCH_PATH, e.to_string()))?;
        Ok(self.build_request(HttpMethod::Get, format!("{SEARCH_PATH}?{query}"), None, &[]))
    }

    /// Both segments are escaped independently so neither can add a path
    /// level or start a query string.
    ///
    /// A segment that is exactly `.` or `..` is rejected: URL parsers
    /// collapse it (escaped as `%2E` or not), which would send the request
    /// to a different route.
    pub fn build_check(&self, lang: &str, name: &str) -> Result<HttpRequest> {
        let endpoint = format!(
            "{DETAIL_PATH}/{}/{}",
            utf8_percent_encode(lang, PATH_SEGMENT),
            utf8_percent_encode(name, PATH_SEGMENT)
        );
        if let Some(segment) = [lang, name].into_iter().find(|s| is_dot_segment(s)) {
            return Err(ScannerError::network(
                &endpoint,
                format!("path segment {segment:?} cannot be sent as a single segment"),
            ));
        }
        Ok(self.build_request(HttpMethod::Get, endpoint, None, &[]))
    }

    /// Submission order is preserved: the service correlates results with
    /// the names it was sent. An empty list is sent as-is.
    pub fn build_analyze<S: AsRef<str>>(&self, ingredients: &[S]) -> Result<HttpRequest> {
        let payload = AnalyzeRequest {
            ingredients: ingredients
                .iter()
                .map(|name| QueuedIngredient::unclassified(name.as_ref()))
                .collect(),
            device_id: self.config.device_id.clone(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ScannerError::network(ANALYZE_PATH, e.to_string()))?;
        let headers = [(CONTENT_TYPE_JSON.0.to_string(), CONTENT_TYPE_JSON.1.to_string())];
        Ok(self.build_request(HttpMethod::Post, ANALYZE_PATH, Some(body), &headers))
    }

    pub fn parse_search(&self, endpoint: &str, response: HttpResponse) -> Result<SearchResult> {
        classify_response(endpoint, response)
    }

    pub fn parse_check(&self, endpoint: &str, response: HttpResponse) -> Result<IngredientDetail> {
        classify_response(endpoint, response)
    }

    pub fn parse_analyze(&self, endpoint: &str, response: HttpResponse) -> Result<AnalyzeResult> {
        classify_response(endpoint, response)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// Turn a completed response into a decoded value or a classified error.
///
/// 429 wins over everything, whatever the body says. Any other non-2xx
/// becomes `Api` with the body text verbatim (or `HTTP <status>` if the body
/// is empty). A 2xx body that does not decode is reported as `Network`.
pub fn classify_response<T: DeserializeOwned>(endpoint: &str, response: HttpResponse) -> Result<T> {
    if response.status == 429 {
        return Err(ScannerError::RateLimited {
            endpoint: endpoint.to_string(),
        });
    }
    if !response.is_success() {
        let message = if response.body.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            response.body
        };
        return Err(ScannerError::Api {
            status: response.status,
            endpoint: endpoint.to_string(),
            message,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ScannerError::network(endpoint, e.to_string()))
}
