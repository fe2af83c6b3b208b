//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `HalalClient` builds
//! `HttpRequest` values and classifies `HttpResponse` values; whoever sits
//! in between (the async `HalalScanner` with its `Transport`, or a host with
//! its own HTTP stack) performs the round-trip.

/// HTTP method for a request. The ingredient API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL: base URL followed by `endpoint`.
    pub url: String,
    /// Path relative to the base URL, query string included. Reported in
    /// errors so callers can tell which call failed.
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub const ACCEPT_JSON: (&str, &str) = ("accept", "application/json");
pub const CONTENT_TYPE_JSON: (&str, &str) = ("content-type", "application/json");

/// Start from `accept: application/json` and layer caller headers on top.
///
/// A caller header replaces any existing header with the same name
/// (case-insensitive); otherwise it is appended. Nothing the caller passes
/// is dropped.
pub fn merge_headers(extra: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![(ACCEPT_JSON.0.to_string(), ACCEPT_JSON.1.to_string())];
    for (name, value) in extra {
        match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(existing) => *existing = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
