//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe requests and responses as plain data. `build_request`
//! produces an `HttpRequest`, a `Transport` turns it into an `HttpResponse`,
//! and `parse_response` classifies the result. Only the transport does I/O.
//!
//! `HttpResponse` keeps `status` and `body` optional so the two degenerate
//! transport outcomes (no data, no HTTP status) stay representable and
//! testable even though a well-behaved HTTP stack rarely produces them.

use std::fmt;

/// HTTP method for a request.
///
/// Parsing is case-sensitive: only the exact upper-case names map to the
/// named variants, everything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Other(String),
}

impl HttpMethod {
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which methods may carry the router's body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Attach the body to POST requests only. Bodies supplied for PUT, PATCH
    /// or any other method are dropped.
    #[default]
    PostOnly,

    /// Attach the body whatever the method. Changes the wire behavior for
    /// PUT/PATCH routers that carry a body.
    AnyMethod,
}

impl BodyPolicy {
    pub fn allows(self, method: &HttpMethod) -> bool {
        match self {
            BodyPolicy::PostOnly => *method == HttpMethod::Post,
            BodyPolicy::AnyMethod => true,
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data.
///
/// `status` is `None` when the transport's reply could not be read as HTTP;
/// `body` is `None` when the transport returned no data at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

}

/// The success range, 200..=299. Everything else is a failure status.
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}
