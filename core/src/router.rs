//! Endpoint descriptors consumed by the request executor.

use std::collections::BTreeMap;

/// Read-only description of a single HTTP call.
///
/// Applications usually implement this for an enum of their backend
/// endpoints. Every accessor is consulted once per `execute`.
pub trait Router {
    fn scheme(&self) -> &str;
    fn host(&self) -> &str;
    fn path(&self) -> &str;

    /// Method name as sent on the wire, e.g. `"GET"` or `"POST"`.
    fn method(&self) -> &str;

    /// Ordered query pairs. Duplicate names are sent in order.
    fn query_parameters(&self) -> Option<&[(String, String)]> {
        None
    }

    fn headers(&self) -> Option<&BTreeMap<String, String>> {
        None
    }

    fn body(&self) -> Option<&[u8]> {
        None
    }
}

/// Owned `Router` for callers that don't need their own endpoint type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub method: String,
    pub query: Option<Vec<(String, String)>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<Vec<u8>>,
}

impl Endpoint {
    pub fn new(method: &str, scheme: &str, host: &str, path: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path: path.to_string(),
            method: method.to_string(),
            query: None,
            headers: None,
            body: None,
        }
    }

    pub fn get(scheme: &str, host: &str, path: &str) -> Self {
        Self::new("GET", scheme, host, path)
    }

    pub fn post(scheme: &str, host: &str, path: &str) -> Self {
        Self::new("POST", scheme, host, path)
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query
            .get_or_insert_with(Vec::new)
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl Router for Endpoint {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn query_parameters(&self) -> Option<&[(String, String)]> {
        self.query.as_deref()
    }

    fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
