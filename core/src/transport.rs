//! The network boundary.
//!
//! # Design
//! `Transport` is the only trait in the crate that performs I/O. Everything
//! it returns is plain data from `http`, so the executor and the image
//! fetcher can be driven by a stub in tests and by `reqwest` in production.
//!
//! `ReqwestTransport` writes router headers into a `HeaderMap` with
//! `insert`, so names that differ only in case collapse to the last value
//! and reqwest's own defaults (such as `accept: */*`) only apply to names
//! the router did not set. A header name or value that cannot be encoded
//! fails before anything is sent and is reported as a `TransportError`.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes an `HttpRequest` over the network.
///
/// Implementations return every HTTP reply as data, whatever its status;
/// only failures below HTTP (DNS, refused connection, reset) are errors.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: production implementation using `reqwest`
/// - Test doubles that record requests and replay canned responses
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport.
///
/// Builds a new client for every request, so no connection pool or cookie
/// state outlives a call. Timeouts are reqwest's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(TransportError::new)?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(TransportError::new)?;

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(TransportError::new)?;
            let value = HeaderValue::from_str(value).map_err(TransportError::new)?;
            headers.insert(name, value);
        }

        let mut builder = client.request(method, &request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await.map_err(TransportError::new)?;

        Ok(HttpResponse {
            status: Some(status),
            headers,
            body: Some(body.to_vec()),
        })
    }
}
