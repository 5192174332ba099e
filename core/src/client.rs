//! Typed request execution over any `Transport`.
//!
//! # Design
//! `build_request` and `parse_response` are pure and carry the whole
//! contract: URL composition, body eligibility, header application, and
//! response classification. `RequestExecutor` only glues them around a
//! transport call. It keeps configuration but no per-call state, so one
//! executor can serve any number of concurrent calls.
//!
//! Every status outside 200..=299 produces the same `StatusCode` error.
//! There is no special handling for 401, 403 or 5xx; callers branch on
//! `code` themselves.

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tracing::debug;
use url::Url;

use crate::decode::{decode_body, extract_error_fields, KeyDecodingStrategy};
use crate::error::{NetworkError, RequestError, TransportError};
use crate::http::{is_success, BodyPolicy, HttpMethod, HttpRequest, HttpResponse};
use crate::router::Router;
use crate::runtime::run_detached;
use crate::transport::{ReqwestTransport, Transport};

/// Compose the URL, method, headers and body for `router`.
///
/// Fails with `InvalidUrl` when scheme, host and path do not form a valid
/// absolute URL. The body is attached only if `body_policy` allows the method.
pub fn build_request<R: Router + ?Sized>(
    router: &R,
    body_policy: BodyPolicy,
) -> Result<HttpRequest, NetworkError> {
    let url = compose_url(router)?;
    let method = HttpMethod::parse(router.method());

    let body = router
        .body()
        .filter(|_| body_policy.allows(&method))
        .map(<[u8]>::to_vec);

    let headers = router
        .headers()
        .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    Ok(HttpRequest {
        method,
        url: url.into(),
        headers,
        body,
    })
}

fn compose_url<R: Router + ?Sized>(router: &R) -> Result<Url, NetworkError> {
    let scheme = router.scheme();
    let host = router.host();
    let path = router.path();
    if scheme.is_empty() || host.is_empty() {
        return Err(NetworkError::InvalidUrl);
    }
    if !path.is_empty() && !path.starts_with('/') {
        return Err(NetworkError::InvalidUrl);
    }

    let mut url =
        Url::parse(&format!("{scheme}://{host}")).map_err(|_| NetworkError::InvalidUrl)?;
    // Reject hosts that smuggled in a path, query, fragment or credentials.
    if url.host_str().is_none()
        || !matches!(url.path(), "" | "/")
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
    {
        return Err(NetworkError::InvalidUrl);
    }

    url.set_path(path);
    if let Some(query) = router.query_parameters() {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
    }
    Ok(url)
}

/// Classify a transport outcome and decode a success body into `T`.
///
/// Checks run in a fixed order: transport error, missing body, missing
/// status, then status range.
pub fn parse_response<T: DeserializeOwned>(
    outcome: Result<HttpResponse, TransportError>,
    key_strategy: KeyDecodingStrategy,
) -> Result<T, RequestError> {
    let response = outcome.map_err(NetworkError::TransportFailure)?;
    let body = response.body.as_deref().ok_or(NetworkError::NoResponseData)?;
    let status = response.status.ok_or(NetworkError::InvalidResponseShape)?;

    if is_success(status) {
        return Ok(decode_body(body, key_strategy)?);
    }

    let (message, user_message) = extract_error_fields(body);
    Err(NetworkError::StatusCode {
        code: status,
        message,
        user_message,
    }
    .into())
}

/// Executes `Router` descriptors and decodes their responses.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor<X = ReqwestTransport> {
    transport: X,
    key_strategy: KeyDecodingStrategy,
    body_policy: BodyPolicy,
    runtime: Option<Handle>,
}

impl RequestExecutor<ReqwestTransport> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X: Transport> RequestExecutor<X> {
    pub fn with_transport(transport: X) -> Self {
        Self {
            transport,
            key_strategy: KeyDecodingStrategy::default(),
            body_policy: BodyPolicy::default(),
            runtime: None,
        }
    }

    pub fn with_key_strategy(mut self, key_strategy: KeyDecodingStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    pub fn with_body_policy(mut self, body_policy: BodyPolicy) -> Self {
        self.body_policy = body_policy;
        self
    }

    /// Runtime used by `spawn_execute`.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Perform one call and decode its body into `T`.
    ///
    /// An `InvalidUrl` failure returns before the transport is touched.
    pub async fn execute<T, R>(&self, router: &R) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        R: Router + ?Sized,
    {
        let request = build_request(router, self.body_policy)?;
        self.dispatch(request).await
    }

    async fn dispatch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, RequestError> {
        debug!(
            method = %request.method,
            url = %request.url,
            body = %String::from_utf8_lossy(request.body.as_deref().unwrap_or_default()),
            "sending request"
        );
        let url = request.url.clone();
        let outcome = self.transport.send(request).await;
        if let Ok(response) = &outcome {
            debug!(
                url = %url,
                status = ?response.status,
                body = %String::from_utf8_lossy(response.body.as_deref().unwrap_or_default()),
                "received response"
            );
        }
        parse_response(outcome, self.key_strategy)
    }
}

impl<X: Transport + Clone + 'static> RequestExecutor<X> {
    /// Run the call in the background and hand the result to `on_complete`.
    ///
    /// Uses the `with_runtime` handle, else the caller's runtime, else a
    /// dedicated thread, so it is safe to call from a thread with no tokio
    /// context. The callback runs exactly once, on whichever thread finishes
    /// the call; callers that need a particular thread must hop back
    /// themselves.
    pub fn spawn_execute<T, R, F>(&self, router: &R, on_complete: F)
    where
        T: DeserializeOwned + Send + 'static,
        R: Router + ?Sized,
        F: FnOnce(Result<T, RequestError>) + Send + 'static,
    {
        let request = build_request(router, self.body_policy);
        let executor = self.clone();
        let work = async move {
            match request {
                Ok(request) => executor.dispatch(request).await,
                Err(e) => Err(e.into()),
            }
        };
        run_detached(self.runtime.as_ref(), work, move |outcome| {
            on_complete(outcome.unwrap_or_else(|e| {
                Err(NetworkError::TransportFailure(TransportError::new(e)).into())
            }))
        });
    }
}
