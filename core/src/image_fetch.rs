//! Best-effort image fetching through a URL cache.
//!
//! # Design
//! `ImageFetcher` only ever reports success. The full pipeline lives in
//! `load`, which returns a normal `Result`; `fetch_image` is the single
//! place where the error side is dropped (after a debug log), so the silent
//! failure contract is one visible `match` arm rather than missing handling.

use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::debug;
use url::Url;

use crate::cache::{shared_cache, CacheKey, CachedResponse, MemoryUrlCache, UrlCache};
use crate::error::TransportError;
use crate::http::{is_success, HttpMethod, HttpRequest};
use crate::runtime::run_detached;
use crate::transport::{ReqwestTransport, Transport};

/// Why an image load produced nothing. Never reaches `fetch_image` callers.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no response data")]
    NoResponseData,

    #[error("unexpected status {0:?}")]
    Status(Option<u16>),

    #[error("undecodable image: {0}")]
    Decode(#[from] image::ImageError),
}

pub struct ImageFetcher<C = Arc<MemoryUrlCache>, X = ReqwestTransport> {
    cache: C,
    transport: X,
    runtime: Option<Handle>,
}

impl ImageFetcher {
    /// Fetcher backed by the process-wide cache and `reqwest`.
    pub fn new() -> Self {
        Self {
            cache: shared_cache(),
            transport: ReqwestTransport,
            runtime: None,
        }
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: UrlCache, X: Transport> ImageFetcher<C, X> {
    pub fn with_parts(cache: C, transport: X) -> Self {
        Self {
            cache,
            transport,
            runtime: None,
        }
    }

    /// Runtime used by `spawn_fetch_image`.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Fetch `url` and call `on_success` with the decoded image.
    ///
    /// On any failure `on_success` is simply not called.
    pub async fn fetch_image<F>(&self, url: &str, on_success: F)
    where
        F: FnOnce(DynamicImage),
    {
        match self.load(url).await {
            Ok(image) => on_success(image),
            Err(e) => debug!(url, error = %e, "image fetch dropped"),
        }
    }

    /// Cache lookup, then network on a miss. Successful network loads are
    /// stored before returning.
    pub async fn load(&self, url: &str) -> Result<DynamicImage, ImageFetchError> {
        let url = Url::parse(url)?;
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        };
        let key = CacheKey::for_request(&request);

        if let Some(cached) = self.cache.lookup(&key) {
            match image::load_from_memory(&cached.body) {
                Ok(image) => {
                    debug!(url = %key.url, "image cache hit");
                    return Ok(image);
                }
                Err(e) => debug!(url = %key.url, error = %e, "cached bytes undecodable, refetching"),
            }
        }

        let response = self.transport.send(request).await?;
        let body = response.body.ok_or(ImageFetchError::NoResponseData)?;
        let status = match response.status {
            Some(status) if is_success(status) => status,
            other => return Err(ImageFetchError::Status(other)),
        };
        let image = image::load_from_memory(&body)?;

        self.cache.store(
            key,
            CachedResponse {
                status,
                headers: response.headers,
                body,
            },
        );
        Ok(image)
    }
}

impl<C, X> ImageFetcher<C, X>
where
    C: UrlCache + Clone + 'static,
    X: Transport + Clone + 'static,
{
    /// Run `fetch_image` in the background: on the `with_runtime` handle,
    /// else the caller's runtime, else a dedicated thread. `on_success` runs
    /// at most once, on whichever thread finishes the load.
    pub fn spawn_fetch_image<F>(&self, url: &str, on_success: F)
    where
        F: FnOnce(DynamicImage) + Send + 'static,
    {
        let fetcher = Self {
            cache: self.cache.clone(),
            transport: self.transport.clone(),
            runtime: None,
        };
        let url = url.to_string();
        let work = async move { fetcher.fetch_image(&url, on_success).await };
        run_detached(self.runtime.as_ref(), work, |outcome| {
            if let Err(e) = outcome {
                debug!(error = %e, "image fetch dropped, no runtime");
            }
        });
    }
}
