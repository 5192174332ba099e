//! Typed HTTP request execution and cached image fetching.
//!
//! # Overview
//! A caller describes an endpoint through the [`Router`] trait. The
//! [`RequestExecutor`] turns that descriptor into an `HttpRequest`, hands it
//! to a [`Transport`], classifies the `HttpResponse`, and decodes the body
//! into the caller's type. [`ImageFetcher`] fetches images through a shared
//! URL cache and only ever reports success.
//!
//! # Design
//! - `build_request` and `parse_response` are pure functions; the transport
//!   is the only piece that touches the network, so classification is fully
//!   deterministic and testable without a server.
//! - The executor holds no mutable state. Every call is independent: no
//!   retry, no timeout override, no de-duplication.
//! - Decode failures stay distinguishable from `NetworkError` through
//!   `RequestError::Decode`.

pub mod cache;
pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod image_fetch;
pub mod router;
mod runtime;
pub mod transport;

pub use cache::{shared_cache, CacheKey, CachedResponse, MemoryUrlCache, UrlCache};
pub use client::{build_request, parse_response, RequestExecutor};
pub use decode::KeyDecodingStrategy;
pub use error::{NetworkError, RequestError, TransportError};
pub use http::{BodyPolicy, HttpMethod, HttpRequest, HttpResponse};
pub use image_fetch::{ImageFetchError, ImageFetcher};
pub use router::{Endpoint, Router};
pub use transport::{ReqwestTransport, Transport};

pub use image::DynamicImage;
