//! URL-level response cache used by the image fetcher.
//!
//! # Design
//! The cache is an injected dependency behind `UrlCache`. `shared_cache()`
//! hands out the process-wide default so every fetcher built with
//! `ImageFetcher::new()` sees the same entries, while tests can pass their
//! own instance. Entries are never evicted by `MemoryUrlCache`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::http::{HttpMethod, HttpRequest};

/// Identity of a cached request: URL, method and headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
}

impl CacheKey {
    pub fn for_request(request: &HttpRequest) -> Self {
        let mut headers = request.headers.clone();
        headers.sort();
        Self {
            url: request.url.clone(),
            method: request.method.clone(),
            headers,
        }
    }
}

/// Response metadata plus the raw body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Lookup-by-request, store-by-request. Implementations must be safe to
/// share across threads.
pub trait UrlCache: Send + Sync {
    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse>;
    fn store(&self, key: CacheKey, response: CachedResponse);
}

impl<C: UrlCache + ?Sized> UrlCache for Arc<C> {
    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        (**self).lookup(key)
    }

    fn store(&self, key: CacheKey, response: CachedResponse) {
        (**self).store(key, response)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUrlCache {
    entries: RwLock<HashMap<CacheKey, CachedResponse>>,
}

impl MemoryUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UrlCache for MemoryUrlCache {
    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: CacheKey, response: CachedResponse) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, response);
    }
}

static SHARED: Lazy<Arc<MemoryUrlCache>> = Lazy::new(|| Arc::new(MemoryUrlCache::new()));

/// The process-wide cache. Lives as long as the process.
pub fn shared_cache() -> Arc<MemoryUrlCache> {
    Arc::clone(&SHARED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str, headers: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers,
            body: None,
        }
    }

    fn entry(body: &[u8]) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn store_then_lookup() {
        let cache = MemoryUrlCache::new();
        let key = CacheKey::for_request(&get("https://img.example.com/a.png", Vec::new()));
        assert!(cache.lookup(&key).is_none());
        cache.store(key.clone(), entry(b"png"));
        assert_eq!(cache.lookup(&key).unwrap().body, b"png");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn header_order_does_not_change_key() {
        let a = CacheKey::for_request(&get(
            "https://x/a",
            vec![("b".into(), "2".into()), ("a".into(), "1".into())],
        ));
        let b = CacheKey::for_request(&get(
            "https://x/a",
            vec![("a".into(), "1".into()), ("b".into(), "2".into())],
        ));
        assert_eq!(a, b);
    }

    #[test]
    fn method_is_part_of_key() {
        let cache = MemoryUrlCache::new();
        let mut request = get("https://x/a", Vec::new());
        cache.store(CacheKey::for_request(&request), entry(b"1"));
        request.method = HttpMethod::Head;
        assert!(cache.lookup(&CacheKey::for_request(&request)).is_none());
    }

    #[test]
    fn shared_cache_is_one_instance() {
        assert!(Arc::ptr_eq(&shared_cache(), &shared_cache()));
    }
}
