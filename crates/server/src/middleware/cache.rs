//! In-memory response cache for catalog reads.
//!
//! Caches successful GET responses in `moka` keyed by request URI. The
//! cache is read-through only; writes never invalidate entries, so the
//! TTL bounds how stale a cached listing can get. Disabled by default
//! and the middleware is a pass-through when off.

use std::time::Duration;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;
use tracing::debug;

use crate::config::CacheConfig;

/// Maximum cached entries.
const MAX_CAPACITY: u64 = 1000;

/// Responses larger than this are served but not stored.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A buffered response ready to be replayed.
#[derive(Clone)]
struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        *response.headers_mut() = self.headers;
        response
    }
}

/// Shared response cache handle.
///
/// Cheap to clone; `None` inside means caching is disabled.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Option<Cache<String, CachedResponse>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let inner = config.enabled.then(|| {
            Cache::builder()
                .max_capacity(MAX_CAPACITY)
                .time_to_live(Duration::from_secs(config.ttl_seconds))
                .build()
        });
        Self { inner }
    }

    /// A cache that never stores anything, for tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self { inner: None }
    }
}

/// Middleware serving GET responses from the cache.
///
/// Only 200 responses are stored. Anything else (errors, redirects,
/// oversized bodies) passes through untouched.
pub async fn response_cache(
    State(cache): State<ResponseCache>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(cache) = cache.inner else {
        return next.run(request).await;
    };
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = request.uri().to_string();
    if let Some(hit) = cache.get(&key).await {
        debug!(uri = %key, "response cache hit");
        return hit.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();

    // Oversized or unknown-length bodies are served untouched; caching
    // trouble must never reach the caller.
    let cacheable = body
        .size_hint()
        .exact()
        .is_some_and(|len| len <= MAX_BODY_BYTES as u64);
    if !cacheable {
        debug!(uri = %key, "response too large to cache");
        return Response::from_parts(parts, body);
    }

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        // The handler's own body stream failed mid-read; there is no
        // intact response left to forward.
        Err(err) => {
            debug!(uri = %key, error = %err, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedResponse {
        status: parts.status,
        headers: parts.headers.clone(),
        body: body.clone(),
    };
    cache.insert(key, cached).await;

    let mut response = (parts.status, body).into_response();
    *response.headers_mut() = parts.headers;
    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Router, middleware::from_fn_with_state, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::config::CacheConfig;

    fn enabled_cache() -> ResponseCache {
        ResponseCache::new(&CacheConfig {
            enabled: true,
            ttl_seconds: 60,
        })
    }

    #[test]
    fn test_disabled_config_yields_no_cache() {
        let cache = ResponseCache::new(&CacheConfig {
            enabled: false,
            ttl_seconds: 60,
        });
        assert!(cache.inner.is_none());
    }

    #[test]
    fn test_enabled_config_builds_cache() {
        assert!(enabled_cache().inner.is_some());
    }

    #[tokio::test]
    async fn test_oversized_body_passes_through_uncached() {
        let cache = enabled_cache();
        let app = Router::new()
            .route("/big", get(|| async { vec![0_u8; 2 * MAX_BODY_BYTES] }))
            .layer(from_fn_with_state(cache.clone(), response_cache));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/big")
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body buffers");
        assert_eq!(body.len(), 2 * MAX_BODY_BYTES);

        // Too big to store, served anyway.
        let inner = cache.inner.expect("cache enabled");
        assert!(inner.get(&"/big".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_small_body_is_cached_and_replayed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let app = Router::new()
            .route(
                "/small",
                get(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "cached"
                    }
                }),
            )
            .layer(from_fn_with_state(enabled_cache(), response_cache));

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/small")
                        .body(Body::empty())
                        .expect("valid request"),
                )
                .await
                .expect("infallible");
            assert_eq!(response.status(), StatusCode::OK);
        }

        // The second request replayed the stored response.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
