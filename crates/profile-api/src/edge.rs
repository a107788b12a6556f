//! Edge cache middleware
//!
//! Every request walks: cache check → API key / rate limit gate → origin →
//! store. Hits skip the gate entirely. Only `200` responses with a body are
//! stored; everything else leaves with `Cache-Control: no-store`.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use edge_cache::{cache_control, cache_key, is_avatar_path, ttl_for_path, CacheEntry, NO_STORE};
use identity_aggregator::ResolveError;
use identity_graph_client::AuthHeaders;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
const CACHE_STATUS_HEADER: &str = "x-cache";
const MAX_CACHED_BODY: usize = 16 * 1024 * 1024;

/// Caller credentials established by the gate, forwarded upstream
pub struct CallerAuth(pub AuthHeaders);

impl<S> FromRequestParts<S> for CallerAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CallerAuth(
            parts
                .extensions
                .get::<AuthHeaders>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// `Path` whose rejection is an invalid identity in the JSON error envelope
/// rather than axum's plain-text 400
pub struct HandlePath<T>(pub T);

impl<S, T> FromRequestParts<S> for HandlePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(HandlePath(value)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), error = %rejection, "Undecodable path");
                Err(AppError::resolve_on(
                    ResolveError::InvalidIdentity,
                    None,
                    &handle_label(parts.uri.path()),
                ))
            }
        }
    }
}

/// API key from `x-api-key`, or a bearer `Authorization` header
fn presented_key(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(API_KEY_HEADER)
        .or_else(|| headers.get(header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())?
        .trim();
    let key = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!key.is_empty()).then(|| key.to_string())
}

fn client_ip(request: &Request) -> String {
    let headers = request.headers();
    let forwarded = headers
        .get("cf-connecting-ip")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
        })
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Last path segment, used as the identity of gate errors
fn handle_label(path: &str) -> String {
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string())
}

/// Key and address of the caller. Read before the first await; the
/// middleware future must not hold a borrow of the request.
struct Caller {
    key: Option<String>,
    ip: String,
}

impl Caller {
    fn from_request(request: &Request) -> Self {
        Self {
            key: presented_key(request.headers()),
            ip: client_ip(request),
        }
    }
}

async fn authorize(state: &AppState, caller: Caller, path: &str) -> Result<AuthHeaders, AppError> {
    if let Some(key) = caller.key {
        return match state.verifier.verify(&key) {
            Ok(claims) => {
                debug!(subject = ?claims.sub, "API key accepted");
                Ok(AuthHeaders::with_api_key(key))
            }
            Err(e) => {
                debug!(error = %e, "API key rejected");
                Err(AppError::Forbidden(handle_label(path)))
            }
        };
    }

    if is_avatar_path(path) {
        return Ok(AuthHeaders {
            api_key: state.general_api_key.clone(),
        });
    }

    let ip = caller.ip;
    let decision = state.limiter.check(&ip).await;
    if decision.allowed {
        Ok(AuthHeaders::default())
    } else {
        warn!(ip = %ip, limit = decision.limit, "Rejecting rate-limited caller");
        Err(AppError::RateLimited(handle_label(path)))
    }
}

fn cached_response(entry: CacheEntry) -> Response {
    let max_age = entry.remaining_seconds(Utc::now());
    Response::builder()
        .status(StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK))
        .header(header::CONTENT_TYPE, entry.content_type)
        .header(header::CACHE_CONTROL, cache_control(max_age))
        .header(CACHE_STATUS_HEADER, "HIT")
        .body(Body::from(entry.body))
        .unwrap_or_else(|e| AppError::Internal(e.to_string()).into_response())
}

fn mark(response: &mut Response, cache_control_value: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(cache_control_value) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
}

async fn store_if_ok(state: &AppState, key: String, ttl: u64, response: Response) -> Response {
    if response.status() != StatusCode::OK {
        let mut response = response;
        mark(&mut response, NO_STORE);
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_CACHED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(format!("Failed to buffer response: {e}")).into_response()
        }
    };

    if bytes.is_empty() {
        debug!(key = %key, "Not caching empty response");
    } else {
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json");
        let entry = CacheEntry::new(key.clone(), bytes.to_vec(), content_type, ttl);
        if let Err(e) = state.cache.put(entry).await {
            warn!(key = %key, error = %e, "Failed to cache response");
        }
    }

    let mut response = Response::from_parts(parts, Body::from(bytes));
    mark(&mut response, &cache_control(ttl));
    response
}

pub async fn edge_cache(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let ttl = if method == Method::GET || method == Method::HEAD {
        ttl_for_path(&path)
    } else {
        0
    };
    let key = cache_key(method.as_str(), &path);

    if ttl > 0 {
        match state.cache.get(&key).await {
            Ok(Some(entry)) if !entry.body.is_empty() => {
                debug!(key = %key, "Edge cache hit");
                return cached_response(entry);
            }
            Ok(Some(_)) => {
                warn!(key = %key, "Evicting cache entry with empty body");
                if let Err(e) = state.cache.delete(&key).await {
                    warn!(key = %key, error = %e, "Failed to evict cache entry");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }
    }

    let caller = Caller::from_request(&request);
    let auth = match authorize(&state, caller, &path).await {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };
    request.extensions_mut().insert(auth);

    let response = next.run(request).await;
    if ttl == 0 {
        let mut response = response;
        mark(&mut response, NO_STORE);
        return response;
    }
    store_if_ok(&state, key, ttl, response).await
}
