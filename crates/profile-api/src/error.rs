//! Error types for the profile API

use std::fmt;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use edge_cache::NO_STORE;
use handle_classifier::{classify, Platform};
use identity_aggregator::{ErrorRecord, ResolveError};

/// Failures while bringing the service up
#[derive(Debug)]
pub enum ServiceError {
    Graph(identity_graph_client::GraphError),
    Asset(asset_resolver::AssetError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Graph(err) => write!(f, "Graph client error: {}", err),
            ServiceError::Asset(err) => write!(f, "Asset resolver error: {}", err),
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
            ServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Graph(err) => Some(err),
            ServiceError::Asset(err) => Some(err),
            ServiceError::Io(err) => Some(err.as_ref()),
            ServiceError::Config(_) => None,
        }
    }
}

impl From<identity_graph_client::GraphError> for ServiceError {
    fn from(err: identity_graph_client::GraphError) -> Self {
        ServiceError::Graph(err)
    }
}

impl From<asset_resolver::AssetError> for ServiceError {
    fn from(err: asset_resolver::AssetError) -> Self {
        ServiceError::Asset(err)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServiceError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Request failure rendered as the `{address, identity, platform, error}`
/// envelope, never cached
#[derive(Debug)]
pub enum AppError {
    Resolve {
        error: ResolveError,
        identity: String,
        platform: Option<Platform>,
    },
    Forbidden(String),
    RateLimited(String),
    Internal(String),
}

impl AppError {
    /// Attach the failing handle, classified when possible
    pub fn resolve(error: ResolveError, raw: &str) -> Self {
        let classified = classify(raw);
        AppError::Resolve {
            error,
            identity: classified
                .as_ref()
                .map(|id| id.handle.clone())
                .unwrap_or_else(|| raw.to_string()),
            platform: classified.map(|id| id.platform),
        }
    }

    /// Like [`AppError::resolve`] when the endpoint fixes the platform
    pub fn resolve_on(error: ResolveError, platform: Option<Platform>, raw: &str) -> Self {
        AppError::Resolve {
            error,
            identity: raw.to_string(),
            platform,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, record) = match self {
            AppError::Resolve {
                error,
                identity,
                platform,
            } => {
                let status = StatusCode::from_u16(error.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(identity = %identity, error = %error, "Resolution failed");
                }
                (status, ErrorRecord::new(&error, &identity, platform))
            }
            AppError::Forbidden(identity) => (
                StatusCode::FORBIDDEN,
                ErrorRecord {
                    address: None,
                    identity,
                    platform: None,
                    error: "Invalid API Key".to_string(),
                    code: 403,
                },
            ),
            AppError::RateLimited(identity) => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorRecord {
                    address: None,
                    identity,
                    platform: None,
                    error: "Too Many Requests".to_string(),
                    code: 429,
                },
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorRecord {
                        address: None,
                        identity: String::new(),
                        platform: None,
                        error: "Internal Server Error".to_string(),
                        code: 500,
                    },
                )
            }
        };

        (status, [(header::CACHE_CONTROL, NO_STORE)], Json(record)).into_response()
    }
}
