//! Resolution error taxonomy and its wire envelope

use handle_classifier::Platform;
use identity_graph_client::GraphError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Unclassifiable handle, unsupported platform, or endpoint platform mismatch
    InvalidIdentity,
    /// The graph answered but nothing usable came back
    NotFound,
    /// The graph backend reported an error
    Upstream { code: u16, message: String },
    /// The graph backend could not be reached
    Network(String),
}

impl ResolveError {
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::InvalidIdentity | ResolveError::NotFound => 404,
            ResolveError::Upstream { code, .. } if (400..600).contains(code) => *code,
            ResolveError::Upstream { .. } | ResolveError::Network(_) => 500,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidIdentity => write!(f, "Invalid Identity or Domain"),
            ResolveError::NotFound => write!(f, "Not Found"),
            ResolveError::Upstream { message, .. } => write!(f, "{}", message),
            ResolveError::Network(_) => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<GraphError> for ResolveError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound => ResolveError::NotFound,
            GraphError::Upstream { code, message } => ResolveError::Upstream { code, message },
            GraphError::Network(e) => ResolveError::Network(e.to_string()),
            GraphError::Decode(msg) => ResolveError::Upstream { code: 500, message: msg },
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Stable failure shape: callers branch on the presence of `error`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub address: Option<String>,
    pub identity: String,
    pub platform: Option<Platform>,
    pub error: String,
    #[serde(skip)]
    pub code: u16,
}

impl ErrorRecord {
    pub fn new(err: &ResolveError, identity: &str, platform: Option<Platform>) -> Self {
        Self {
            address: None,
            identity: identity.to_string(),
            platform,
            error: err.to_string(),
            code: err.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ResolveError::InvalidIdentity.status_code(), 404);
        assert_eq!(ResolveError::NotFound.status_code(), 404);
        assert_eq!(ResolveError::Network("refused".into()).status_code(), 500);
        let upstream = ResolveError::Upstream {
            code: 429,
            message: "slow down".into(),
        };
        assert_eq!(upstream.status_code(), 429);
        let bogus = ResolveError::Upstream {
            code: 200,
            message: "odd".into(),
        };
        assert_eq!(bogus.status_code(), 500);
    }

    #[test]
    fn test_from_graph_error() {
        assert_eq!(
            ResolveError::from(GraphError::NotFound),
            ResolveError::NotFound
        );
        let err = ResolveError::from(GraphError::Upstream {
            code: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "bad gateway");
    }

    #[test]
    fn test_error_record_shape() {
        let record = ErrorRecord::new(
            &ResolveError::InvalidIdentity,
            "not-a-real-handle.zzz",
            Some(Platform::Nextid),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["address"], serde_json::Value::Null);
        assert_eq!(json["identity"], "not-a-real-handle.zzz");
        assert_eq!(json["platform"], "nextid");
        assert_eq!(json["error"], "Invalid Identity or Domain");
        assert!(json.get("code").is_none());
        assert_eq!(record.code, 404);
    }
}
