//! Error types for the identity graph client

use std::fmt;

#[derive(Debug)]
pub enum GraphError {
    /// The request never produced a response (connect, timeout, body read)
    Network(Box<reqwest::Error>),
    /// The backend answered with an error object or a non-2xx status
    Upstream { code: u16, message: String },
    /// The query succeeded but matched no identity
    NotFound,
    /// The response body was not a recognizable envelope
    Decode(String),
}

impl GraphError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            GraphError::Network(_) | GraphError::Decode(_) => 500,
            GraphError::Upstream { code, .. } => *code,
            GraphError::NotFound => 404,
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Network(err) => write!(f, "Network error: {}", err),
            GraphError::Upstream { code, message } => {
                write!(f, "Upstream error ({}): {}", code, message)
            }
            GraphError::NotFound => write!(f, "Not Found"),
            GraphError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Network(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Network(Box::new(err))
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = GraphError::Upstream {
            code: 429,
            message: "Too Many Requests".to_string(),
        };
        assert_eq!(format!("{}", err), "Upstream error (429): Too Many Requests");
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(GraphError::NotFound.status_code(), 404);
        assert_eq!(GraphError::Decode("bad".into()).status_code(), 500);
    }
}
