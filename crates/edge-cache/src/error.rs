//! Error types for the edge cache

use std::fmt;

/// Errors from a cache store backend
#[derive(Debug)]
pub enum CacheError {
    /// The backing store could not complete the operation
    Store(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Store(msg) => write!(f, "Cache store error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

/// Errors from API key verification
#[derive(Debug)]
pub enum AuthError {
    /// No signing secret is configured, so no key can be valid
    NoSecret,
    /// The presented key failed signature or claim checks
    InvalidKey(jsonwebtoken::errors::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NoSecret => write!(f, "API key verification is not configured"),
            AuthError::InvalidKey(e) => write!(f, "Invalid API key: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::InvalidKey(e) => Some(e),
            AuthError::NoSecret => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidKey(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
