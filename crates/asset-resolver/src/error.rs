//! Error types for the asset resolver

use std::fmt;

#[derive(Debug)]
pub enum AssetError {
    Http(Box<reqwest::Error>),
    Provider(String),
    UnsupportedChain(u64),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Http(err) => write!(f, "HTTP error: {}", err),
            AssetError::Provider(msg) => write!(f, "NFT provider error: {}", msg),
            AssetError::UnsupportedChain(id) => write!(f, "Unsupported chain id: {}", id),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AssetError {
    fn from(err: reqwest::Error) -> Self {
        AssetError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_chain_display() {
        let err = AssetError::UnsupportedChain(31337);
        assert_eq!(format!("{}", err), "Unsupported chain id: 31337");
    }

    #[test]
    fn test_provider_error_display() {
        let err = AssetError::Provider("status 500".to_string());
        assert_eq!(format!("{}", err), "NFT provider error: status 500");
    }
}
