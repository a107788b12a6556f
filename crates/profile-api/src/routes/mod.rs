pub mod health;
pub mod profile;
pub mod views;

use handle_classifier::Platform;
use identity_aggregator::ResolveError;

use crate::error::AppError;

/// Parse a platform path segment; an unknown platform is an invalid identity
fn path_platform(platform: &str, handle: &str) -> Result<Platform, AppError> {
    platform
        .parse::<Platform>()
        .map_err(|_| AppError::resolve_on(ResolveError::InvalidIdentity, None, handle))
}
