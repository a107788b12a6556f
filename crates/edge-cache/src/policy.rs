//! Cache keys and path-derived freshness tiers

/// Path prefix → TTL in seconds. First match wins, so longer prefixes are
/// listed before the shorter ones they extend. A TTL of 0 is never stored.
pub const TTL_TIERS: [(&str, u64); 11] = [
    ("/avatar", 24 * 3600),
    ("/domain", 60),
    ("/refresh", 0),
    ("/health", 0),
    ("/search", 10 * 60),
    ("/credentials", 3600),
    ("/wallet", 3600),
    ("/profile/batch", 4 * 3600),
    ("/ns/batch", 4 * 3600),
    ("/profile", 4 * 3600),
    ("/ns", 4 * 3600),
];

pub const DEFAULT_TTL_SECS: u64 = 3600;

/// `METHOD:path` with the path lowercased and any query string stripped
pub fn cache_key(method: &str, path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    format!("{}:{}", method.to_ascii_uppercase(), path.to_lowercase())
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Freshness of responses under a path
pub fn ttl_for_path(path: &str) -> u64 {
    let path = path.to_lowercase();
    TTL_TIERS
        .iter()
        .find(|(prefix, _)| matches_prefix(&path, prefix))
        .map(|(_, ttl)| *ttl)
        .unwrap_or(DEFAULT_TTL_SECS)
}

/// Avatar routes accept keyless callers under the shared general key
pub fn is_avatar_path(path: &str) -> bool {
    matches_prefix(&path.to_lowercase(), "/avatar")
}

/// `Cache-Control` value for a successful response
pub fn cache_control(ttl_seconds: u64) -> String {
    if ttl_seconds == 0 {
        NO_STORE.to_string()
    } else {
        format!("public, max-age={ttl_seconds}")
    }
}

pub const NO_STORE: &str = "no-store";
