//! Batch id parsing and bounded fan-out

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::future::Future;

use crate::error::{ResolveError, Result};

/// Parse a batch path segment: a JSON array of handles, already
/// percent-decoded by the router
pub fn parse_batch_ids(raw: &str) -> Result<Vec<String>> {
    let ids: Vec<String> =
        serde_json::from_str(raw.trim()).map_err(|_| ResolveError::InvalidIdentity)?;
    if ids.is_empty() {
        return Err(ResolveError::InvalidIdentity);
    }
    Ok(ids)
}

/// Await every future, preserving input order. `limit` caps how many run at
/// once; `None` runs them all together.
pub async fn settle_all<F, T>(futures: Vec<F>, limit: Option<usize>) -> Vec<T>
where
    F: Future<Output = T>,
{
    match limit {
        Some(limit) if limit > 0 && limit < futures.len() => {
            stream::iter(futures).buffered(limit).collect().await
        }
        _ => join_all(futures).await,
    }
}
