//! Profile and name-service endpoints, single and batch

use axum::extract::State;
use axum::Json;
use identity_aggregator::{parse_batch_ids, BatchItem, NsRecord, ProfileRecord};

use super::path_platform;
use crate::edge::{CallerAuth, HandlePath};
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<Vec<ProfileRecord>>, AppError> {
    state
        .aggregator
        .profiles(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_platform_profile(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath((platform, handle)): HandlePath<(String, String)>,
) -> Result<Json<ProfileRecord>, AppError> {
    let platform = path_platform(&platform, &handle)?;
    state
        .aggregator
        .platform_profile(platform, &handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve_on(e, Some(platform), &handle))
}

pub async fn get_profile_batch(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(ids): HandlePath<String>,
) -> Result<Json<Vec<BatchItem<ProfileRecord>>>, AppError> {
    let ids = parse_batch_ids(&ids).map_err(|e| AppError::resolve_on(e, None, &ids))?;
    state
        .aggregator
        .batch(&ids, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve_on(e, None, ""))
}

pub async fn get_ns(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<Vec<NsRecord>>, AppError> {
    state
        .aggregator
        .ns(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_platform_ns(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath((platform, handle)): HandlePath<(String, String)>,
) -> Result<Json<NsRecord>, AppError> {
    let platform = path_platform(&platform, &handle)?;
    state
        .aggregator
        .platform_ns(platform, &handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve_on(e, Some(platform), &handle))
}

pub async fn get_ns_batch(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(ids): HandlePath<String>,
) -> Result<Json<Vec<BatchItem<NsRecord>>>, AppError> {
    let ids = parse_batch_ids(&ids).map_err(|e| AppError::resolve_on(e, None, &ids))?;
    state
        .aggregator
        .ns_batch(&ids, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve_on(e, None, ""))
}
