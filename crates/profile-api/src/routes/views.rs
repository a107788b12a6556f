//! Derived views over the aggregation engine

use axum::extract::State;
use axum::Json;
use identity_aggregator::{
    AvatarRecord, CredentialsRecord, DomainRecord, NsRecord, ProfileRecord, WalletRecord,
};

use crate::edge::{CallerAuth, HandlePath};
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_credentials(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<Vec<CredentialsRecord>>, AppError> {
    state
        .aggregator
        .credentials(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_wallet(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<WalletRecord>, AppError> {
    state
        .aggregator
        .wallet(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_domain(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<DomainRecord>, AppError> {
    state
        .aggregator
        .domain(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_avatar(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<AvatarRecord>, AppError> {
    state
        .aggregator
        .avatar(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_search(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<Vec<NsRecord>>, AppError> {
    state
        .aggregator
        .search(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}

pub async fn get_refresh(
    State(state): State<AppState>,
    CallerAuth(auth): CallerAuth,
    HandlePath(handle): HandlePath<String>,
) -> Result<Json<Vec<ProfileRecord>>, AppError> {
    state
        .aggregator
        .refresh(&handle, &auth)
        .await
        .map(Json)
        .map_err(|e| AppError::resolve(e, &handle))
}
