//! Public (shared) encounter table routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{CopyTableResponseDto, PublicTableResponseDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::CurrentUser;
use crate::infrastructure::state::AppState;

/// Fetch a published table by its share slug. No authentication.
pub async fn get_public_table(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PublicTableResponseDto>, ApiError> {
    let loaded = state.encounter_tables.get_public_table(&slug).await?;
    Ok(Json(PublicTableResponseDto::from(loaded)))
}

/// Copy a published table into the caller's collection
pub async fn copy_public_table(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    CurrentUser(caller): CurrentUser,
) -> Result<(StatusCode, Json<CopyTableResponseDto>), ApiError> {
    let copied = state
        .encounter_tables
        .copy_public_table(&caller, &slug)
        .await?;

    Ok((StatusCode::CREATED, Json(CopyTableResponseDto::from(copied))))
}
