//! `/config` handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::server::AppState;
use crate::policy::{PolicyDocument, PolicyPatch};

#[derive(Serialize)]
pub struct ConfigResponse {
    pub message: &'static str,
    pub config: PolicyDocument,
}

pub async fn get_config(State(state): State<AppState>) -> Json<PolicyDocument> {
    Json(state.policy.get().as_ref().clone())
}

/// POST upserts like PUT; only the status code differs.
pub async fn create_config(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<PolicyPatch>,
) -> Result<(StatusCode, Json<ConfigResponse>), ApiError> {
    let config = state.policy.set(&patch, state.clock.now())?;
    Ok((
        StatusCode::CREATED,
        Json(ConfigResponse {
            message: "Config saved successfully",
            config: config.as_ref().clone(),
        }),
    ))
}

pub async fn update_config(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<PolicyPatch>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let config = state.policy.set(&patch, state.clock.now())?;
    Ok(Json(ConfigResponse {
        message: "Config updated successfully",
        config: config.as_ref().clone(),
    }))
}
