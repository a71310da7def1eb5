//! `/issues` handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extract::{ApiJson, RecordId};
use crate::http::server::AppState;
use crate::issues::{Issue, IssueError, IssueUpdate, NewIssue};

const NOT_FOUND: &str = "Issue not found";

#[derive(Serialize)]
pub struct IssueResponse {
    pub msg: &'static str,
    pub issue: Issue,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

#[derive(Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn create_issue(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewIssue>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let issue = state.issues.create(input, state.clock.now())?;
    tracing::info!(issue_id = %issue.id, issue_type = ?issue.issue_type, "Issue created");
    Ok((
        StatusCode::CREATED,
        Json(IssueResponse {
            msg: "Issue submitted successfully",
            issue,
        }),
    ))
}

pub async fn list_issues(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.issues.all())
}

pub async fn get_issue(State(state): State<AppState>, id: RecordId) -> Result<Json<Issue>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    Ok(Json(state.issues.get(id)?))
}

pub async fn update_issue(
    State(state): State<AppState>,
    id: RecordId,
    ApiJson(update): ApiJson<IssueUpdate>,
) -> Result<Json<IssueResponse>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    let issue = state.issues.update(id, update, state.clock.now())?;
    tracing::info!(issue_id = %issue.id, status = issue.status.as_str(), "Issue updated");
    Ok(Json(IssueResponse {
        msg: "Issue updated successfully",
        issue,
    }))
}

pub async fn update_issue_status(
    State(state): State<AppState>,
    id: RecordId,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<IssueResponse>, ApiError> {
    let status = body.status.ok_or(IssueError::InvalidStatus)?;
    let id = id.or_not_found(NOT_FOUND)?;
    let issue = state.issues.update_status(id, &status, state.clock.now())?;
    tracing::info!(issue_id = %issue.id, status = issue.status.as_str(), "Issue status changed");
    Ok(Json(IssueResponse {
        msg: "Issue status updated successfully",
        issue,
    }))
}

pub async fn delete_issue(State(state): State<AppState>, id: RecordId) -> Result<Json<MessageResponse>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    let issue = state.issues.delete(id)?;
    tracing::info!(issue_id = %issue.id, "Issue deleted");
    Ok(Json(MessageResponse {
        msg: "Issue deleted successfully",
    }))
}
