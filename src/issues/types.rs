//! Support ticket types.
//!
//! `IssueType` and `IssueStatus` are the single source of truth for the
//! accepted string values, used both for request validation and storage.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Booking,
    Technical,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

/// Error for a string outside an enum's accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for IssueType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(IssueType::Booking),
            "technical" => Ok(IssueType::Technical),
            "other" => Ok(IssueType::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl FromStr for IssueStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IssueStatus::Pending),
            "in-progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Resolved => "resolved",
        }
    }
}

/// A stored support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub issue_type: IssueType,
    pub description: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /issues/create`. Enum fields arrive as raw strings so that
/// bad values produce a field-specific message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewIssue {
    pub issue_type: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub booking_reference: Option<String>,
}

/// Body of `PUT /issues/update/:id`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueUpdate {
    pub issue_type: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub booking_reference: Option<String>,
    pub status: Option<String>,
}
