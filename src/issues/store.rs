//! In-memory support ticket store.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::issues::types::{Issue, IssueStatus, IssueType, IssueUpdate, NewIssue};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid issue type")]
    InvalidType,

    #[error("Invalid status value")]
    InvalidStatus,

    #[error("Issue not found")]
    NotFound,
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, IssueError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(IssueError::MissingField(field)),
    }
}

fn parse_type(value: &str) -> Result<IssueType, IssueError> {
    value.parse().map_err(|_| IssueError::InvalidType)
}

fn parse_status(value: &str) -> Result<IssueStatus, IssueError> {
    value.parse().map_err(|_| IssueError::InvalidStatus)
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Default)]
pub struct IssueStore {
    issues: DashMap<Uuid, Issue>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, input: NewIssue, now: DateTime<Utc>) -> Result<Issue, IssueError> {
        let issue_type = parse_type(&required(input.issue_type.as_deref(), "issueType")?)?;
        let description = required(input.description.as_deref(), "description")?;
        let email = required(input.email.as_deref(), "email")?.to_lowercase();

        let issue = Issue {
            id: Uuid::new_v4(),
            issue_type,
            description,
            email,
            booking_reference: optional(input.booking_reference),
            status: IssueStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    /// All issues, newest first.
    pub fn all(&self) -> Vec<Issue> {
        let mut out: Vec<Issue> = self.issues.iter().map(|r| r.value().clone()).collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn get(&self, id: Uuid) -> Result<Issue, IssueError> {
        self.issues.get(&id).map(|r| r.value().clone()).ok_or(IssueError::NotFound)
    }

    /// Apply every provided field; nothing is written if any field is invalid.
    pub fn update(&self, id: Uuid, update: IssueUpdate, now: DateTime<Utc>) -> Result<Issue, IssueError> {
        let issue_type = update.issue_type.as_deref().map(parse_type).transpose()?;
        let status = update.status.as_deref().map(parse_status).transpose()?;
        let description = match update.description.as_deref() {
            Some(d) => Some(required(Some(d), "description")?),
            None => None,
        };
        let email = match update.email.as_deref() {
            Some(e) => Some(required(Some(e), "email")?.to_lowercase()),
            None => None,
        };

        let mut issue = self.issues.get_mut(&id).ok_or(IssueError::NotFound)?;
        if let Some(t) = issue_type {
            issue.issue_type = t;
        }
        if let Some(s) = status {
            issue.status = s;
        }
        if let Some(d) = description {
            issue.description = d;
        }
        if let Some(e) = email {
            issue.email = e;
        }
        if update.booking_reference.is_some() {
            issue.booking_reference = optional(update.booking_reference);
        }
        issue.updated_at = now;
        Ok(issue.clone())
    }

    pub fn update_status(&self, id: Uuid, status: &str, now: DateTime<Utc>) -> Result<Issue, IssueError> {
        let status = parse_status(status)?;
        let mut issue = self.issues.get_mut(&id).ok_or(IssueError::NotFound)?;
        issue.status = status;
        issue.updated_at = now;
        Ok(issue.clone())
    }

    pub fn delete(&self, id: Uuid) -> Result<Issue, IssueError> {
        self.issues.remove(&id).map(|(_, issue)| issue).ok_or(IssueError::NotFound)
    }
}
