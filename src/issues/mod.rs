//! Support tickets raised by users and handled by staff.
//!
//! Status changes only through an explicit staff update; nothing here
//! transitions an issue on its own.

pub mod store;
pub mod types;

pub use store::{IssueError, IssueStore};
pub use types::{Issue, IssueStatus, IssueType, IssueUpdate, NewIssue};
