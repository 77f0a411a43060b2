use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Actions ---

/// The closed set of activity kinds this service records. A webhook that
/// maps to nothing in this set is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Push,
    PullRequest,
    Merge,
}

impl Action {
    /// The store/wire spelling of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Push => "push",
            Action::PullRequest => "pull_request",
            Action::Merge => "merge",
        }
    }

    /// Parse the store spelling. `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "push" => Some(Action::Push),
            "pull_request" => Some(Action::PullRequest),
            "merge" => Some(Action::Merge),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Event records ---

/// A normalized activity record as stored. Immutable once written: there is
/// no update or delete path anywhere in this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    /// Audit tag taken from the delivery's `hook_id`, or a receipt-time
    /// fallback. Never used as a lookup key.
    pub request_id: String,
    pub author: String,
    pub action: Action,
    /// Source branch. Empty for push events.
    pub from_branch: String,
    /// Destination branch. Non-empty for every stored event.
    pub to_branch: String,
    /// Server-side receipt instant, assigned at normalization time. Payload
    /// timestamps are never trusted.
    pub timestamp: DateTime<Utc>,
}

/// A record ready to append. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub request_id: String,
    pub author: String,
    pub action: Action,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: DateTime<Utc>,
}
