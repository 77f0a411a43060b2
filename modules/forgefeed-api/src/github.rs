//! Serde views of the GitHub webhook payloads the feed consumes.
//!
//! Every field is optional at this layer. Requiredness depends on which
//! dispatch rule a delivery matches (a closed-but-unmerged pull request may
//! legitimately lack fields an opened one must carry), so the normalizer
//! decides what is missing, not the deserializer.

use serde::Deserialize;

/// `hook_id` as GitHub sends it: a number on real deliveries, a string from
/// some replay tooling.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HookId {
    Number(i64),
    Text(String),
}

impl HookId {
    pub fn into_request_id(self) -> String {
        match self {
            HookId::Number(n) => n.to_string(),
            HookId::Text(s) => s,
        }
    }
}

/// `push` delivery, pared down to what the feed needs.
#[derive(Debug, Deserialize)]
pub struct PushPayload {
    pub hook_id: Option<HookId>,
    pub pusher: Option<Pusher>,
    /// Full git ref, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pusher {
    pub name: Option<String>,
}

/// `pull_request` delivery envelope.
#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub hook_id: Option<HookId>,
    pub action: Option<String>,
    pub pull_request: Option<PullRequestDetails>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestDetails {
    pub user: Option<Account>,
    pub head: Option<BranchRef>,
    pub base: Option<BranchRef>,
    pub merged: Option<bool>,
    pub merged_by: Option<Account>,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef {
    /// Bare branch name, e.g. `feature/login`.
    #[serde(rename = "ref")]
    pub name: Option<String>,
}
