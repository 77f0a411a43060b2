//! Turns raw webhook deliveries into feed events.
//!
//! Three rules, keyed on the `X-GitHub-Event` header and the payload's
//! `action` field:
//!
//! - `push`                                  -> [`Action::Push`]
//! - `pull_request` + `opened`               -> [`Action::PullRequest`]
//! - `pull_request` + `closed` + merged flag -> [`Action::Merge`]
//!
//! Everything else is `Ignored`. A delivery that matches a rule but is
//! missing a field the rule needs is rejected, never stored partially.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use forgefeed_common::{Action, NewEvent};

use crate::github::{HookId, PullRequestPayload, PushPayload};

/// Outcome of normalizing one delivery.
#[derive(Debug)]
pub enum Normalized {
    /// Matched a feed rule; store this.
    Event(NewEvent),
    /// Well-formed, but nothing the feed tracks.
    Ignored,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{event_type} payload missing {field}")]
    MissingField {
        event_type: &'static str,
        field: &'static str,
    },

    #[error("malformed {event_type} payload: {source}")]
    Shape {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn missing(event_type: &'static str, field: &'static str) -> NormalizeError {
    NormalizeError::MissingField { event_type, field }
}

/// Treats empty strings as absent so no event carries a blank author or
/// branch.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// `refs/heads/feature/login` -> `login`; a bare name passes through.
fn branch_from_ref(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}

/// `hook_id` when the delivery carries one, otherwise a receipt-derived
/// stand-in so stored events always have a request id.
fn request_id_from(hook_id: Option<HookId>, received_at: DateTime<Utc>) -> String {
    match hook_id {
        Some(id) => id.into_request_id(),
        None => received_at.timestamp_micros().to_string(),
    }
}

/// Normalizes one delivery. `event_type` is the `X-GitHub-Event` header
/// value; `received_at` becomes the event timestamp.
pub fn normalize(
    event_type: &str,
    body: &Value,
    received_at: DateTime<Utc>,
) -> Result<Normalized, NormalizeError> {
    match event_type {
        "push" => normalize_push(body, received_at),
        "pull_request" => normalize_pull_request(body, received_at),
        _ => Ok(Normalized::Ignored),
    }
}

fn normalize_push(body: &Value, received_at: DateTime<Utc>) -> Result<Normalized, NormalizeError> {
    let payload = PushPayload::deserialize(body).map_err(|e| NormalizeError::Shape {
        event_type: "push",
        source: e,
    })?;

    let author = non_empty(payload.pusher.and_then(|p| p.name))
        .ok_or_else(|| missing("push", "pusher.name"))?;
    let git_ref = non_empty(payload.git_ref).ok_or_else(|| missing("push", "ref"))?;
    let to_branch = branch_from_ref(&git_ref).to_string();
    if to_branch.is_empty() {
        return Err(missing("push", "ref"));
    }

    Ok(Normalized::Event(NewEvent {
        request_id: request_id_from(payload.hook_id, received_at),
        author,
        action: Action::Push,
        from_branch: String::new(),
        to_branch,
        timestamp: received_at,
    }))
}

fn normalize_pull_request(
    body: &Value,
    received_at: DateTime<Utc>,
) -> Result<Normalized, NormalizeError> {
    let payload = PullRequestPayload::deserialize(body).map_err(|e| NormalizeError::Shape {
        event_type: "pull_request",
        source: e,
    })?;
    let request_id = request_id_from(payload.hook_id, received_at);

    match payload.action.as_deref() {
        Some("opened") => {
            let pr = payload
                .pull_request
                .ok_or_else(|| missing("pull_request", "pull_request"))?;
            let author = non_empty(pr.user.and_then(|u| u.login))
                .ok_or_else(|| missing("pull_request", "pull_request.user.login"))?;
            let from_branch = non_empty(pr.head.and_then(|h| h.name))
                .ok_or_else(|| missing("pull_request", "pull_request.head.ref"))?;
            let to_branch = non_empty(pr.base.and_then(|b| b.name))
                .ok_or_else(|| missing("pull_request", "pull_request.base.ref"))?;

            Ok(Normalized::Event(NewEvent {
                request_id,
                author,
                action: Action::PullRequest,
                from_branch,
                to_branch,
                timestamp: received_at,
            }))
        }
        Some("closed") => {
            let pr = payload
                .pull_request
                .ok_or_else(|| missing("pull_request", "pull_request"))?;
            // Closed without a merge is abandonment, not activity.
            if !pr.merged.unwrap_or(false) {
                return Ok(Normalized::Ignored);
            }
            let author = non_empty(pr.merged_by.and_then(|u| u.login))
                .ok_or_else(|| missing("pull_request", "pull_request.merged_by.login"))?;
            let from_branch = non_empty(pr.head.and_then(|h| h.name))
                .ok_or_else(|| missing("pull_request", "pull_request.head.ref"))?;
            let to_branch = non_empty(pr.base.and_then(|b| b.name))
                .ok_or_else(|| missing("pull_request", "pull_request.base.ref"))?;

            Ok(Normalized::Event(NewEvent {
                request_id,
                author,
                action: Action::Merge,
                from_branch,
                to_branch,
                timestamp: received_at,
            }))
        }
        _ => Ok(Normalized::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn event(result: Result<Normalized, NormalizeError>) -> NewEvent {
        match result.unwrap() {
            Normalized::Event(e) => e,
            Normalized::Ignored => panic!("expected an event, delivery was ignored"),
        }
    }

    fn assert_ignored(result: Result<Normalized, NormalizeError>) {
        assert!(matches!(result.unwrap(), Normalized::Ignored));
    }

    fn assert_missing(result: Result<Normalized, NormalizeError>, want_field: &str) {
        match result.unwrap_err() {
            NormalizeError::MissingField { field, .. } => assert_eq!(field, want_field),
            other => panic!("expected MissingField, got: {other:?}"),
        }
    }

    fn opened_pr() -> Value {
        json!({
            "hook_id": 555,
            "action": "opened",
            "pull_request": {
                "user": {"login": "bob"},
                "head": {"ref": "feature/login"},
                "base": {"ref": "main"},
                "merged": false
            }
        })
    }

    fn merged_pr() -> Value {
        json!({
            "hook_id": 556,
            "action": "closed",
            "pull_request": {
                "user": {"login": "bob"},
                "head": {"ref": "feature/login"},
                "base": {"ref": "main"},
                "merged": true,
                "merged_by": {"login": "carol"}
            }
        })
    }

    // --- push ---

    #[test]
    fn push_normalizes_author_and_branch() {
        let body = json!({"hook_id": 42, "ref": "refs/heads/main", "pusher": {"name": "alice"}});
        let e = event(normalize("push", &body, received_at()));
        assert_eq!(e.request_id, "42");
        assert_eq!(e.author, "alice");
        assert_eq!(e.action, Action::Push);
        assert_eq!(e.from_branch, "");
        assert_eq!(e.to_branch, "main");
        assert_eq!(e.timestamp, received_at());
    }

    #[test]
    fn push_branch_is_last_ref_segment() {
        let body = json!({"ref": "refs/heads/feature/login", "pusher": {"name": "alice"}});
        let e = event(normalize("push", &body, received_at()));
        assert_eq!(e.to_branch, "login");
    }

    #[test]
    fn push_bare_ref_passes_through() {
        let body = json!({"ref": "main", "pusher": {"name": "alice"}});
        let e = event(normalize("push", &body, received_at()));
        assert_eq!(e.to_branch, "main");
    }

    #[test]
    fn push_missing_pusher_is_rejected() {
        let body = json!({"ref": "refs/heads/main"});
        assert_missing(normalize("push", &body, received_at()), "pusher.name");
    }

    #[test]
    fn push_empty_pusher_name_is_rejected() {
        let body = json!({"ref": "refs/heads/main", "pusher": {"name": ""}});
        assert_missing(normalize("push", &body, received_at()), "pusher.name");
    }

    #[test]
    fn push_missing_ref_is_rejected() {
        let body = json!({"pusher": {"name": "alice"}});
        assert_missing(normalize("push", &body, received_at()), "ref");
    }

    #[test]
    fn push_ref_with_empty_last_segment_is_rejected() {
        let body = json!({"ref": "refs/heads/", "pusher": {"name": "alice"}});
        assert_missing(normalize("push", &body, received_at()), "ref");
    }

    // --- pull_request opened ---

    #[test]
    fn opened_pr_normalizes_fields() {
        let e = event(normalize("pull_request", &opened_pr(), received_at()));
        assert_eq!(e.request_id, "555");
        assert_eq!(e.author, "bob");
        assert_eq!(e.action, Action::PullRequest);
        assert_eq!(e.from_branch, "feature/login");
        assert_eq!(e.to_branch, "main");
    }

    #[test]
    fn opened_pr_without_object_is_rejected() {
        let body = json!({"action": "opened"});
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request",
        );
    }

    #[test]
    fn opened_pr_without_author_is_rejected() {
        let mut body = opened_pr();
        body["pull_request"]["user"] = Value::Null;
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request.user.login",
        );
    }

    #[test]
    fn opened_pr_without_head_is_rejected() {
        let mut body = opened_pr();
        body["pull_request"]["head"] = Value::Null;
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request.head.ref",
        );
    }

    #[test]
    fn opened_pr_without_base_is_rejected() {
        let mut body = opened_pr();
        body["pull_request"]["base"] = Value::Null;
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request.base.ref",
        );
    }

    // --- pull_request closed ---

    #[test]
    fn merged_pr_normalizes_as_merge_by_merger() {
        let e = event(normalize("pull_request", &merged_pr(), received_at()));
        assert_eq!(e.author, "carol");
        assert_eq!(e.action, Action::Merge);
        assert_eq!(e.from_branch, "feature/login");
        assert_eq!(e.to_branch, "main");
    }

    #[test]
    fn closed_unmerged_pr_is_ignored() {
        let mut body = merged_pr();
        body["pull_request"]["merged"] = json!(false);
        assert_ignored(normalize("pull_request", &body, received_at()));
    }

    #[test]
    fn closed_pr_missing_merged_flag_is_ignored() {
        let mut body = merged_pr();
        body["pull_request"]
            .as_object_mut()
            .unwrap()
            .remove("merged");
        assert_ignored(normalize("pull_request", &body, received_at()));
    }

    #[test]
    fn closed_pr_without_object_is_rejected() {
        let body = json!({"action": "closed"});
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request",
        );
    }

    #[test]
    fn merged_pr_without_merger_is_rejected() {
        let mut body = merged_pr();
        body["pull_request"]
            .as_object_mut()
            .unwrap()
            .remove("merged_by");
        assert_missing(
            normalize("pull_request", &body, received_at()),
            "pull_request.merged_by.login",
        );
    }

    // --- ignored deliveries ---

    #[test]
    fn other_pr_actions_are_ignored() {
        let mut body = opened_pr();
        body["action"] = json!("synchronize");
        assert_ignored(normalize("pull_request", &body, received_at()));
    }

    #[test]
    fn pr_without_action_is_ignored() {
        let mut body = opened_pr();
        body.as_object_mut().unwrap().remove("action");
        assert_ignored(normalize("pull_request", &body, received_at()));
    }

    #[test]
    fn unknown_event_type_is_ignored() {
        let body = json!({"hook_id": 1, "zen": "Non-blocking is better than blocking."});
        assert_ignored(normalize("issues", &body, received_at()));
        assert_ignored(normalize("", &body, received_at()));
    }

    // --- request_id ---

    #[test]
    fn string_hook_id_is_kept_verbatim() {
        let body = json!({"hook_id": "abc-123", "ref": "refs/heads/main", "pusher": {"name": "alice"}});
        let e = event(normalize("push", &body, received_at()));
        assert_eq!(e.request_id, "abc-123");
    }

    #[test]
    fn missing_hook_id_falls_back_to_receipt_instant() {
        let body = json!({"ref": "refs/heads/main", "pusher": {"name": "alice"}});
        let e = event(normalize("push", &body, received_at()));
        assert_eq!(e.request_id, received_at().timestamp_micros().to_string());
    }

    // --- shape errors ---

    #[test]
    fn non_object_body_is_rejected() {
        let body = json!([1, 2, 3]);
        let err = normalize("push", &body, received_at()).unwrap_err();
        assert!(matches!(err, NormalizeError::Shape { .. }));
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        let body = json!({"ref": "refs/heads/main", "pusher": 42});
        let err = normalize("push", &body, received_at()).unwrap_err();
        assert!(matches!(err, NormalizeError::Shape { .. }));
    }
}
