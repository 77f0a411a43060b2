//! Renders stored events into the display lines the feed serves.

use chrono::{DateTime, Utc};
use serde::Serialize;

use forgefeed_common::{format_feed_timestamp, Action, Event};

/// One rendered feed line.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Renders events in the order given; callers pass them newest first.
pub fn render_feed(events: &[Event]) -> Vec<FeedItem> {
    events
        .iter()
        .map(|event| FeedItem {
            message: render_message(event),
            timestamp: event.timestamp,
        })
        .collect()
}

fn render_message(event: &Event) -> String {
    let when = format_feed_timestamp(event.timestamp);
    match event.action {
        Action::Push => format!("{} pushed to {} on {}", event.author, event.to_branch, when),
        Action::PullRequest => format!(
            "{} submitted a pull request from {} to {} on {}",
            event.author, event.from_branch, event.to_branch, when
        ),
        Action::Merge => format!(
            "{} merged branch {} to {} on {}",
            event.author, event.from_branch, event.to_branch, when
        ),
    }
}
