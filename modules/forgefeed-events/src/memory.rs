//! In-memory `EventStore` for tests and local runs without Postgres.

use std::sync::Mutex;

use async_trait::async_trait;
use forgefeed_common::{Event, NewEvent};

use crate::error::StoreError;
use crate::store::EventStore;

/// Keeps events in a `Vec` behind a mutex. Ids are assigned the way the
/// Postgres store assigns them: starting at 1, monotonically increasing.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    next_id: i64,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored so far, in insertion order.
    pub fn all(&self) -> Vec<Event> {
        self.inner.lock().unwrap().events.clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: NewEvent) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.events.push(Event {
            id,
            request_id: event.request_id,
            author: event.author,
            action: event.action,
            from_branch: event.from_branch,
            to_branch: event.to_branch,
            timestamp: event.timestamp,
        });
        Ok(id)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Event>, StoreError> {
        let mut events = self.inner.lock().unwrap().events.clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        events.truncate(limit.max(0) as usize);
        Ok(events)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.inner.lock().unwrap().events.len() as i64)
    }

    async fn sample(&self) -> Result<Option<Event>, StoreError> {
        Ok(self.inner.lock().unwrap().events.first().cloned())
    }
}
