//! Append-only store of normalized repository activity.
//!
//! `EventStore` is the seam: Postgres behind it in production,
//! `MemoryEventStore` as the test double. The consumer constructs one store
//! at startup and passes it down. Nothing in here retries or mutates stored
//! rows.

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryEventStore;
pub use store::{EventStore, PgEventStore, DEFAULT_RECENT_LIMIT};
