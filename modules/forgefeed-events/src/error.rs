use thiserror::Error;

/// Failures surfaced by the event store.
///
/// `Unavailable` means the database could not be reached at all (connection
/// refused, pool timed out). `Operation` means the database answered but the
/// statement itself failed. Callers map the two to different HTTP statuses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event store unreachable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("event store operation failed: {0}")]
    Operation(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e),
            other => StoreError::Operation(other),
        }
    }
}
