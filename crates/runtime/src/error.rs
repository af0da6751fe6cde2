use thiserror::Error;

use crate::request::RequestId;

/// Errors and control-flow signals raised by the [`ThreadPool`](crate::ThreadPool).
///
/// `NoResultsPending` and `NoWorkersAvailable` are not failures of the pool:
/// callers use them to terminate poll loops.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no results pending")]
    NoResultsPending,

    #[error("no workers available to process pending requests")]
    NoWorkersAvailable,

    #[error("request queue is full")]
    QueueFull,

    #[error("duplicate request id: {0}")]
    DuplicateRequestId(RequestId),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("pool queues disconnected")]
    Disconnected,
}
