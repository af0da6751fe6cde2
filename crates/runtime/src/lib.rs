//! Bounded worker-pool runtime.
//!
//! A [`ThreadPool`] owns a set of worker threads bound to a shared submission
//! queue and a shared result queue. Callers submit [`WorkRequest`]s, then
//! collect outcomes with [`ThreadPool::poll`] or [`ThreadPool::wait`]; the
//! request's callbacks run on the polling thread.
//!
//! ```ignore
//! let mut pool = ThreadPool::new(&PoolConfig::default())?;
//! for request in make_requests(|n: u64| Ok::<_, String>(n * n), 0..10) {
//!     pool.put_request(request.on_success(|id, sq| println!("{id}: {sq}")), Submit::Block)?;
//! }
//! pool.wait()?;
//! ```

pub mod error;
pub mod pool;
pub mod request;
mod worker;

pub use error::PoolError;
pub use pool::{Submit, ThreadPool};
pub use request::{make_requests, RequestId, WorkFailure, WorkRequest};
