use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crossbeam_channel::{
    bounded, unbounded, Receiver, Sender, SendTimeoutError, TryRecvError, TrySendError,
};
use les_core::PoolConfig;
use tracing::{debug, error, info, warn};

use crate::error::PoolError;
use crate::request::{PendingRequest, RequestId, WorkRequest};
use crate::worker::{Completion, Envelope, Worker, WorkerChannels};

/// How [`ThreadPool::put_request`] behaves when the request queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Wait until there is room.
    Block,
    /// Wait at most this long, then fail with [`PoolError::QueueFull`].
    Timeout(Duration),
    /// Fail immediately with [`PoolError::QueueFull`].
    NonBlocking,
}

/// A pool of worker threads fed through a submission queue, with outcomes
/// collected from a result queue.
///
/// The pool itself is driven by a single control thread: submission, polling,
/// and worker management all take `&mut self`. The two queues are the only
/// state shared with workers.
///
/// When both queues are bounded and results are not polled promptly, workers
/// block on the full result queue and submitters block on the full request
/// queue. Submit with [`Submit::Timeout`] or keep one queue unbounded.
pub struct ThreadPool<T, E> {
    requests_tx: Sender<Envelope<T, E>>,
    requests_rx: Receiver<Envelope<T, E>>,
    results_tx: Sender<Completion<T, E>>,
    results_rx: Receiver<Completion<T, E>>,
    workers: Vec<Worker>,
    dismissed: Vec<Worker>,
    pending: HashMap<RequestId, PendingRequest<T, E>>,
    poll_timeout: Duration,
    spawned: usize,
}

fn queue<M>(capacity: usize) -> (Sender<M>, Receiver<M>) {
    if capacity == 0 {
        unbounded()
    } else {
        bounded(capacity)
    }
}

impl<T, E> ThreadPool<T, E>
where
    T: Send + 'static,
    E: Send + fmt::Display + 'static,
{
    /// Create the queues and start `config.resolved_workers()` workers.
    pub fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let mut pool = Self::idle(config);
        pool.create_workers(config.resolved_workers())?;
        info!(
            workers = pool.workers.len(),
            request_queue = config.request_queue_size,
            result_queue = config.result_queue_size,
            "thread pool started"
        );
        Ok(pool)
    }

    /// Create the queues without starting any worker.
    pub fn idle(config: &PoolConfig) -> Self {
        let (requests_tx, requests_rx) = queue(config.request_queue_size);
        let (results_tx, results_rx) = queue(config.result_queue_size);
        Self {
            requests_tx,
            requests_rx,
            results_tx,
            results_rx,
            workers: Vec::new(),
            dismissed: Vec::new(),
            pending: HashMap::new(),
            poll_timeout: config.poll_timeout(),
            spawned: 0,
        }
    }

    /// Start `num_workers` additional workers bound to the shared queues.
    pub fn create_workers(&mut self, num_workers: usize) -> Result<(), PoolError> {
        for _ in 0..num_workers {
            self.spawned += 1;
            let channels = WorkerChannels {
                requests: self.requests_rx.clone(),
                requeue: self.requests_tx.clone(),
                results: self.results_tx.clone(),
            };
            let name = format!("les-pool-worker-{}", self.spawned);
            let worker = Worker::spawn(name, channels, self.poll_timeout)?;
            self.workers.push(worker);
        }
        Ok(())
    }

    /// Tell up to `num_workers` workers to quit after their current job.
    ///
    /// With `join`, blocks until each has exited; otherwise they are parked
    /// for [`join_all_dismissed_workers`](Self::join_all_dismissed_workers).
    pub fn dismiss_workers(&mut self, num_workers: usize, join: bool) {
        let count = num_workers.min(self.workers.len());
        let split_at = self.workers.len() - count;
        let dismissed: Vec<Worker> = self.workers.drain(split_at..).collect();
        for worker in &dismissed {
            debug!(worker = %worker.name(), "dismissing worker");
            worker.dismiss();
        }
        if join {
            for worker in dismissed {
                worker.join();
            }
        } else {
            self.dismissed.extend(dismissed);
        }
    }

    /// Block until every previously dismissed worker has exited.
    pub fn join_all_dismissed_workers(&mut self) {
        for worker in self.dismissed.drain(..) {
            worker.join();
        }
    }

    /// Enqueue a request and track it as pending.
    ///
    /// Returns the identifier the outcome will be reported under.
    pub fn put_request(
        &mut self,
        request: WorkRequest<T, E>,
        mode: Submit,
    ) -> Result<RequestId, PoolError> {
        let (id, job, pending) = request.into_parts();
        let id = id.unwrap_or_else(RequestId::generate);
        if self.pending.contains_key(&id) {
            return Err(PoolError::DuplicateRequestId(id));
        }

        let envelope = Envelope { id: id.clone(), job };
        match mode {
            Submit::Block => self
                .requests_tx
                .send(envelope)
                .map_err(|_| PoolError::Disconnected)?,
            Submit::Timeout(timeout) => {
                self.requests_tx
                    .send_timeout(envelope, timeout)
                    .map_err(|e| match e {
                        SendTimeoutError::Timeout(_) => PoolError::QueueFull,
                        SendTimeoutError::Disconnected(_) => PoolError::Disconnected,
                    })?
            }
            Submit::NonBlocking => self.requests_tx.try_send(envelope).map_err(|e| match e {
                TrySendError::Full(_) => PoolError::QueueFull,
                TrySendError::Disconnected(_) => PoolError::Disconnected,
            })?,
        }

        self.pending.insert(id.clone(), pending);
        Ok(id)
    }

    /// Deliver at most one outcome to its callbacks.
    ///
    /// Returns `Ok(None)` when not blocking and no outcome is ready yet.
    pub fn poll(&mut self, block: bool) -> Result<Option<RequestId>, PoolError> {
        if self.pending.is_empty() {
            return Err(PoolError::NoResultsPending);
        }
        if block && self.workers.is_empty() {
            return Err(PoolError::NoWorkersAvailable);
        }

        let completion = if block {
            self.results_rx.recv().map_err(|_| PoolError::Disconnected)?
        } else {
            match self.results_rx.try_recv() {
                Ok(completion) => completion,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(PoolError::Disconnected),
            }
        };

        let Completion { id, outcome } = completion;
        let Some(request) = self.pending.remove(&id) else {
            error!(request_id = %id, "outcome received for unknown request");
            return Ok(Some(id));
        };

        match outcome {
            Ok(value) => {
                if let Some(callback) = request.on_success {
                    callback(&id, value);
                }
            }
            Err(failure) => match request.on_failure {
                Some(callback) => callback(&id, failure),
                None => error!(request_id = %id, error = %failure, "work request failed"),
            },
        }
        Ok(Some(id))
    }

    /// Block until every pending request has been delivered.
    pub fn wait(&mut self) -> Result<(), PoolError> {
        loop {
            match self.poll(true) {
                Ok(_) => {}
                Err(PoolError::NoResultsPending) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn dismissed_count(&self) -> usize {
        self.dismissed.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Requests sitting in the submission queue, not yet picked up.
    pub fn queued_count(&self) -> usize {
        self.requests_rx.len()
    }
}

impl<T, E> Drop for ThreadPool<T, E> {
    fn drop(&mut self) {
        // Workers exit within one poll timeout; one blocked on the result
        // queue exits once the receiving end is dropped with the pool.
        for worker in self.workers.iter().chain(&self.dismissed) {
            worker.dismiss();
        }
        if !self.pending.is_empty() {
            warn!(pending = self.pending.len(), "thread pool dropped with undelivered requests");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize) -> PoolConfig {
        PoolConfig {
            num_workers: workers,
            request_queue_size: 0,
            result_queue_size: 0,
            poll_timeout_ms: 20,
        }
    }

    #[test]
    fn new_starts_configured_workers() {
        let pool = ThreadPool::<u32, String>::new(&config(3)).unwrap();
        assert_eq!(pool.worker_count(), 3);
        assert_eq!(pool.dismissed_count(), 0);
        assert_eq!(pool.pending_count(), 0);
    }

    #[test]
    fn idle_pool_has_no_workers() {
        let pool = ThreadPool::<u32, String>::idle(&config(3));
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn duplicate_assigned_id_is_rejected() {
        let mut pool = ThreadPool::<u32, String>::idle(&config(0));
        pool.put_request(WorkRequest::new(|| Ok(1)).with_id("x"), Submit::Block)
            .unwrap();
        let err = pool
            .put_request(WorkRequest::new(|| Ok(2)).with_id("x"), Submit::Block)
            .unwrap_err();
        assert!(matches!(err, PoolError::DuplicateRequestId(ref id) if id == &RequestId::from("x")));
        assert_eq!(pool.pending_count(), 1);
        assert_eq!(pool.queued_count(), 1);
    }

    #[test]
    fn generated_id_is_returned() {
        let mut pool = ThreadPool::<u32, String>::idle(&config(0));
        let id = pool.put_request(WorkRequest::new(|| Ok(1)), Submit::Block).unwrap();
        assert!(matches!(id, RequestId::Generated(_)));
    }

    #[test]
    fn poll_with_nothing_pending() {
        let mut pool = ThreadPool::<u32, String>::new(&config(1)).unwrap();
        assert!(matches!(pool.poll(false), Err(PoolError::NoResultsPending)));
        assert!(matches!(pool.poll(true), Err(PoolError::NoResultsPending)));
    }

    #[test]
    fn blocking_poll_without_workers_fails_fast() {
        let mut pool = ThreadPool::<u32, String>::idle(&config(0));
        pool.put_request(WorkRequest::new(|| Ok(1)), Submit::Block).unwrap();
        assert!(matches!(pool.poll(true), Err(PoolError::NoWorkersAvailable)));
        assert!(matches!(pool.poll(false), Ok(None)));
    }

    #[test]
    fn dismiss_more_than_available_is_clamped() {
        let mut pool = ThreadPool::<u32, String>::new(&config(2)).unwrap();
        pool.dismiss_workers(5, false);
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.dismissed_count(), 2);
        pool.join_all_dismissed_workers();
        assert_eq!(pool.dismissed_count(), 0);
    }
}
