use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::request::{Job, RequestId, WorkFailure};

/// A request on its way to a worker.
pub(crate) struct Envelope<T, E> {
    pub(crate) id: RequestId,
    pub(crate) job: Job<T, E>,
}

/// A request's outcome on its way back to the polling thread.
pub(crate) struct Completion<T, E> {
    pub(crate) id: RequestId,
    pub(crate) outcome: Result<T, WorkFailure<E>>,
}

/// Queue endpoints a worker is bound to.
pub(crate) struct WorkerChannels<T, E> {
    pub(crate) requests: Receiver<Envelope<T, E>>,
    pub(crate) requeue: Sender<Envelope<T, E>>,
    pub(crate) results: Sender<Completion<T, E>>,
}

/// Handle to a background worker thread, owned by the pool's control thread.
pub(crate) struct Worker {
    name: String,
    dismissed: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn<T, E>(
        name: String,
        channels: WorkerChannels<T, E>,
        poll_timeout: Duration,
    ) -> std::io::Result<Self>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let dismissed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dismissed);
        let thread_name = name.clone();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(&thread_name, channels, &flag, poll_timeout))?;
        Ok(Self {
            name,
            dismissed,
            handle,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Ask the worker to exit once its current job, if any, is done.
    pub(crate) fn dismiss(&self) {
        self.dismissed.store(true, Ordering::Release);
    }

    pub(crate) fn join(self) {
        if self.handle.join().is_err() {
            warn!(worker = %self.name, "worker thread terminated by panic");
        }
    }
}

fn worker_loop<T, E>(
    name: &str,
    channels: WorkerChannels<T, E>,
    dismissed: &AtomicBool,
    poll_timeout: Duration,
) {
    debug!(worker = %name, "worker started");
    loop {
        if dismissed.load(Ordering::Acquire) {
            break;
        }
        let envelope = match channels.requests.recv_timeout(poll_timeout) {
            Ok(envelope) => envelope,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // Dismissed while waiting: hand the request to a surviving worker.
        if dismissed.load(Ordering::Acquire) {
            debug!(worker = %name, request_id = %envelope.id, "requeueing request after dismissal");
            if let Err(returned) = channels.requeue.send(envelope) {
                warn!(worker = %name, request_id = %returned.0.id, "request queue closed, request dropped");
            }
            break;
        }

        let Envelope { id, job } = envelope;
        let outcome = match catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(WorkFailure::Failed(e)),
            Err(payload) => Err(WorkFailure::Panicked(panic_message(payload.as_ref()))),
        };

        if channels.results.send(Completion { id, outcome }).is_err() {
            // The pool is gone; nobody is left to collect results.
            break;
        }
    }
    debug!(worker = %name, "worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::unbounded;

    use super::*;

    fn channels<T, E>() -> (
        Sender<Envelope<T, E>>,
        Receiver<Envelope<T, E>>,
        Receiver<Completion<T, E>>,
        WorkerChannels<T, E>,
    ) {
        let (req_tx, req_rx) = unbounded();
        let (res_tx, res_rx) = unbounded();
        let worker_channels = WorkerChannels {
            requests: req_rx.clone(),
            requeue: req_tx.clone(),
            results: res_tx,
        };
        (req_tx, req_rx, res_rx, worker_channels)
    }

    #[test]
    fn relays_success_and_failure_as_data() {
        let (req_tx, _req_rx, res_rx, ch) = channels::<u32, String>();
        let worker = Worker::spawn("w-ok".into(), ch, Duration::from_millis(20)).unwrap();

        req_tx
            .send(Envelope { id: "a".into(), job: Box::new(|| Ok(7)) })
            .unwrap();
        req_tx
            .send(Envelope { id: "b".into(), job: Box::new(|| Err("bad".to_string())) })
            .unwrap();

        let first = res_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.id, RequestId::from("a"));
        assert!(matches!(first.outcome, Ok(7)));

        let second = res_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(second.id, RequestId::from("b"));
        assert!(matches!(second.outcome, Err(WorkFailure::Failed(ref e)) if e == "bad"));

        worker.dismiss();
        worker.join();
    }

    #[test]
    fn survives_panicking_job() {
        let (req_tx, _req_rx, res_rx, ch) = channels::<u32, String>();
        let worker = Worker::spawn("w-panic".into(), ch, Duration::from_millis(20)).unwrap();

        req_tx
            .send(Envelope { id: "p".into(), job: Box::new(|| -> Result<u32, String> { panic!("exploded") }) })
            .unwrap();
        req_tx
            .send(Envelope { id: "q".into(), job: Box::new(|| Ok(1)) })
            .unwrap();

        let panicked = res_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(panicked.outcome, Err(WorkFailure::Panicked(ref m)) if m == "exploded"));
        let next = res_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(next.outcome, Ok(1)));

        worker.dismiss();
        worker.join();
    }

    #[test]
    fn dismissed_worker_requeues_instead_of_running() {
        let (req_tx, req_rx, res_rx, ch) = channels::<u32, String>();
        let worker = Worker::spawn("w-dismiss".into(), ch, Duration::from_millis(200)).unwrap();

        // Dismiss while the worker is blocked waiting for a request.
        std::thread::sleep(Duration::from_millis(20));
        worker.dismiss();
        req_tx
            .send(Envelope { id: "kept".into(), job: Box::new(|| Ok(5)) })
            .unwrap();
        worker.join();

        assert!(res_rx.try_recv().is_err(), "dismissed worker must not run the job");
        let requeued = req_rx.try_recv().expect("request should be back on the queue");
        assert_eq!(requeued.id, RequestId::from("kept"));
    }

    #[test]
    fn idle_worker_notices_dismissal_on_timeout() {
        let (_req_tx, _req_rx, _res_rx, ch) = channels::<u32, String>();
        let worker = Worker::spawn("w-idle".into(), ch, Duration::from_millis(10)).unwrap();
        assert_eq!(worker.name(), "w-idle");
        worker.dismiss();
        worker.join();
    }
}
