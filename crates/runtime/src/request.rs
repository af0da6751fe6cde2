use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Identifier of a submitted [`WorkRequest`].
///
/// Either supplied by the caller (and then required to be unique among
/// outstanding requests) or generated by the pool at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    Generated(Uuid),
    Assigned(String),
}

impl RequestId {
    pub fn generate() -> Self {
        RequestId::Generated(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Generated(uuid) => write!(f, "{uuid}"),
            RequestId::Assigned(name) => f.write_str(name),
        }
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::Assigned(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::Assigned(s)
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Assigned(n.to_string())
    }
}

/// Why a request produced no value.
#[derive(Debug)]
pub enum WorkFailure<E> {
    /// The callable returned an error.
    Failed(E),
    /// The callable panicked. The worker caught the panic and kept running.
    Panicked(String),
}

impl<E: fmt::Display> fmt::Display for WorkFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkFailure::Failed(e) => write!(f, "{e}"),
            WorkFailure::Panicked(msg) => write!(f, "worker job panicked: {msg}"),
        }
    }
}

pub(crate) type Job<T, E> = Box<dyn FnOnce() -> Result<T, E> + Send + 'static>;
pub(crate) type SuccessCallback<T> = Box<dyn FnOnce(&RequestId, T)>;
pub(crate) type FailureCallback<E> = Box<dyn FnOnce(&RequestId, WorkFailure<E>)>;

/// A callable unit of work plus the callbacks that receive its outcome.
///
/// Arguments are captured by the closure. Callbacks run on the thread that
/// polls the pool, never on a worker. Submitting a request consumes it, so a
/// request whose job already ran (successfully or not) cannot be resubmitted.
pub struct WorkRequest<T, E> {
    id: Option<RequestId>,
    job: Job<T, E>,
    on_success: Option<SuccessCallback<T>>,
    on_failure: Option<FailureCallback<E>>,
}

impl<T, E> WorkRequest<T, E> {
    pub fn new(job: impl FnOnce() -> Result<T, E> + Send + 'static) -> Self {
        Self {
            id: None,
            job: Box::new(job),
            on_success: None,
            on_failure: None,
        }
    }

    /// Use a caller-supplied identifier instead of a generated one.
    pub fn with_id(mut self, id: impl Into<RequestId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&RequestId, T) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Without a failure callback the failure is logged.
    pub fn on_failure(
        mut self,
        callback: impl FnOnce(&RequestId, WorkFailure<E>) + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// Split into the part that travels to a worker and the part that stays
    /// with the pool until the outcome is polled.
    pub(crate) fn into_parts(self) -> (Option<RequestId>, Job<T, E>, PendingRequest<T, E>) {
        (
            self.id,
            self.job,
            PendingRequest {
                on_success: self.on_success,
                on_failure: self.on_failure,
            },
        )
    }
}

impl<T, E> fmt::Debug for WorkRequest<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkRequest")
            .field("id", &self.id)
            .field("has_success_callback", &self.on_success.is_some())
            .field("has_failure_callback", &self.on_failure.is_some())
            .finish()
    }
}

/// The control-thread half of a submitted request.
pub(crate) struct PendingRequest<T, E> {
    pub(crate) on_success: Option<SuccessCallback<T>>,
    pub(crate) on_failure: Option<FailureCallback<E>>,
}

/// Build one request per argument, all running the same callable.
pub fn make_requests<A, T, E, F>(func: F, args: impl IntoIterator<Item = A>) -> Vec<WorkRequest<T, E>>
where
    A: Send + 'static,
    F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
{
    let func = Arc::new(func);
    args.into_iter()
        .map(|arg| {
            let func = Arc::clone(&func);
            WorkRequest::new(move || func(arg))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn assigned_ids_display_verbatim() {
        assert_eq!(RequestId::from("solve-3").to_string(), "solve-3");
        assert_eq!(RequestId::from(42u64), RequestId::Assigned("42".into()));
    }

    #[test]
    fn builder_sets_id_and_callbacks() {
        let request = WorkRequest::<u32, String>::new(|| Ok(1))
            .with_id("r1")
            .on_success(|_, _| {})
            .on_failure(|_, _| {});
        assert_eq!(request.id(), Some(&RequestId::from("r1")));
        let debug = format!("{request:?}");
        assert!(debug.contains("has_success_callback: true"));
    }

    #[test]
    fn make_requests_binds_each_argument() {
        let requests = make_requests(|n: u32| Ok::<_, String>(n * 2), vec![1, 2, 3]);
        let values: Vec<u32> = requests
            .into_iter()
            .map(|r| {
                let (_, job, _) = r.into_parts();
                job().unwrap()
            })
            .collect();
        assert_eq!(values, vec![2, 4, 6]);
    }

    #[test]
    fn failure_display() {
        let failed: WorkFailure<String> = WorkFailure::Failed("infeasible".into());
        assert_eq!(failed.to_string(), "infeasible");
        let panicked: WorkFailure<String> = WorkFailure::Panicked("boom".into());
        assert_eq!(panicked.to_string(), "worker job panicked: boom");
    }
}
