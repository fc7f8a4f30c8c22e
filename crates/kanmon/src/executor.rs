use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;

/// A zero-argument unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere to run work asynchronously.
///
/// Submission is fire-and-forget: an executor takes ownership of the task and the caller
/// never hears about it again. Ordering, concurrency limits and backpressure are the
/// executor's business.
pub trait Executor: Send + Sync + 'static {
    fn execute(&self, task: Task);
}

impl<F> Executor for F
where
    F: Fn(Task) + Send + Sync + 'static,
{
    fn execute(&self, task: Task) {
        self(task)
    }
}

/// Runs tasks on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is currently inside of, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) {
        // detached; the join handle is not needed
        let _ = self.handle.spawn_blocking(task);
    }
}

/// Spawns one named OS thread per task.
#[derive(Debug)]
pub struct ThreadExecutor {
    name_prefix: String,
    spawned: AtomicUsize,
}

impl ThreadExecutor {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            spawned: AtomicUsize::new(0),
        }
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new("kanmon-worker")
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, task: Task) {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", self.name_prefix, n);
        if let Err(err) = std::thread::Builder::new().name(name.clone()).spawn(task) {
            tracing::error!(thread = %name, error = %err, "failed to spawn worker thread");
        }
    }
}

/// Runs the task right away on the calling thread.
///
/// Only sound when the caller is itself off the primary thread; from the primary thread the
/// task trips its own threading check.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task()
    }
}
