//! Test doubles and a Given-When-Then harness for receivers.
//!
//! Enabled for this crate's own tests and, for downstream crates, behind the `testing` feature.

use crate::{
    diagnostic::{Diagnostic, DiagnosticSink},
    dispatcher::{Dispatcher, Outcome},
    error::Rejection,
    event::InboundEvent,
    executor::{Executor, Task},
    receiver::TaskReceiver,
};
use std::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// Keeps every diagnostic it is given. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        if let Ok(mut records) = self.records.lock() {
            records.push(diagnostic.clone());
        }
    }
}

/// Holds submitted tasks until the test decides where to run them.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    pending: Arc<Mutex<Vec<Task>>>,
    submitted: Arc<AtomicUsize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total tasks ever submitted, run or not.
    pub fn submissions(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or_default()
    }

    fn take_pending(&self) -> Vec<Task> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    /// Runs pending tasks on the current thread and returns how many ran.
    pub fn run_all(&self) -> usize {
        let tasks = self.take_pending();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    /// Runs pending tasks on a fresh worker thread, waiting for them to finish.
    pub fn run_all_on_worker(&self) -> usize {
        let tasks = self.take_pending();
        let count = tasks.len();
        let worker = std::thread::spawn(move || {
            for task in tasks {
                task();
            }
        });
        if let Err(panic) = worker.join() {
            std::panic::resume_unwind(panic);
        }
        count
    }
}

impl fmt::Debug for RecordingExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingExecutor")
            .field("submitted", &self.submissions())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, task: Task) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(task);
        }
    }
}

/// Receiver whose task only counts how often it ran.
pub struct CountingReceiver {
    action: String,
    executor: Option<Arc<dyn Executor>>,
    runs: Arc<AtomicUsize>,
}

impl CountingReceiver {
    pub fn new(action: impl Into<String>, executor: impl Executor) -> Self {
        Self {
            action: action.into(),
            executor: Some(Arc::new(executor)),
            runs: Arc::default(),
        }
    }

    pub fn without_executor(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            executor: None,
            runs: Arc::default(),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl TaskReceiver for CountingReceiver {
    fn intent_action(&self) -> &str {
        &self.action
    }

    fn executor(&self) -> Option<&dyn Executor> {
        self.executor.as_deref()
    }

    fn on_start_task(&self) {
        self.runs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Given a receiver, when an event is delivered, then check what the dispatcher did.
///
/// ```ignore
/// use kanmon::{testing::{CountingReceiver, ReceiverTest, RecordingExecutor}, InboundEvent};
///
/// ReceiverTest::with(CountingReceiver::new("ACTION_X", RecordingExecutor::new()))
///     .when(&InboundEvent::new().with_action("ACTION_Y"))
///     .then_expect_rejected()
///     .then_expect_diagnostics(1);
/// ```
pub struct ReceiverTest<R: TaskReceiver> {
    dispatcher: Dispatcher<R>,
    sink: RecordingSink,
}

impl<R: TaskReceiver> ReceiverTest<R> {
    pub fn with(receiver: R) -> Self {
        let sink = RecordingSink::new();
        Self {
            dispatcher: Dispatcher::new(receiver).with_sink(sink.clone()),
            sink,
        }
    }

    /// Deliver an event.
    pub fn when(self, event: &InboundEvent) -> ThenPhase<R> {
        self.deliver(Some(event))
    }

    /// Deliver nothing, as a platform handing over a null event would.
    pub fn when_no_event(self) -> ThenPhase<R> {
        self.deliver(None)
    }

    fn deliver(self, event: Option<&InboundEvent>) -> ThenPhase<R> {
        let outcome = self.dispatcher.handle(event);
        ThenPhase {
            dispatcher: self.dispatcher,
            sink: self.sink,
            outcome,
        }
    }
}

pub struct ThenPhase<R: TaskReceiver> {
    dispatcher: Dispatcher<R>,
    sink: RecordingSink,
    outcome: Outcome,
}

impl<R: TaskReceiver> ThenPhase<R> {
    pub fn then_expect_submitted(self) -> Self {
        assert!(
            self.outcome.is_submitted(),
            "Expected a submission but got: {:?}",
            self.outcome
        );
        self
    }

    pub fn then_expect_rejected(self) -> Self {
        assert!(
            matches!(self.outcome, Outcome::Rejected(_)),
            "Expected a rejection but got: {:?}",
            self.outcome
        );
        self
    }

    pub fn then_expect_rejection(self, expected: Rejection) -> Self {
        assert_eq!(self.outcome, Outcome::Rejected(expected));
        self
    }

    pub fn then_expect_dropped(self) -> Self {
        assert_eq!(self.outcome, Outcome::Dropped);
        self
    }

    pub fn then_expect_diagnostics(self, expected: usize) -> Self {
        let records = self.sink.records();
        assert_eq!(
            records.len(),
            expected,
            "Expected {expected} diagnostics.\nActual: {records:?}"
        );
        self
    }

    /// Checks the single diagnostic emitted for the event.
    pub fn then_diagnostic<F>(self, assertion: F) -> Self
    where
        F: FnOnce(&Diagnostic),
    {
        let records = self.sink.records();
        match records.as_slice() {
            [diagnostic] => assertion(diagnostic),
            _ => panic!("Expected exactly one diagnostic but got: {records:?}"),
        }
        self
    }

    /// Access the receiver, e.g. to inspect side effects of its task.
    pub fn then_receiver<F>(self, assertion: F) -> Self
    where
        F: FnOnce(&R),
    {
        assertion(self.dispatcher.receiver());
        self
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}
