use crate::{
    diagnostic::{ActionField, Diagnostic, DiagnosticSink, TracingSink},
    dispatch_id::DispatchId,
    error::Rejection,
    event::InboundEvent,
    receiver::TaskReceiver,
    thread,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// What `Dispatcher::handle` did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Exactly one unit of work went to the receiver's executor.
    Submitted(DispatchId),
    /// The event failed the gate and one diagnostic was emitted.
    Rejected(Rejection),
    /// The event passed the gate but the receiver had no executor. Nothing was logged.
    Dropped,
}

impl Outcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    pub fn dispatch_id(&self) -> Option<DispatchId> {
        match self {
            Self::Submitted(id) => Some(*id),
            _ => None,
        }
    }
}

/// Gates inbound events on a receiver's action and submits its task for the ones that match.
///
/// Stateless between calls: every `handle` stands alone, and concurrent matching events each
/// get their own submission with no ordering between them.
pub struct Dispatcher<R: ?Sized> {
    receiver: Arc<R>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<R: TaskReceiver> Dispatcher<R> {
    pub fn new(receiver: R) -> Self {
        Self::from_arc(Arc::new(receiver))
    }
}

impl<R: TaskReceiver + ?Sized> Dispatcher<R> {
    pub fn from_arc(receiver: Arc<R>) -> Self {
        Self {
            receiver,
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn with_sink(self, sink: impl DiagnosticSink) -> Self {
        self.with_shared_sink(Arc::new(sink))
    }

    #[must_use]
    pub fn with_shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn receiver(&self) -> &Arc<R> {
        &self.receiver
    }

    /// Handles one delivery. Total over its input, `None` included.
    ///
    /// Emits at most one diagnostic and submits at most one task, never both.
    pub fn handle(&self, event: Option<&InboundEvent>) -> Outcome {
        if let Err(rejection) = gate(self.receiver.intent_action(), event) {
            self.sink.emit(&self.diagnostic(event));
            return Outcome::Rejected(rejection);
        }

        let name = self.receiver.name();
        let Some(executor) = self.receiver.executor() else {
            trace!(target: "kanmon", receiver = %name, "no executor, dropping event");
            return Outcome::Dropped;
        };

        let id = DispatchId::new();
        let span = tracing::info_span!(target: "kanmon", "dispatch", id = %id, receiver = %name);
        let receiver = Arc::clone(&self.receiver);

        debug!(target: "kanmon", id = %id, receiver = %name, "submitting task");
        executor.execute(Box::new(move || {
            let _entered = span.enter();
            thread::ensure_not_on_primary(&format!("{name}::on_start_task"));
            receiver.on_start_task();
        }));

        Outcome::Submitted(id)
    }

    fn diagnostic(&self, event: Option<&InboundEvent>) -> Diagnostic {
        let action = match event {
            None => ActionField::NoEvent,
            Some(event) => match event.action() {
                Some(action) => ActionField::Value(action.to_string()),
                None => ActionField::Unset,
            },
        };
        Diagnostic {
            receiver: self.receiver.name(),
            caller: event.and_then(InboundEvent::caller),
            action,
        }
    }
}

impl<R: ?Sized> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Exact, case-sensitive match on the action.
fn gate(expected: &str, event: Option<&InboundEvent>) -> Result<(), Rejection> {
    match event {
        None => Err(Rejection::NoEvent),
        Some(event) if event.action() == Some(expected) => Ok(()),
        Some(event) => Err(Rejection::ActionMismatch {
            expected: expected.to_string(),
            actual: event.action.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        caller::CallerId,
        executor::{InlineExecutor, Task, TokioExecutor},
        receiver::ReceiverBuilder,
        testing::{CountingReceiver, RecordingExecutor, RecordingSink},
    };
    use std::time::Duration;

    const ACTION_X: &str = "ACTION_X";

    fn recording_dispatcher() -> (Dispatcher<CountingReceiver>, RecordingExecutor, RecordingSink) {
        let executor = RecordingExecutor::new();
        let sink = RecordingSink::new();
        let dispatcher = Dispatcher::new(CountingReceiver::new(ACTION_X, executor.clone())).with_sink(sink.clone());
        (dispatcher, executor, sink)
    }

    #[test]
    fn test_mismatch_logs_once_and_submits_nothing() {
        let (dispatcher, executor, sink) = recording_dispatcher();
        let event = InboundEvent::new().with_action("ACTION_Y").with_caller(10_057);

        let outcome = dispatcher.handle(Some(&event));

        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::ActionMismatch {
                expected: ACTION_X.to_string(),
                actual: Some("ACTION_Y".to_string()),
            })
        );
        assert_eq!(executor.submissions(), 0);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            Diagnostic {
                receiver: "CountingReceiver".to_string(),
                caller: Some(CallerId::new(10_057)),
                action: ActionField::Value("ACTION_Y".to_string()),
            }
        );
    }

    #[test]
    fn test_absent_event_logs_null_sentinel() {
        let (dispatcher, executor, sink) = recording_dispatcher();

        let outcome = dispatcher.handle(None);

        assert_eq!(outcome, Outcome::Rejected(Rejection::NoEvent));
        assert_eq!(executor.submissions(), 0);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].to_string(),
            "[CountingReceiver] Unauthorized binder uid=unknown, intentAction=(null)"
        );
    }

    #[test]
    fn test_event_without_action_is_rejected() {
        let (dispatcher, executor, sink) = recording_dispatcher();
        let event = InboundEvent::new().with_caller(1000);

        let outcome = dispatcher.handle(Some(&event));

        assert!(matches!(outcome, Outcome::Rejected(Rejection::ActionMismatch { actual: None, .. })));
        assert_eq!(executor.submissions(), 0);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ActionField::Unset);
        assert_eq!(
            records[0].to_string(),
            "[CountingReceiver] Unauthorized binder uid=1000, intentAction=null"
        );
    }

    #[test]
    fn test_match_submits_once_without_diagnostics() {
        let (dispatcher, executor, sink) = recording_dispatcher();
        let event = InboundEvent::new().with_action(ACTION_X).with_caller(1000);

        let outcome = dispatcher.handle(Some(&event));

        assert!(outcome.is_submitted());
        assert!(outcome.dispatch_id().is_some());
        assert_eq!(executor.submissions(), 1);
        assert!(sink.records().is_empty());
        assert_eq!(dispatcher.receiver().runs(), 0);

        assert_eq!(executor.run_all_on_worker(), 1);
        assert_eq!(dispatcher.receiver().runs(), 1);
    }

    #[test]
    fn test_match_without_executor_drops_silently() {
        let sink = RecordingSink::new();
        let dispatcher = Dispatcher::new(CountingReceiver::without_executor(ACTION_X)).with_sink(sink.clone());
        let event = InboundEvent::new().with_action(ACTION_X);

        let outcome = dispatcher.handle(Some(&event));

        assert_eq!(outcome, Outcome::Dropped);
        assert!(sink.records().is_empty());
        assert_eq!(dispatcher.receiver().runs(), 0);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let executor = RecordingExecutor::new();
        let sink = RecordingSink::new();
        let dispatcher =
            Dispatcher::new(CountingReceiver::new("com.example.ACTION", executor.clone())).with_sink(sink.clone());
        let event = InboundEvent::new().with_action("com.example.action");

        let outcome = dispatcher.handle(Some(&event));

        assert!(matches!(outcome, Outcome::Rejected(_)));
        assert_eq!(executor.submissions(), 0);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_no_prefix_or_whitespace_matching() {
        let (dispatcher, executor, sink) = recording_dispatcher();

        for action in ["ACTION_", "ACTION_XY", " ACTION_X", "ACTION_X ", ""] {
            let event = InboundEvent::new().with_action(action);
            assert!(matches!(dispatcher.handle(Some(&event)), Outcome::Rejected(_)), "{action:?}");
        }

        assert_eq!(executor.submissions(), 0);
        assert_eq!(sink.records().len(), 5);
    }

    #[test]
    fn test_concurrent_matching_events_are_not_coalesced() {
        const N: usize = 32;
        let (dispatcher, executor, sink) = recording_dispatcher();

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                std::thread::spawn(move || {
                    let event = InboundEvent::new().with_action(ACTION_X).with_caller(i as u32);
                    dispatcher.handle(Some(&event))
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.extend(handle.join().unwrap().dispatch_id());
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), N);
        assert_eq!(executor.submissions(), N);
        assert!(sink.records().is_empty());
        assert_eq!(executor.run_all_on_worker(), N);
        assert_eq!(dispatcher.receiver().runs(), N);
    }

    #[test]
    fn test_task_runs_off_primary_thread() {
        let (dispatcher, executor, _sink) = recording_dispatcher();
        let _guard = thread::mark_primary();

        let outcome = dispatcher.handle(Some(&InboundEvent::new().with_action(ACTION_X)));

        assert!(outcome.is_submitted());
        executor.run_all_on_worker();
        assert_eq!(dispatcher.receiver().runs(), 1);
    }

    #[test]
    #[should_panic(expected = "CountingReceiver::on_start_task must not be called on the primary thread")]
    fn test_inline_executor_on_primary_thread_fails_fast() {
        let dispatcher = Dispatcher::new(CountingReceiver::new(ACTION_X, InlineExecutor)).with_sink(RecordingSink::new());
        let _guard = thread::mark_primary();

        let _ = dispatcher.handle(Some(&InboundEvent::new().with_action(ACTION_X)));
    }

    #[test]
    fn test_violation_stops_before_task_body() {
        let executor = RecordingExecutor::new();
        let dispatcher = Dispatcher::new(CountingReceiver::new(ACTION_X, executor.clone()));
        let _ = dispatcher.handle(Some(&InboundEvent::new().with_action(ACTION_X)));

        let _guard = thread::mark_primary();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| executor.run_all()));

        assert!(result.is_err());
        assert_eq!(dispatcher.receiver().runs(), 0);
    }

    #[test]
    fn test_default_sink_is_tracing() {
        let dispatcher = Dispatcher::new(CountingReceiver::without_executor(ACTION_X));
        assert_eq!(dispatcher.handle(None), Outcome::Rejected(Rejection::NoEvent));
    }

    #[test]
    fn test_dyn_receiver() {
        let receiver: Arc<dyn TaskReceiver> = Arc::new(
            ReceiverBuilder::new(ACTION_X)
                .name("Warmup")
                .executor(|task: Task| task())
                .build(),
        );
        let sink = RecordingSink::new();
        let dispatcher = Dispatcher::from_arc(receiver).with_sink(sink.clone());

        assert!(dispatcher.handle(Some(&InboundEvent::new().with_action(ACTION_X))).is_submitted());
        let _ = dispatcher.handle(Some(&InboundEvent::new().with_action("OTHER")));
        assert_eq!(sink.records()[0].receiver, "Warmup");
    }

    #[tokio::test]
    async fn test_tokio_executor_end_to_end() {
        let _guard = thread::mark_primary();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = std::sync::Mutex::new(Some(tx));
        let receiver = ReceiverBuilder::new(ACTION_X)
            .executor(TokioExecutor::current().unwrap())
            .task(move || {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(thread::is_primary());
                }
            })
            .build();
        let dispatcher = Dispatcher::new(receiver);

        let outcome = dispatcher.handle(Some(&InboundEvent::new().with_action(ACTION_X)));

        assert!(outcome.is_submitted());
        let primary = tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();
        assert!(!primary);
    }
}
