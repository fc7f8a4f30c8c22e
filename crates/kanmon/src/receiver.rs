use crate::executor::Executor;
use std::{fmt, sync::Arc};

/// What a concrete receiver supplies to the dispatcher.
///
/// `intent_action` gates the events the receiver reacts to, `executor` is where accepted work
/// runs and `on_start_task` is that work. The task always runs off the primary thread.
pub trait TaskReceiver: Send + Sync + 'static {
    /// The only action this receiver accepts. Must be non-empty and stable.
    fn intent_action(&self) -> &str;

    /// `None` drops accepted events without running anything.
    fn executor(&self) -> Option<&dyn Executor>;

    fn on_start_task(&self);

    /// Name used in diagnostics and spans. Defaults to the bare type name.
    fn name(&self) -> String {
        simple_type_name::<Self>().to_string()
    }
}

/// `my_app::setup::WarmupReceiver<T>` -> `WarmupReceiver`
pub(crate) fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

type TaskFn = dyn Fn() + Send + Sync + 'static;

/// A receiver assembled from values and closures instead of a dedicated type.
pub struct FnReceiver {
    name: String,
    intent_action: String,
    executor: Option<Arc<dyn Executor>>,
    task: Box<TaskFn>,
}

impl FnReceiver {
    pub fn builder(intent_action: impl Into<String>) -> ReceiverBuilder {
        ReceiverBuilder::new(intent_action)
    }
}

impl fmt::Debug for FnReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReceiver")
            .field("name", &self.name)
            .field("intent_action", &self.intent_action)
            .field("has_executor", &self.executor.is_some())
            .finish()
    }
}

impl TaskReceiver for FnReceiver {
    fn intent_action(&self) -> &str {
        &self.intent_action
    }

    fn executor(&self) -> Option<&dyn Executor> {
        self.executor.as_deref()
    }

    fn on_start_task(&self) {
        (self.task)()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

pub struct ReceiverBuilder {
    name: Option<String>,
    intent_action: String,
    executor: Option<Arc<dyn Executor>>,
    task: Option<Box<TaskFn>>,
}

impl ReceiverBuilder {
    pub fn new(intent_action: impl Into<String>) -> Self {
        Self {
            name: None,
            intent_action: intent_action.into(),
            executor: None,
            task: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn executor(mut self, executor: impl Executor) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn shared_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn task<F>(mut self, task: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.task = Some(Box::new(task));
        self
    }

    pub fn build(self) -> FnReceiver {
        FnReceiver {
            name: self.name.unwrap_or_else(|| simple_type_name::<FnReceiver>().to_string()),
            intent_action: self.intent_action,
            executor: self.executor,
            task: self.task.unwrap_or_else(|| Box::new(|| {})),
        }
    }
}
