//! Kanmon gates inbound broadcast events on an expected action and hands the accepted
//! work to an executor.
//!
//! A [`TaskReceiver`] names the action it answers to, the [`Executor`] its work runs on and
//! the work itself. A [`Dispatcher`] checks every inbound event against that action: a match
//! submits exactly one unit of work, anything else is reported to a [`DiagnosticSink`].
//!
//! ```
//! use kanmon::{Dispatcher, InboundEvent, InlineExecutor, Outcome, ReceiverBuilder};
//!
//! let receiver = ReceiverBuilder::new("com.example.SETUP_STARTED")
//!     .executor(InlineExecutor)
//!     .task(|| tracing::info!("warming caches"))
//!     .build();
//! let dispatcher = Dispatcher::new(receiver);
//!
//! let event = InboundEvent::new().with_action("com.example.SETUP_STARTED");
//! assert!(matches!(dispatcher.handle(Some(&event)), Outcome::Submitted(_)));
//! ```

pub mod caller;
pub mod config;
pub mod diagnostic;
pub mod dispatch_id;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod executor;
pub mod logging;
pub mod receiver;
pub mod thread;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use caller::CallerId;
pub use config::{ExecutorKind, ReceiverConfig, ReceiverConfigBuilder};
pub use diagnostic::{ActionField, Diagnostic, DiagnosticSink, TracingSink};
pub use dispatch_id::DispatchId;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::{ConfigError, Rejection, ThreadingViolation};
pub use event::InboundEvent;
pub use executor::{Executor, InlineExecutor, Task, ThreadExecutor, TokioExecutor};
pub use receiver::{FnReceiver, ReceiverBuilder, TaskReceiver};
