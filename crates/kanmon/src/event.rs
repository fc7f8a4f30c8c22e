use crate::caller::CallerId;
use serde::{Deserialize, Serialize};

/// A broadcast delivered to a receiver.
///
/// Built by whatever routes broadcasts immediately before delivery and only read by the
/// dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub action: Option<String>,
    pub caller: Option<CallerId>,
}

impl InboundEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn caller(&self) -> Option<CallerId> {
        self.caller
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<CallerId>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}
