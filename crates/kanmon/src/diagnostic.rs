use crate::caller::CallerId;
use serde::Serialize;
use std::fmt;

/// What the diagnostic says about the event's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActionField {
    /// No event was delivered at all.
    NoEvent,
    /// An event arrived without an action; rendered as a bare `null`.
    Unset,
    Value(String),
}

impl fmt::Display for ActionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEvent => f.write_str("(null)"),
            Self::Unset => f.write_str("null"),
            Self::Value(action) => f.write_str(action),
        }
    }
}

/// Record of an event a receiver refused.
///
/// The caller is kept for audit only; nothing here checks it against an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub receiver: String,
    pub caller: Option<CallerId>,
    pub action: ActionField,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Unauthorized binder uid=", self.receiver)?;
        match self.caller {
            Some(caller) => write!(f, "{caller}")?,
            None => f.write_str("unknown")?,
        }
        write!(f, ", intentAction={}", self.action)
    }
}

/// Where refused events are reported. Emission is fire-and-forget.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Reports each diagnostic as a `warn` event on the `kanmon` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        let uid = diagnostic.caller.map(|caller| caller.uid());
        tracing::warn!(
            target: "kanmon",
            receiver = %diagnostic.receiver,
            uid = ?uid,
            intent_action = %diagnostic.action,
            "{}",
            diagnostic
        );
    }
}
