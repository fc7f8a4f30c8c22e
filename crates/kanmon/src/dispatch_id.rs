use std::fmt;
use ulid::Ulid;

/// Identifies one submitted unit of work.
///
/// Minted when the dispatcher hands work to an executor, and carried by both the submit log
/// line and the span the work runs in, so the two can be joined in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DispatchId(Ulid);

impl DispatchId {
    pub const PREFIX: &'static str = "dsp";

    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn into_inner(&self) -> Ulid {
        self.0
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::PREFIX, self.0)
    }
}
