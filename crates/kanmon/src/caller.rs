use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Numeric identity of whoever sent an inbound event, the binder uid on platforms that have one.
///
/// The dispatcher only records it; deciding who may send events is left to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(u32);

impl CallerId {
    pub const fn new(uid: u32) -> Self {
        Self(uid)
    }

    pub const fn uid(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CallerId {
    fn from(uid: u32) -> Self {
        Self(uid)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CallerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}
