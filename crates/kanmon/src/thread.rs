//! Marks the latency-sensitive "primary" thread so background work can refuse to run on it.
//!
//! The mark is per thread and lives as long as the returned [`PrimaryGuard`]. Event-delivery
//! loops mark themselves once at start-up; tests mark the test thread.

use crate::error::ThreadingViolation;
use std::{cell::Cell, marker::PhantomData};

thread_local! {
    static PRIMARY: Cell<bool> = const { Cell::new(false) };
}

/// Clears the primary mark on drop. Not `Send`: it must be dropped on the thread it marked.
#[derive(Debug)]
#[must_use = "the thread stops being primary as soon as the guard is dropped"]
pub struct PrimaryGuard {
    was_primary: bool,
    _not_send: PhantomData<*const ()>,
}

impl Drop for PrimaryGuard {
    fn drop(&mut self) {
        PRIMARY.with(|primary| primary.set(self.was_primary));
    }
}

/// Marks the current thread as primary until the guard is dropped.
pub fn mark_primary() -> PrimaryGuard {
    let was_primary = PRIMARY.with(|primary| primary.replace(true));
    PrimaryGuard {
        was_primary,
        _not_send: PhantomData,
    }
}

pub fn is_primary() -> bool {
    PRIMARY.with(Cell::get)
}

/// Returns the violation instead of panicking, for callers that want to report it themselves.
pub fn check_not_on_primary(what: &str) -> Result<(), ThreadingViolation> {
    if is_primary() {
        return Err(ThreadingViolation { what: what.to_string() });
    }
    Ok(())
}

/// Panics when called on the primary thread.
///
/// Running background work there is a programming error, not a runtime condition.
#[track_caller]
pub fn ensure_not_on_primary(what: &str) {
    if let Err(violation) = check_not_on_primary(what) {
        panic!("{violation}");
    }
}
