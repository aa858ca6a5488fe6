//! Budget for deferred work.

use std::time::Duration;

/// What an event does with deferred work that runs past its budget.
///
/// Applies per task: each cache write or revalidation gets the full budget
/// from the moment it is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Work keeps the event alive for as long as it runs.
    #[default]
    Unbounded,
    /// Work still running after the budget is dropped.
    Cancel(Duration),
    /// Work still running after the budget is reported and left alone.
    Warn(Duration),
}

impl TimeoutPolicy {
    /// The budget, if there is one.
    pub fn budget(&self) -> Option<Duration> {
        match *self {
            TimeoutPolicy::Unbounded => None,
            TimeoutPolicy::Cancel(budget) | TimeoutPolicy::Warn(budget) => Some(budget),
        }
    }

    /// Whether work past the budget is cancelled.
    pub fn cancels(&self) -> bool {
        matches!(self, TimeoutPolicy::Cancel(_))
    }
}
