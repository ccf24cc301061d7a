use oplink_core::{LinkError, Outcome};
use tracing::warn;

/// Failure-handling policy, injected by the caller.
///
/// Strict is fail-fast: the first failure aborts the pipeline stage it
/// occurred in. Lenient isolates each unit of fallible work, logging the
/// failure and substituting a neutral default (skip the link, keep the input
/// order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    Strict,
    Lenient,
}

impl FailureMode {
    pub fn is_lenient(self) -> bool {
        matches!(self, FailureMode::Lenient)
    }

    /// Apply the policy to one unit of work: strict propagates, lenient logs
    /// and yields `None`.
    pub fn absorb<T>(self, outcome: Outcome<T>, what: &str) -> Result<Option<T>, LinkError> {
        match outcome.into_result() {
            Ok(value) => Ok(Some(value)),
            Err(error) => match self {
                FailureMode::Strict => Err(error),
                FailureMode::Lenient => {
                    warn!(context = what, error = %error, "dropping failed link work unit");
                    Ok(None)
                }
            },
        }
    }
}
