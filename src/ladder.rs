//! Ordered fallback strategies.
//!
//! Recovery in the git layer is written as a list of steps tried in order,
//! instead of nested conditionals. Each operation declares its steps as an
//! enum and a predicate deciding whether a failure lets the climb move on to
//! the next step.

use log::warn;

use crate::error::{Error, Result};

/// Try `steps` in order until one succeeds.
///
/// After a step fails, `continue_on(step, err)` decides whether to go on to
/// the next step. When it says no, or when the steps run out, the last error
/// is returned.
pub fn climb<S, T, A, C>(steps: &[S], mut attempt: A, continue_on: C) -> Result<T>
where
    S: std::fmt::Debug,
    A: FnMut(&S) -> Result<T>,
    C: Fn(&S, &Error) -> bool,
{
    for (i, step) in steps.iter().enumerate() {
        match attempt(step) {
            Ok(value) => return Ok(value),
            Err(e) => {
                let has_next = i + 1 < steps.len();
                if !has_next || !continue_on(step, &e) {
                    return Err(e);
                }
                warn!("{:?} failed, trying {:?}: {}", step, steps[i + 1], e);
            }
        }
    }
    Err(Error::InvalidCommand {
        message: "no strategy to try".to_string(),
    })
}
