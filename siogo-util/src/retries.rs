use std::time::Duration;

use retry::{delay, retry, OperationResult};
use tracing::debug;

use crate::error::{ErrorExt as _, ErrorKind, ScrapeError};
use crate::{Error, Result};

/// Runs `operation` until it succeeds, sleeping a fixed `delay` between attempts.
///
/// Only errors whose kind is listed in `handled` are retried. Any other error
/// is returned as is from the attempt that raised it. When all of
/// `max_attempts` attempts fail with a handled error, the last one is wrapped
/// in `ScrapeError::TooManyRetries`. `max_attempts` of zero runs once.
pub fn with_retries<T>(
    mut operation: impl FnMut() -> Result<T>,
    handled: &[ErrorKind],
    max_attempts: usize,
    delay: Duration,
) -> Result<T> {
    let durations = delay::Fixed::from_millis(delay.as_millis() as u64)
        .take(max_attempts.saturating_sub(1));
    let mut attempts = 0;
    let result = retry(durations, || {
        attempts += 1;
        match operation() {
            Ok(value) => OperationResult::Ok(value),
            Err(err) if err.is_any_kind(handled) => {
                debug!(attempt = attempts, error = %err, "retrying");
                OperationResult::Retry(err)
            }
            Err(err) => OperationResult::Err(err),
        }
    });
    result.map_err(|err| match err {
        retry::Error::Operation { error, .. } if error.is_any_kind(handled) => {
            ScrapeError::TooManyRetries {
                attempts,
                last: error.into(),
            }
            .into()
        }
        retry::Error::Operation { error, .. } => error,
        retry::Error::Internal(msg) => Error::msg(msg),
    })
}
