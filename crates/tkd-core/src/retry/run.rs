use std::time::Duration;

use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f(attempt)` until it succeeds or the policy says to stop.
///
/// Before each further attempt `on_retry(failed_attempt, &err, delay)` is
/// called; it is responsible for reporting and for waiting out `delay`.
/// The error of the last attempt is returned.
pub fn run_with_retry<T, E, F, R>(policy: &RetryPolicy, mut f: F, mut on_retry: R) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    R: FnMut(u32, &E, Duration),
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    on_retry(attempt, &e, d);
                    attempt += 1;
                }
            },
        }
    }
}
