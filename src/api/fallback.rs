//! Try an ordered list of candidates until one succeeds.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Every candidate failed; errors are in attempt order.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub errors: Vec<E>,
}

impl<E: Display> Display for Exhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.errors.last() {
            Some(last) => write!(f, "all {} attempts failed, last: {}", self.errors.len(), last),
            None => write!(f, "no candidates to try"),
        }
    }
}

/// Run `attempt` on each candidate in order and return the first success,
/// sleeping `pause` between attempts (never after the last one).
pub async fn first_success<C, T, E, F, Fut>(
    candidates: Vec<C>,
    pause: Duration,
    mut attempt: F,
) -> Result<T, Exhausted<E>>
where
    C: Display,
    E: Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total = candidates.len();
    let mut errors = Vec::with_capacity(total);

    for (i, candidate) in candidates.into_iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        log::debug!("Attempt {}/{}: {}", i + 1, total, candidate);
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::warn!("Attempt {}/{} failed: {}", i + 1, total, e);
                errors.push(e);
            }
        }
    }

    Err(Exhausted { errors })
}

/// [`first_success`], with `fallback` producing the value when nothing worked.
pub async fn first_success_or<C, T, E, F, Fut, D>(
    candidates: Vec<C>,
    pause: Duration,
    attempt: F,
    fallback: D,
) -> T
where
    C: Display,
    E: Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    D: FnOnce(Exhausted<E>) -> T,
{
    match first_success(candidates, pause, attempt).await {
        Ok(value) => value,
        Err(exhausted) => fallback(exhausted),
    }
}
