use std::time::Duration;

/// Exponential backoff with a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    pub const DEFAULT_INITIAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX: Duration = Duration::from_millis(5000);

    pub const fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Delay to wait after failed attempt number `attempt` (zero-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL, Self::DEFAULT_MAX)
    }
}

/// Outcome of a retry loop that never succeeded.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub last_error: E,
    pub attempts: u32,
}

/// Run `op` up to `retries + 1` times, sleeping per `backoff` between failures.
///
/// `op` receives the zero-based attempt number. `sleep` is only called
/// between attempts, never after the last one.
pub fn retry_with_backoff<T, E>(
    backoff: &Backoff,
    retries: u32,
    sleep: impl FnMut(Duration),
    op: impl FnMut(u32) -> Result<T, E>,
) -> Result<T, Exhausted<E>> {
    retry_while(backoff, retries, sleep, |_| true, op)
}

/// Like [`retry_with_backoff`], but stops at the first error `retryable`
/// rejects and returns it without sleeping.
pub fn retry_while<T, E>(
    backoff: &Backoff,
    retries: u32,
    mut sleep: impl FnMut(Duration),
    retryable: impl Fn(&E) -> bool,
    mut op: impl FnMut(u32) -> Result<T, E>,
) -> Result<T, Exhausted<E>> {
    let mut attempt = 0u32;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= retries || !retryable(&err) => {
                return Err(Exhausted {
                    last_error: err,
                    attempts: attempt + 1,
                });
            }
            Err(_) => {
                sleep(backoff.delay_for_attempt(attempt));
                attempt += 1;
            }
        }
    }
}
