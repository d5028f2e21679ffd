use super::error::EngineError;
use super::inference::{InferenceClient, Iteration, Readiness};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Bounded, fixed-interval retry schedule for reaching the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Probes the service until it reports its iteration.
///
/// Makes at most `policy.max_attempts` probes and calls `sleep(policy.interval)` between
/// consecutive failed probes, never after the last one.
///
/// # Errors
///
/// Returns [`EngineError::ServiceUnavailable`] once every attempt has failed.
pub fn wait_for_service<C, S>(
    client: &C,
    policy: &RetryPolicy,
    mut sleep: S,
) -> Result<Iteration, EngineError>
where
    C: InferenceClient + ?Sized,
    S: FnMut(Duration),
{
    for attempt in 1..=policy.max_attempts {
        match client.probe_iteration() {
            Readiness::Ready(iteration) => {
                info!(
                    "Service ready at iteration {} after {} failed probe(s)",
                    iteration,
                    attempt - 1
                );
                return Ok(iteration);
            }
            Readiness::Unavailable(reason) => {
                warn!(
                    "Service not available (attempt {}/{}): {}",
                    attempt, policy.max_attempts, reason
                );
                if attempt < policy.max_attempts {
                    sleep(policy.interval);
                }
            }
        }
    }
    Err(EngineError::ServiceUnavailable {
        attempts: policy.max_attempts,
    })
}
