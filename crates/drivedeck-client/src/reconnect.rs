//! Reconnection policy for the live channel
//!
//! A bare [`LiveChannel`] makes one connection attempt and never retries;
//! whether and how to re-establish the channel is an owner decision. The
//! policy here provides exponential backoff and a supervision loop the
//! daemon layers on top.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::live::{ChannelState, LiveChannel};
use crate::registry::SubscriberRegistry;

/// Exponential backoff configuration for re-dialing the channel.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for the backoff.
    pub max_delay: Duration,
    /// Multiplier applied per consecutive failure.
    pub backoff_multiplier: f64,
    /// Maximum retry attempts (None = retry forever).
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay for the given attempt number (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let delay_millis = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(delay_millis).min(self.max_delay)
    }

    /// Whether another attempt is allowed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempt < max,
            None => true,
        }
    }
}

/// Keep a live channel established until `stop` flips to true.
///
/// Each successful connection runs until it closes, then the policy
/// decides whether and when to dial again. Consecutive failures back off
/// exponentially; a successful connection resets the attempt count.
pub async fn supervise(
    url: &str,
    registry: Arc<SubscriberRegistry>,
    policy: ReconnectPolicy,
    mut stop: watch::Receiver<bool>,
) {
    let mut attempt = 0u32;

    loop {
        if *stop.borrow() {
            return;
        }

        // Dropping the in-flight dial on stop releases the attempt
        let result = tokio::select! {
            result = LiveChannel::connect(url, registry.clone()) => result,
            _ = stop.changed() => {
                if *stop.borrow() {
                    return;
                }
                continue;
            }
        };

        match result {
            Ok(channel) => {
                attempt = 0;
                let mut state = channel.watch_state();

                loop {
                    tokio::select! {
                        _ = stop.changed() => {
                            if *stop.borrow() {
                                channel.close().await;
                                return;
                            }
                        }
                        changed = state.changed() => {
                            if changed.is_err()
                                || matches!(*state.borrow(), ChannelState::Closed(_))
                            {
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                warn!(url, error = %e, "Live channel connection failed");
            }
        }

        attempt += 1;
        if !policy.should_retry(attempt) {
            warn!(url, attempts = attempt, "Giving up on live channel");
            return;
        }

        let delay = policy.delay_for_attempt(attempt);
        info!(
            url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting live channel"
        );
        tokio::select! {
            _ = sleep(delay) => {}
            _ = stop.changed() => {
                if *stop.borrow() {
                    return;
                }
            }
        }
    }
}
