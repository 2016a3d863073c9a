//! Starting output devices, with a retry for transient refusals, and keeping
//! them stopped on every exit path.

use std::{thread, time::Duration};

use tracing::{info, warn};

use crate::error::PlaybackError;

/// How often, and how far apart, to try starting playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try and is at least 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A single attempt, no retry.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    /// One retry after 500 ms.
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

/// Where retry delays are spent.
pub trait Scheduler {
    fn sleep(&mut self, delay: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn sleep(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Something that can be started and stopped, like an output stream.
pub trait PlaybackDevice {
    fn start(&mut self) -> Result<(), PlaybackError>;

    /// Must be safe to call on a device that is not running.
    fn stop(&mut self);
}

/// Start `device` under `policy`. Retryable errors are logged and retried
/// after the policy delay; the last error is returned once attempts run out.
pub fn start_with_retry<D, S>(
    mut device: D,
    policy: RetryPolicy,
    scheduler: &mut S,
) -> Result<PlaybackGuard<D>, PlaybackError>
where
    D: PlaybackDevice,
    S: Scheduler + ?Sized,
{
    let mut attempt = 1;
    loop {
        match device.start() {
            Ok(()) => {
                info!(attempt, "playback started");
                return Ok(PlaybackGuard { device });
            }
            Err(err) if err.is_retryable() && attempt < policy.max_attempts() => {
                warn!(attempt, error = %err, delay_ms = policy.delay().as_millis() as u64, "playback start failed, retrying");
                scheduler.sleep(policy.delay());
                attempt += 1;
            }
            Err(err) => {
                warn!(attempt, error = %err, "playback start failed");
                device.stop();
                return Err(err);
            }
        }
    }
}

/// A running device. Dropping the guard stops it.
pub struct PlaybackGuard<D: PlaybackDevice> {
    device: D,
}

impl<D: PlaybackDevice> PlaybackGuard<D> {
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: PlaybackDevice> Drop for PlaybackGuard<D> {
    fn drop(&mut self) {
        self.device.stop();
    }
}
