//! Post-phase cooldown
//!
//! Starting a train or eval phase before the fixed-step device has drained
//! its queues freezes the device. The manager waits a fixed interval after
//! each phase; the wait goes through [`Sleeper`] so tests never block.

use std::time::Duration;

/// Default wait after each phase in fixed-step mode
pub const QUEUE_DRAIN_COOLDOWN: Duration = Duration::from_secs(60);

/// Blocking delay collaborator
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
