/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Periodic timer driver.
//!
//! Sessions are passive between calls; this task calls
//! [`SessionRegistry::tick_all`] on a fixed period so that heartbeats,
//! TestRequests and logon/logout timeouts fire.

use crate::registry::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Default period between timer checks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running timer task.
#[derive(Debug)]
pub struct TimerDriver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TimerDriver {
    /// Spawns the timer task on the current tokio runtime.
    ///
    /// # Arguments
    /// * `registry` - Sessions to drive
    /// * `period` - Time between checks
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime, or if `period` is zero.
    #[must_use]
    pub fn spawn(registry: Arc<SessionRegistry>, period: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(?period, "timer driver started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let failures = registry.tick_all();
                        if failures > 0 {
                            debug!(failures, "timer pass finished with failures");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("timer driver stopped");
        });
        Self { shutdown, task }
    }

    /// Returns true while the task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the task and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
