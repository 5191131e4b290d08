//! Delayed task execution
//!
//! The upload runs a short while after the download finishes, on whatever
//! executor the host provides. [`ThreadScheduler`] is the standalone default.

use std::thread;
use std::time::Duration;

use tracing::error;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay, off the caller's thread
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Runs each task on its own named thread
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    name: String,
}

impl ThreadScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new("docsync-task")
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                thread::sleep(delay);
                task();
            });

        if let Err(err) = spawned {
            error!(error = %err, "Failed to spawn scheduled task");
        }
    }
}
