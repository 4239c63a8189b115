//! Deferred background work
//!
//! The process-wide counterpart of an edge runtime's `waitUntil`: work is
//! spawned detached so the response that scheduled it is not delayed, and the
//! set is drained once at shutdown so in-flight work gets a chance to finish.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::logger;

#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `work` to run after (and independently of) the current response.
    pub fn wait_until<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(mut tasks) = self.tasks.lock() else {
            logger::log_error("Background task set poisoned, running work detached");
            tokio::spawn(work);
            return;
        };
        // Reap finished tasks so the set only tracks pending work
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }
        tasks.spawn(work);
    }

    /// Number of tasks not yet reaped
    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }

    /// Wait for all scheduled work, aborting whatever is left after `grace`.
    ///
    /// Returns the number of tasks that were aborted.
    pub async fn drain(&self, grace: Duration) -> usize {
        let mut tasks = match self.tasks.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return 0,
        };

        let deadline = tokio::time::Instant::now() + grace;
        loop {
            tokio::select! {
                next = tasks.join_next() => match next {
                    Some(result) => log_join_result(result),
                    None => return 0,
                },
                () = tokio::time::sleep_until(deadline) => {
                    let left = tasks.len();
                    logger::log_warning(&format!(
                        "Shutdown grace period elapsed, aborting {left} background task(s)"
                    ));
                    tasks.shutdown().await;
                    return left;
                }
            }
        }
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            logger::log_error(&format!("Background task panicked: {e}"));
        }
    }
}
