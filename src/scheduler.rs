use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to a recurring job running on its own tokio task.
///
/// Stopping is explicit through [`ScheduledTask::stop`]; dropping the handle aborts the task.
pub struct ScheduledTask {
    name: String,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Runs `job` right away and then once per `period`.
    pub fn spawn<F, Fut>(name: &str, period: Duration, job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_at(name, Instant::now(), period, job)
    }

    /// Runs `job` for the first time one `period` from now.
    pub fn spawn_delayed<F, Fut>(name: &str, period: Duration, job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_at(name, Instant::now() + period, period, job)
    }

    fn spawn_at<F, Fut>(name: &str, start: Instant, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut stopped) = watch::channel(false);
        let task_name = name.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => job().await,
                }
            }

            debug!("Scheduled task '{}' exited", task_name);
        });

        debug!("Scheduled task '{}' started, period {:?}", name, period);

        Self {
            name: name.to_string(),
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the task and waits for the job in flight to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Scheduled task '{}' ended abnormally: {}", self.name, e);
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
