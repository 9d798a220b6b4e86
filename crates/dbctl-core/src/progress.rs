//! Readiness polling for create and restore
//!
//! After a create or restore request is accepted the instance spends a while
//! provisioning. [`wait_until_ready`] polls the instance detail until its
//! status is `available` or `backing-up`, with optional progress callbacks
//! for UI updates.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::api::{DatabaseApi, DatabaseInstanceRecord, InstanceStatus, RequestContext};
use crate::error::{CoreError, Result};

/// How often to poll and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait after the first non-ready status
    pub first_interval: Duration,
    /// Wait after every later non-ready status
    pub interval: Duration,
    /// Give up after this long; `None` polls until ready
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            first_interval: Duration::from_secs(5),
            interval: Duration::from_secs(30),
            max_wait: None,
        }
    }
}

impl PollPolicy {
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Delay before fetch number `completed + 1`
    fn delay_after(&self, completed: u32) -> Duration {
        if completed <= 1 {
            self.first_interval
        } else {
            self.interval
        }
    }
}

/// Progress events emitted while waiting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling has begun
    Started { name: String },
    /// A status fetch returned
    Polling {
        name: String,
        status: InstanceStatus,
        elapsed: Duration,
    },
    /// The instance reached a ready status
    Ready {
        name: String,
        status: InstanceStatus,
        elapsed: Duration,
    },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive a spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll an instance until it is ready
///
/// The first status fetch happens immediately. Fetch errors are returned as-is
/// and end the wait.
///
/// # Example
///
/// ```rust,ignore
/// use dbctl_core::{PollPolicy, ProgressEvent, wait_until_ready};
///
/// let record = wait_until_ready(
///     &api,
///     &ctx,
///     "orders",
///     &PollPolicy::default(),
///     Some(&Box::new(|event| {
///         if let ProgressEvent::Polling { status, .. } = event {
///             println!("status: {}", status);
///         }
///     })),
/// )
/// .await?;
/// ```
pub async fn wait_until_ready(
    api: &dyn DatabaseApi,
    ctx: &RequestContext,
    name: &str,
    policy: &PollPolicy,
    on_progress: Option<&ProgressCallback>,
) -> Result<DatabaseInstanceRecord> {
    let start = Instant::now();
    let mut fetches: u32 = 0;

    emit(
        on_progress,
        ProgressEvent::Started {
            name: name.to_string(),
        },
    );

    loop {
        let record = api.get_instance(ctx, name).await?;
        fetches += 1;
        let elapsed = start.elapsed();
        debug!("{} status after {:?}: {}", name, elapsed, record.status);

        if record.status.is_ready() {
            emit(
                on_progress,
                ProgressEvent::Ready {
                    name: name.to_string(),
                    status: record.status.clone(),
                    elapsed,
                },
            );
            return Ok(record);
        }

        emit(
            on_progress,
            ProgressEvent::Polling {
                name: name.to_string(),
                status: record.status.clone(),
                elapsed,
            },
        );

        let delay = policy.delay_after(fetches);
        if let Some(max_wait) = policy.max_wait
            && elapsed + delay > max_wait
        {
            return Err(CoreError::Timeout(max_wait));
        }
        tokio::time::sleep(delay).await;
    }
}

fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        CreateDatabaseRequest, LinkDatabaseRequest, ResetCredentialsRequest,
        RestoreDatabaseRequest,
    };
    use crate::credentials::Credentials;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Serves a scripted sequence of statuses and records when each fetch happened
    struct ScriptedStatuses {
        statuses: Mutex<VecDeque<&'static str>>,
        fetched_at: Mutex<Vec<Instant>>,
    }

    impl ScriptedStatuses {
        fn new(statuses: &[&'static str]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                fetched_at: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DatabaseApi for ScriptedStatuses {
        async fn create_database(&self, _: &RequestContext, _: &CreateDatabaseRequest) -> Result<()> {
            unreachable!()
        }
        async fn link_database(&self, _: &RequestContext, _: &LinkDatabaseRequest) -> Result<()> {
            unreachable!()
        }
        async fn delete_database(&self, _: &RequestContext, _: &str) -> Result<()> {
            unreachable!()
        }
        async fn unlink_database(&self, _: &RequestContext, _: &str) -> Result<()> {
            unreachable!()
        }
        async fn get_instance(&self, _: &RequestContext, name: &str) -> Result<DatabaseInstanceRecord> {
            self.fetched_at.lock().unwrap().push(Instant::now());
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CoreError::Transport("script exhausted".to_string()))?;
            Ok(DatabaseInstanceRecord {
                postgres_instance_name: name.to_string(),
                status: status.into(),
                host_name: "h".to_string(),
                port: 5432,
                database_username: "u".to_string(),
                is_linked: None,
                supports_time_travel: None,
            })
        }
        async fn list_instances(&self, _: &RequestContext) -> Result<Vec<DatabaseInstanceRecord>> {
            unreachable!()
        }
        async fn reset_credentials(
            &self,
            _: &RequestContext,
            _: &str,
            _: &ResetCredentialsRequest,
        ) -> Result<()> {
            unreachable!()
        }
        async fn restore_database(
            &self,
            _: &RequestContext,
            _: &str,
            _: &RestoreDatabaseRequest,
        ) -> Result<()> {
            unreachable!()
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("h", Credentials::new("t", "o"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_five_then_thirty_seconds() {
        let api = ScriptedStatuses::new(&["provisioning", "provisioning", "available"]);

        let record = wait_until_ready(&api, &ctx(), "orders", &PollPolicy::default(), None)
            .await
            .unwrap();
        assert_eq!(record.status, InstanceStatus::Available);

        let at = api.fetched_at.lock().unwrap().clone();
        assert_eq!(at.len(), 3);
        let first_gap = at[1] - at[0];
        let second_gap = at[2] - at[1];
        assert!(first_gap >= Duration::from_secs(5) && first_gap < Duration::from_secs(6));
        assert!(second_gap >= Duration::from_secs(30) && second_gap < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_fetch_does_not_sleep() {
        let api = ScriptedStatuses::new(&["backing-up"]);
        let start = Instant::now();

        wait_until_ready(&api, &ctx(), "orders", &PollPolicy::default(), None)
            .await
            .unwrap();

        assert_eq!(api.fetched_at.lock().unwrap().len(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_ends_wait() {
        let api = ScriptedStatuses::new(&["provisioning"]);
        let err = wait_until_ready(&api, &ctx(), "orders", &PollPolicy::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(api.fetched_at.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_wait_times_out() {
        let api = ScriptedStatuses::new(&["provisioning"; 10]);
        let policy = PollPolicy::default().with_max_wait(Some(Duration::from_secs(20)));

        let err = wait_until_ready(&api, &ctx(), "orders", &policy, None)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        // 0s fetch, sleep 5s, 5s fetch, next sleep would pass 20s
        assert_eq!(api.fetched_at.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events() {
        let api = ScriptedStatuses::new(&["restoring", "available"]);
        let events: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = events.clone();
        let callback: ProgressCallback = Box::new(move |event| {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::Polling { status, .. } => format!("polling:{}", status),
                ProgressEvent::Ready { status, .. } => format!("ready:{}", status),
            };
            sink.lock().unwrap().push(label);
        });

        wait_until_ready(&api, &ctx(), "copy", &PollPolicy::default(), Some(&callback))
            .await
            .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["started", "polling:restoring", "ready:available"]
        );
    }
}
