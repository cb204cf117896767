//! Review scheduler - the fetch, decide, sleep cycle
//!
//! One cycle task is live at a time. Every trigger (startup, credential
//! change, "started reviewing", connectivity regained) cancels the live
//! cycle and spawns a fresh one. The cycle publishes through a watch channel
//! and checks for cancellation under the same lock `restart()` cancels with,
//! so a cancelled cycle never publishes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::status::LoopStatus;
use crate::api::{FetchError, SummaryFetcher, SummaryPayload, UserInfo};
use crate::clock::{Clock, SystemClock};
use crate::credentials::CredentialStore;
use crate::error::{Result, ReviewCountError};
use crate::reload_policy::ReloadPolicy;
use crate::review_state::{ReviewCountInfo, ReviewSnapshot};

/// What one fetch attempt produced
#[derive(Debug)]
enum PollOutcome {
    NoCredential,
    Loaded(SummaryPayload),
    Failed(FetchError),
}

/// Handle to the live cycle task
struct Cycle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// State guarded by the control lock
struct Control {
    cycle: Option<Cycle>,
    status: LoopStatus,
    last_activity_at: Option<DateTime<Utc>>,
}

struct Inner {
    fetcher: Arc<dyn SummaryFetcher>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    published: watch::Sender<ReviewCountInfo>,
    control: Mutex<Control>,
}

/// Polls the review summary on an adaptive schedule.
///
/// Cloning is cheap and every clone drives the same loop. Methods that start
/// a cycle must be called from within a tokio runtime.
#[derive(Clone)]
pub struct ReviewScheduler {
    inner: Arc<Inner>,
}

impl ReviewScheduler {
    /// Create an idle scheduler using the system clock
    pub fn new(fetcher: Arc<dyn SummaryFetcher>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self::with_clock(fetcher, credentials, Arc::new(SystemClock))
    }

    /// Create an idle scheduler with an explicit clock
    pub fn with_clock(
        fetcher: Arc<dyn SummaryFetcher>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (published, _) = watch::channel(ReviewCountInfo::Unloaded);

        Self {
            inner: Arc::new(Inner {
                fetcher,
                credentials,
                clock,
                published,
                control: Mutex::new(Control {
                    cycle: None,
                    status: LoopStatus::Idle,
                    last_activity_at: None,
                }),
            }),
        }
    }

    /// Receive every published state, starting with the current one
    pub fn subscribe(&self) -> watch::Receiver<ReviewCountInfo> {
        self.inner.published.subscribe()
    }

    /// Most recently published state
    pub fn current(&self) -> ReviewCountInfo {
        self.inner.published.borrow().clone()
    }

    pub fn status(&self) -> LoopStatus {
        self.inner.lock_control().status
    }

    /// Last time the user started reviewing or completed reviews
    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock_control().last_activity_at
    }

    /// Start polling immediately
    pub fn start(&self) {
        self.restart();
    }

    /// Cancel the live cycle, if any, and begin a new one immediately.
    ///
    /// Ignored once the scheduler has been shut down.
    pub fn restart(&self) {
        let mut control = self.inner.lock_control();

        if control.status.is_terminal() {
            debug!("Scheduler stopped, ignoring restart");
            return;
        }

        if let Some(previous) = control.cycle.take() {
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_cycles(Arc::clone(&self.inner), cancel.clone()));

        control.cycle = Some(Cycle { cancel, handle });
        control.status = LoopStatus::Polling;
        debug!("Started poll cycle");
    }

    /// Record that the user is about to review and poll right away
    pub fn signal_user_started_reviewing(&self) {
        {
            let mut control = self.inner.lock_control();
            control.last_activity_at = Some(self.inner.clock.now());
        }
        info!("User started reviewing");
        self.restart();
    }

    /// Validate `token` against the service, store it and restart polling.
    ///
    /// Nothing is stored when validation fails.
    pub async fn add_credential(&self, token: &str) -> Result<UserInfo> {
        if self.status().is_terminal() {
            return Err(ReviewCountError::InvalidState("scheduler is stopped".to_string()));
        }

        let token = token.trim();
        let user = self.inner.fetcher.fetch_user(token).await?;
        self.inner.credentials.set(token)?;
        info!("Added API token for {} (level {})", user.username, user.level);

        self.restart();
        Ok(user)
    }

    /// Remove the stored token and restart, which publishes `Unloaded`
    pub fn remove_credential(&self) -> Result<()> {
        self.inner.credentials.remove()?;
        info!("Removed API token");

        self.restart();
        Ok(())
    }

    /// Cancel the live cycle and refuse further restarts
    pub fn shutdown(&self) {
        let mut control = self.inner.lock_control();
        if let Some(cycle) = control.cycle.take() {
            cycle.cancel.cancel();
            cycle.handle.abort();
        }
        control.status = LoopStatus::Stopped;
        info!("Scheduler stopped");
    }
}

impl std::fmt::Debug for ReviewScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewScheduler")
            .field("status", &self.status())
            .field("current", &self.current())
            .finish()
    }
}

impl Inner {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the credential and fetch the summary
    async fn poll_once(&self) -> PollOutcome {
        let token = match self.credentials.get() {
            Ok(Some(token)) => token,
            Ok(None) => return PollOutcome::NoCredential,
            Err(e) => {
                warn!("Failed to read API token: {}", e);
                return PollOutcome::NoCredential;
            }
        };

        match self.fetcher.fetch_summary(&token).await {
            Ok(summary) => PollOutcome::Loaded(summary),
            Err(e) => {
                error!("Error checking reviews: {}", e);
                PollOutcome::Failed(e)
            }
        }
    }

    /// Publish the outcome of a fetch unless `cancel` has fired.
    ///
    /// Returns the next wake time, or `None` when the cycle should end.
    fn publish(&self, cancel: &CancellationToken, outcome: PollOutcome) -> Option<DateTime<Utc>> {
        let mut control = self.lock_control();

        if cancel.is_cancelled() {
            debug!("Cancelled, not updating review count info");
            return None;
        }

        let now = self.clock.now();

        let (info, policy) = match outcome {
            PollOutcome::NoCredential => {
                debug!("No API token, not loading reviews");
                (ReviewCountInfo::Unloaded, ReloadPolicy::None)
            }
            PollOutcome::Failed(e) => (ReviewCountInfo::Error { kind: e.kind() }, e.reload_policy()),
            PollOutcome::Loaded(summary) => {
                let snapshot = ReviewSnapshot::from_summary(&summary, now);
                let next_reviews_at = snapshot.next_reviews_at;
                let info = ReviewCountInfo::Loaded(snapshot);

                let reviewed = info.has_reviewed_subjects(&self.published.borrow());
                if reviewed {
                    debug!("Reviews completed since last check");
                    control.last_activity_at = Some(now);
                }

                if let Some(next) = next_reviews_at {
                    debug!("Next reviews at {} ({} seconds)", next, (next - now).num_seconds());
                }
                if let Some(last) = control.last_activity_at {
                    debug!("Last activity at {} ({} seconds)", last, (last - now).num_seconds());
                }

                let policy = ReloadPolicy::decide(next_reviews_at, control.last_activity_at, now);
                match policy {
                    ReloadPolicy::NextHour => debug!("Next reviews are in the future: reloading next hour"),
                    ReloadPolicy::Fast => debug!("Recent activity: reloading at higher frequency"),
                    _ => {}
                }
                (info, policy)
            }
        };

        // Subscribers are only woken when the state actually differs
        self.published.send_if_modified(|current| {
            if *current == info {
                false
            } else {
                *current = info;
                true
            }
        });

        if !policy.reschedules() {
            debug!("Not reloading");
            control.status = LoopStatus::Idle;
            return None;
        }

        debug!("Policy {}", policy);
        policy.wake_at(now, &self.clock.utc_offset(now))
    }
}

/// Body of one cycle task: fetch, publish, sleep, repeat
async fn run_cycles(inner: Arc<Inner>, cancel: CancellationToken) {
    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancelled while fetching");
                return;
            }
            outcome = inner.poll_once() => outcome,
        };

        let Some(wake_at) = inner.publish(&cancel, outcome) else {
            return;
        };

        let delay = (wake_at - inner.clock.now()).to_std().unwrap_or(Duration::ZERO);
        info!("Reloading at {} ({} seconds)", wake_at, delay.as_secs());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancelled while sleeping");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchErrorKind, MockSummaryFetcher};
    use crate::clock::TokioClock;
    use crate::credentials::{CredentialError, MemoryCredentialStore};
    use chrono::TimeDelta;
    use std::collections::BTreeSet;

    fn start_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T12:10:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn summary(ids: &[i64]) -> SummaryPayload {
        SummaryPayload::new(start_time()).with_batch(start_time() - TimeDelta::hours(1), ids.iter().copied())
    }

    fn create_scheduler(token: Option<&str>) -> (ReviewScheduler, Arc<MockSummaryFetcher>, Arc<MemoryCredentialStore>) {
        let fetcher = Arc::new(MockSummaryFetcher::new());
        let credentials = Arc::new(match token {
            Some(token) => MemoryCredentialStore::with_token(token),
            None => MemoryCredentialStore::new(),
        });
        let scheduler = ReviewScheduler::with_clock(
            fetcher.clone(),
            credentials.clone(),
            Arc::new(TokioClock::starting_at(start_time())),
        );
        (scheduler, fetcher, credentials)
    }

    fn available(scheduler: &ReviewScheduler) -> Option<BTreeSet<i64>> {
        scheduler.current().snapshot().map(|s| s.available_subject_ids.clone())
    }

    /// Let spawned tasks run without reaching any poll deadline
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    async fn sleep_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_scheduler_is_idle_and_unloaded() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        assert_eq!(scheduler.status(), LoopStatus::Idle);
        assert_eq!(scheduler.current(), ReviewCountInfo::Unloaded);
        assert!(scheduler.last_activity_at().is_none());

        settle().await;
        assert_eq!(fetcher.summary_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_credential_publishes_unloaded_without_fetch() {
        let (scheduler, fetcher, _) = create_scheduler(None);
        scheduler.start();
        settle().await;

        assert_eq!(scheduler.current(), ReviewCountInfo::Unloaded);
        assert_eq!(scheduler.status(), LoopStatus::Idle);
        assert_eq!(fetcher.summary_calls(), 0);

        sleep_secs(3600).await;
        assert_eq!(fetcher.summary_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_snapshot_is_published() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2])));

        scheduler.start();
        settle().await;

        assert_eq!(available(&scheduler), Some(BTreeSet::from([1, 2])));
        assert_eq!(scheduler.status(), LoopStatus::Polling);
        assert_eq!(fetcher.tokens_seen(), vec!["token".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regular_policy_polls_every_five_minutes() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(299).await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(2).await;
        assert_eq!(fetcher.summary_calls(), 2);

        sleep_secs(300).await;
        assert_eq!(fetcher.summary_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_next_reviews_waits_for_next_hour() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        let next = start_time() + TimeDelta::hours(3);
        fetcher.push(Ok(SummaryPayload::new(start_time()).with_next_reviews_at(next)));

        // Started at 12:10, so the first wake is 13:00
        scheduler.start();
        settle().await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(49 * 60).await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(2 * 60).await;
        assert_eq!(fetcher.summary_calls(), 2);

        // Then every hour on the hour
        sleep_secs(58 * 60).await;
        assert_eq!(fetcher.summary_calls(), 2);
        sleep_secs(2 * 60).await;
        assert_eq!(fetcher.summary_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_started_reviewing_polls_fast_then_relaxes() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2])));

        scheduler.signal_user_started_reviewing();
        assert_eq!(scheduler.last_activity_at(), Some(start_time()));

        settle().await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(15).await;
        assert_eq!(fetcher.summary_calls(), 2);

        // Fast polls every 15s until the activity is five minutes old
        sleep_secs(286).await;
        assert_eq!(fetcher.summary_calls(), 21);

        // Back to regular polling
        sleep_secs(290).await;
        assert_eq!(fetcher.summary_calls(), 21);
        sleep_secs(20).await;
        assert_eq!(fetcher.summary_calls(), 22);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_reviews_count_as_activity() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2, 3]))).push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;
        assert!(scheduler.last_activity_at().is_none());

        sleep_secs(301).await;
        assert_eq!(fetcher.summary_calls(), 2);
        assert_eq!(available(&scheduler), Some(BTreeSet::from([1])));
        assert!(scheduler.last_activity_at().is_some());

        // Switched to fast polling
        sleep_secs(16).await;
        assert_eq!(fetcher.summary_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_reviews_do_not_count_as_activity() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2, 3]))).push(Ok(summary(&[1, 2, 4])));

        scheduler.start();
        sleep_secs(301).await;

        assert_eq!(fetcher.summary_calls(), 2);
        assert!(scheduler.last_activity_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_stops_until_new_credential() {
        let (scheduler, fetcher, credentials) = create_scheduler(Some("revoked"));
        fetcher.push(Err(FetchError::Unauthorized));

        scheduler.start();
        settle().await;

        assert_eq!(
            scheduler.current(),
            ReviewCountInfo::Error {
                kind: FetchErrorKind::Unauthorized
            }
        );
        assert_eq!(scheduler.status(), LoopStatus::Idle);

        sleep_secs(2 * 3600).await;
        assert_eq!(fetcher.summary_calls(), 1);

        fetcher.push(Ok(summary(&[5])));
        let user = scheduler.add_credential(" fresh-token ").await.unwrap();
        assert_eq!(user.username, "mock-user");
        assert_eq!(credentials.get().unwrap(), Some("fresh-token".to_string()));

        settle().await;
        assert_eq!(fetcher.summary_calls(), 2);
        assert_eq!(fetcher.tokens_seen().last().map(String::as_str), Some("fresh-token"));
        assert_eq!(available(&scheduler), Some(BTreeSet::from([5])));
        assert_eq!(scheduler.status(), LoopStatus::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_connected_waits_for_restart() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Err(FetchError::NotConnected)).push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;
        assert_eq!(
            scheduler.current(),
            ReviewCountInfo::Error {
                kind: FetchErrorKind::NotConnected
            }
        );

        sleep_secs(3600).await;
        assert_eq!(fetcher.summary_calls(), 1);

        // Connectivity regained
        scheduler.restart();
        settle().await;
        assert_eq!(fetcher.summary_calls(), 2);
        assert_eq!(available(&scheduler), Some(BTreeSet::from([1])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retries_after_fallback() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher
            .push(Err(FetchError::ServerError {
                code: 503,
                message: "Unavailable".to_string(),
            }))
            .push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;
        assert!(scheduler.current().is_error());
        assert_eq!(scheduler.status(), LoopStatus::Polling);

        sleep_secs(899).await;
        assert_eq!(fetcher.summary_calls(), 1);

        sleep_secs(2).await;
        assert_eq!(fetcher.summary_calls(), 2);
        assert_eq!(available(&scheduler), Some(BTreeSet::from([1])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_during_sleep_cancels_previous_cycle() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;

        sleep_secs(100).await;
        scheduler.restart();
        settle().await;
        assert_eq!(fetcher.summary_calls(), 2);

        // The first cycle would have woken at 300s
        sleep_secs(210).await;
        assert_eq!(fetcher.summary_calls(), 2);

        // The second wakes at 400s
        sleep_secs(100).await;
        assert_eq!(fetcher.summary_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_fetch_never_publishes() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher
            .push_delayed(Ok(summary(&[1, 2, 3])), Duration::from_secs(10))
            .push(Ok(summary(&[9])));

        let mut rx = scheduler.subscribe();
        scheduler.start();
        settle().await;

        // First cycle is still waiting on its fetch
        assert_eq!(scheduler.current(), ReviewCountInfo::Unloaded);

        scheduler.restart();
        settle().await;
        assert_eq!(available(&scheduler), Some(BTreeSet::from([9])));
        rx.borrow_and_update();

        sleep_secs(20).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(available(&scheduler), Some(BTreeSet::from([9])));
        assert_eq!(fetcher.summary_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_credential_unloads() {
        let (scheduler, fetcher, credentials) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;
        assert!(scheduler.current().snapshot().is_some());

        scheduler.remove_credential().unwrap();
        settle().await;

        assert!(!credentials.has_token());
        assert_eq!(scheduler.current(), ReviewCountInfo::Unloaded);
        assert_eq!(scheduler.status(), LoopStatus::Idle);

        sleep_secs(3600).await;
        assert_eq!(fetcher.summary_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_credential_rejected_token_is_not_stored() {
        let (scheduler, fetcher, credentials) = create_scheduler(None);
        fetcher.set_user(Err(FetchError::Unauthorized));

        let result = scheduler.add_credential("bad-token").await;

        assert!(matches!(result, Err(ReviewCountError::Fetch(FetchError::Unauthorized))));
        assert!(!credentials.has_token());
        settle().await;
        assert_eq!(fetcher.summary_calls(), 0);
        assert_eq!(scheduler.status(), LoopStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop_and_ignores_restarts() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1])));

        scheduler.start();
        settle().await;

        scheduler.shutdown();
        assert_eq!(scheduler.status(), LoopStatus::Stopped);

        scheduler.restart();
        scheduler.signal_user_started_reviewing();
        sleep_secs(3600).await;
        assert_eq!(fetcher.summary_calls(), 1);
        assert_eq!(scheduler.status(), LoopStatus::Stopped);

        let result = scheduler.add_credential("token").await;
        assert!(matches!(result, Err(ReviewCountError::InvalidState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_published_states() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[4, 5])));

        let mut rx = scheduler.subscribe();
        assert_eq!(*rx.borrow_and_update(), ReviewCountInfo::Unloaded);

        scheduler.start();
        rx.changed().await.unwrap();
        let info = rx.borrow_and_update().clone();
        assert_eq!(info.snapshot().map(|s| s.available_count()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_refetch_does_not_notify_subscribers() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2])));

        let mut rx = scheduler.subscribe();
        scheduler.start();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        // Regular policy refetches the same summary after five minutes
        sleep_secs(301).await;
        assert_eq!(fetcher.summary_calls(), 2);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(available(&scheduler), Some(BTreeSet::from([1, 2])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_refetch_notifies_subscribers() {
        let (scheduler, fetcher, _) = create_scheduler(Some("token"));
        fetcher.push(Ok(summary(&[1, 2]))).push(Ok(summary(&[1, 2, 3])));

        let mut rx = scheduler.subscribe();
        scheduler.start();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        sleep_secs(301).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().snapshot().map(|s| s.available_count()), Some(3));
    }

    /// Store whose reads always fail
    struct BrokenCredentialStore;

    impl CredentialStore for BrokenCredentialStore {
        fn get(&self) -> std::result::Result<Option<String>, CredentialError> {
            Err(CredentialError::Storage("keyring locked".to_string()))
        }

        fn set(&self, _token: &str) -> std::result::Result<(), CredentialError> {
            Err(CredentialError::Storage("keyring locked".to_string()))
        }

        fn remove(&self) -> std::result::Result<(), CredentialError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_read_error_is_treated_as_no_credential() {
        let fetcher = Arc::new(MockSummaryFetcher::new());
        fetcher.push(Ok(summary(&[1])));
        let scheduler = ReviewScheduler::with_clock(
            fetcher.clone(),
            Arc::new(BrokenCredentialStore),
            Arc::new(TokioClock::starting_at(start_time())),
        );

        scheduler.start();
        settle().await;

        assert_eq!(scheduler.current(), ReviewCountInfo::Unloaded);
        assert_eq!(scheduler.status(), LoopStatus::Idle);
        assert_eq!(fetcher.summary_calls(), 0);

        sleep_secs(3600).await;
        assert_eq!(fetcher.summary_calls(), 0);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReviewScheduler>();
    }
}
