//! Fetcher trait and a scripted mock for tests

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::error::FetchError;
use super::types::{SummaryPayload, UserInfo};

/// Source of review availability data.
///
/// The poll loop treats this as opaque: each call is independent and any
/// failure is classified by its `FetchError`.
#[async_trait]
pub trait SummaryFetcher: Send + Sync {
    /// Fetch the current review summary
    async fn fetch_summary(&self, token: &str) -> Result<SummaryPayload, FetchError>;

    /// Fetch the account behind a token, used to validate new credentials
    async fn fetch_user(&self, token: &str) -> Result<UserInfo, FetchError>;
}

#[derive(Debug, Clone)]
struct ScriptedResponse {
    result: Result<SummaryPayload, FetchError>,
    delay: Duration,
}

/// Fetcher that replays scripted responses.
///
/// Responses are returned in the order they were pushed; once the script is
/// exhausted the last response repeats.
#[derive(Debug)]
pub struct MockSummaryFetcher {
    script: Mutex<VecDeque<ScriptedResponse>>,
    last: Mutex<Option<ScriptedResponse>>,
    user: Mutex<Result<UserInfo, FetchError>>,
    tokens: Mutex<Vec<String>>,
    summary_calls: AtomicUsize,
    user_calls: AtomicUsize,
}

impl MockSummaryFetcher {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            user: Mutex::new(Ok(UserInfo {
                username: "mock-user".to_string(),
                level: 1,
            })),
            tokens: Mutex::new(Vec::new()),
            summary_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a response returned immediately
    pub fn push(&self, result: Result<SummaryPayload, FetchError>) -> &Self {
        self.push_delayed(result, Duration::ZERO)
    }

    /// Queue a response returned after `delay`
    pub fn push_delayed(&self, result: Result<SummaryPayload, FetchError>, delay: Duration) -> &Self {
        lock(&self.script).push_back(ScriptedResponse { result, delay });
        self
    }

    /// Set the result of `fetch_user`
    pub fn set_user(&self, result: Result<UserInfo, FetchError>) {
        *lock(&self.user) = result;
    }

    /// Number of `fetch_summary` calls started so far
    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_user` calls started so far
    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `fetch_summary`, in call order
    pub fn tokens_seen(&self) -> Vec<String> {
        lock(&self.tokens).clone()
    }

    fn next_response(&self) -> ScriptedResponse {
        let next = lock(&self.script).pop_front();
        let mut last = lock(&self.last);
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| ScriptedResponse {
                result: Err(FetchError::Malformed("no scripted response".to_string())),
                delay: Duration::ZERO,
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockSummaryFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryFetcher for MockSummaryFetcher {
    async fn fetch_summary(&self, token: &str) -> Result<SummaryPayload, FetchError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.tokens).push(token.to_string());

        let response = self.next_response();
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.result
    }

    async fn fetch_user(&self, _token: &str) -> Result<UserInfo, FetchError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.user).clone()
    }
}
