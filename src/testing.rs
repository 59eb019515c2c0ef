//! Test doubles for the remote endpoints and the host navigator.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use crate::error::RemoteError;
use crate::flow::redirect::Navigator;
use crate::remote::api::{
    ContactDetails, ContactSubmission, CtaNotification, SubmissionResponse, TrackerApi,
    VideoPlayEvent,
};

/// Scripted endpoint behaviour.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Network,
    Http(u16),
    Parse,
}

impl<T: Clone> Reply<T> {
    fn produce(&self, endpoint: &str) -> Result<T, RemoteError> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Network => Err(RemoteError::Network {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            }),
            Reply::Http(status) => Err(RemoteError::Http {
                endpoint: endpoint.to_string(),
                status: *status,
            }),
            Reply::Parse => Err(RemoteError::Parse {
                endpoint: endpoint.to_string(),
                reason: "unexpected body".to_string(),
            }),
        }
    }
}

pub struct MockTrackerApi {
    details: Mutex<Reply<ContactDetails>>,
    notification: Mutex<Reply<Value>>,
    submission: Mutex<Reply<SubmissionResponse>>,
    video: Mutex<Reply<()>>,

    details_calls: AtomicUsize,
    submissions: Mutex<Vec<ContactSubmission>>,
    notifications: Mutex<Vec<CtaNotification>>,
    video_events: Mutex<Vec<VideoPlayEvent>>,

    submission_gate: Option<Semaphore>,
}

impl Default for MockTrackerApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrackerApi {
    /// Every endpoint succeeds; submissions return contact id 42.
    pub fn new() -> Self {
        Self {
            details: Mutex::new(Reply::Ok(ContactDetails::default())),
            notification: Mutex::new(Reply::Ok(json!({ "success": true }))),
            submission: Mutex::new(Reply::Ok(SubmissionResponse::with_contact_id(42))),
            video: Mutex::new(Reply::Ok(())),
            details_calls: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            video_events: Mutex::new(Vec::new()),
            submission_gate: None,
        }
    }

    pub fn with_details(self, reply: Reply<ContactDetails>) -> Self {
        *lock(&self.details) = reply;
        self
    }

    pub fn with_notification(self, reply: Reply<Value>) -> Self {
        *lock(&self.notification) = reply;
        self
    }

    pub fn with_submission(self, reply: Reply<SubmissionResponse>) -> Self {
        *lock(&self.submission) = reply;
        self
    }

    pub fn with_video(self, reply: Reply<()>) -> Self {
        *lock(&self.video) = reply;
        self
    }

    /// Submissions are recorded but do not answer until released.
    pub fn hold_submissions(mut self) -> Self {
        self.submission_gate = Some(Semaphore::new(0));
        self
    }

    pub fn release_submissions(&self, count: usize) {
        if let Some(gate) = &self.submission_gate {
            gate.add_permits(count);
        }
    }

    pub fn submission_calls(&self) -> usize {
        lock(&self.submissions).len()
    }

    pub fn last_submission(&self) -> Option<ContactSubmission> {
        lock(&self.submissions).last().cloned()
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    pub fn notifications(&self) -> Vec<CtaNotification> {
        lock(&self.notifications).clone()
    }

    pub fn video_events(&self) -> Vec<VideoPlayEvent> {
        lock(&self.video_events).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TrackerApi for MockTrackerApi {
    async fn contact_details(&self, _contact_id: &str) -> Result<ContactDetails, RemoteError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        let reply = lock(&self.details).clone();
        reply.produce("mock://contact-details")
    }

    async fn send_cta_notification(&self, payload: &CtaNotification) -> Result<Value, RemoteError> {
        lock(&self.notifications).push(payload.clone());
        let reply = lock(&self.notification).clone();
        reply.produce("mock://notification")
    }

    async fn create_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionResponse, RemoteError> {
        lock(&self.submissions).push(submission.clone());
        if let Some(gate) = &self.submission_gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let reply = lock(&self.submission).clone();
        reply.produce("mock://submission")
    }

    async fn push_video_event(&self, event: &VideoPlayEvent) -> Result<(), RemoteError> {
        lock(&self.video_events).push(event.clone());
        let reply = lock(&self.video).clone();
        reply.produce("mock://video")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub new_context: bool,
}

/// Navigator that records instead of leaving the page.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Navigation> {
        lock(&self.visits).clone()
    }

    pub fn last_url(&self) -> Option<String> {
        lock(&self.visits).last().map(|n| n.url.clone())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        lock(&self.visits).push(Navigation {
            url: url.to_string(),
            new_context: false,
        });
    }

    fn open_in_new_context(&self, url: &str) {
        lock(&self.visits).push(Navigation {
            url: url.to_string(),
            new_context: true,
        });
    }
}
