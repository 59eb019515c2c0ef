use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tokio::task::JoinHandle;

use crate::dom::document::Document;
use crate::flow::notification::NotificationOutcome;
use crate::flow::redirect::Navigator;
use crate::flow::submission::SubmissionOutcome;
use crate::page::context::InitializationContext;
use crate::remote::api::TrackerApi;
use crate::trace::logger::TraceLogger;

/// Shared collaborators handed to every flow component.
#[derive(Clone)]
pub struct TrackerDeps {
    pub ctx: Arc<InitializationContext>,
    pub document: Arc<Document>,
    pub api: Arc<dyn TrackerApi>,
    pub navigator: Arc<dyn Navigator>,
    pub tracer: Arc<TraceLogger>,
}

impl TrackerDeps {
    pub fn new(
        ctx: InitializationContext,
        document: Document,
        api: Arc<dyn TrackerApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            ctx: Arc::new(ctx),
            document: Arc::new(document),
            api,
            navigator,
            tracer: Arc::new(TraceLogger::disabled()),
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Arc::new(tracer);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownElement,
    Disabled,
    NotInteractive,
    MissingSenderId,
}

#[derive(Debug)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Submission(SubmissionOutcome),
    Notification(NotificationOutcome),
}

impl Outcome {
    pub fn submission(&self) -> Option<&SubmissionOutcome> {
        match self {
            Outcome::Submission(s) => Some(s),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&NotificationOutcome> {
        match self {
            Outcome::Notification(n) => Some(n),
            _ => None,
        }
    }
}

/// Result of the synchronous part of an event handler.
///
/// `default_prevented` is final by the time this value exists; everything
/// after the first network boundary lives in the task.
pub struct Dispatch {
    pub default_prevented: bool,
    task: BoxFuture<'static, Outcome>,
}

impl Dispatch {
    pub fn new(default_prevented: bool, task: BoxFuture<'static, Outcome>) -> Self {
        Self {
            default_prevented,
            task,
        }
    }

    /// Completed synchronously, nothing left to await.
    pub fn settled(default_prevented: bool, outcome: Outcome) -> Self {
        Self::new(default_prevented, future::ready(outcome).boxed())
    }

    pub fn ignored(reason: IgnoreReason) -> Self {
        Self::settled(false, Outcome::Ignored(reason))
    }

    /// Drive the remaining steps to completion.
    pub async fn settle(self) -> Outcome {
        self.task.await
    }

    /// Run the remaining steps in the background on the current runtime.
    pub fn detach(self) -> JoinHandle<Outcome> {
        tokio::spawn(self.task)
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("default_prevented", &self.default_prevented)
            .finish_non_exhaustive()
    }
}
