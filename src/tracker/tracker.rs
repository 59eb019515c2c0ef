use tracing::{debug, info};

use crate::dom::element::ElementId;
use crate::flow::dispatch::{Dispatch, IgnoreReason, TrackerDeps};
use crate::flow::notification::NotificationDispatcher;
use crate::flow::submission::{SubmissionOrchestrator, SubmitTrigger};
use crate::video::telemetry::{VideoInfo, VideoOutcome, VideoTracker};

/// Routes page events to the submission and CTA flows.
pub struct Tracker {
    deps: TrackerDeps,
    submissions: SubmissionOrchestrator,
    notifications: NotificationDispatcher,
    video: VideoTracker,
}

impl Tracker {
    pub fn new(deps: TrackerDeps) -> Self {
        let page = &deps.ctx.page;
        if page.sender_id().is_none() || page.resource_id().is_none() {
            info!("userId or resourceId missing from URL parameters; tracking will be limited");
        }
        debug!(params = ?page, elements = deps.document.len(), "tracker initialized");

        Self {
            submissions: SubmissionOrchestrator::new(deps.clone()),
            notifications: NotificationDispatcher::new(deps.clone()),
            video: VideoTracker::new(deps.clone()),
            deps,
        }
    }

    pub fn deps(&self) -> &TrackerDeps {
        &self.deps
    }

    /// Click on any element. Submit controls submit, links and other
    /// buttons notify, everything else is ignored.
    pub fn click(&self, id: ElementId) -> Dispatch {
        let Some(el) = self.deps.document.get(id) else {
            return Dispatch::ignored(IgnoreReason::UnknownElement);
        };
        if el.is_disabled() {
            debug!(element = %el.describe(), "click on disabled control ignored");
            return Dispatch::ignored(IgnoreReason::Disabled);
        }

        if el.is_submit_control() {
            debug!(element = %el.describe(), "click routed to submission");
            self.submissions.dispatch(SubmitTrigger::ControlClick(id))
        } else if el.is_link() {
            self.notifications.on_link_click(id)
        } else if el.is_button() {
            self.notifications.on_button_click(id)
        } else {
            Dispatch::ignored(IgnoreReason::NotInteractive)
        }
    }

    /// Native submit event of the form with id `form_id`.
    pub fn submit_form(&self, form_id: &str) -> Dispatch {
        self.submissions
            .dispatch(SubmitTrigger::FormSubmit(form_id.to_string()))
    }

    pub async fn video_play(&self, video: &VideoInfo) -> VideoOutcome {
        self.video.on_play(video).await
    }
}
