use serde::Deserialize;
use tracing::{error, warn};

use crate::dom::element::ElementHandle;
use crate::flow::dispatch::TrackerDeps;
use crate::remote::api::VideoPlayEvent;

/// Player-side facts reported with a play event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub hashed_id: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub visitor_key: String,
    #[serde(default)]
    pub event_key: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum VideoOutcome {
    /// Page identity missing or non-numeric; nothing sent.
    Skipped,
    Sent,
    Failed,
}

pub struct VideoTracker {
    deps: TrackerDeps,
}

fn is_numeric_id(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
}

impl VideoTracker {
    pub fn new(deps: TrackerDeps) -> Self {
        Self { deps }
    }

    /// Telemetry payload for the initial play, or `None` without a full numeric identity.
    pub fn play_event(&self, video: &VideoInfo) -> Option<VideoPlayEvent> {
        let page = &self.deps.ctx.page;
        let (user_id, resource_id, contact_id) = (
            page.sender_id.as_deref(),
            page.resource_id.as_deref(),
            page.contact_id.as_deref(),
        );
        if !is_numeric_id(user_id) || !is_numeric_id(resource_id) || !is_numeric_id(contact_id) {
            return None;
        }

        let webinar = self
            .deps
            .document
            .find_by_id("webinar")
            .map(|(_, el)| el.value().to_string())
            .unwrap_or_default();

        Some(VideoPlayEvent {
            resource_id: resource_id?.to_string(),
            contact_id: contact_id?.to_string(),
            user_id: user_id?.to_string(),
            percentage_watched: 0,
            media_hash: video.hashed_id.clone(),
            duration: video.duration,
            visitor_key: video.visitor_key.clone(),
            event_key: video.event_key.clone(),
            delay_process: 1,
            webinar,
        })
    }

    pub async fn on_play(&self, video: &VideoInfo) -> VideoOutcome {
        let Some(event) = self.play_event(video) else {
            warn!(
                media = %video.hashed_id,
                "cannot track video play: missing or non-numeric userId, resourceId or contactId"
            );
            return VideoOutcome::Skipped;
        };

        match self.deps.api.push_video_event(&event).await {
            Ok(()) => VideoOutcome::Sent,
            Err(e) => {
                error!(media = %video.hashed_id, error = %e, "video tracking submission failed");
                VideoOutcome::Failed
            }
        }
    }
}
