use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::RemoteError;

/// Contact fields returned by the details lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// `{ "data": { ... } }` envelope of the details endpoint.
#[derive(Debug, Deserialize)]
pub struct ContactDetailsEnvelope {
    pub data: Option<ContactDetails>,
}

/// JSON body of the CTA notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaNotification {
    pub legacy_user_id: Option<Number>,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone_number: String,
    pub contact_email: String,
    pub cta_location: String,
    pub cta_page_name: String,
}

/// One contact-submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    /// URL-encoded contact record.
    pub form_data: String,
    pub resource_id: String,
    pub sender_id: String,
    pub sent_from: String,
}

impl ContactSubmission {
    pub fn form_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("formData", self.form_data.as_str()),
            ("resourceId", self.resource_id.as_str()),
            ("senderId", self.sender_id.as_str()),
            ("sentFrom", self.sent_from.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    #[serde(default)]
    pub contact_id: Option<Value>,
}

impl SubmissionResponse {
    pub fn with_contact_id(id: u64) -> Self {
        Self {
            contact_id: Some(Value::from(id)),
        }
    }

    /// The new contact id, if it is a positive integer (number or numeric string).
    pub fn positive_contact_id(&self) -> Option<u64> {
        let id = match self.contact_id.as_ref()? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f > 0.0)
                    .map(|f| f as u64)
            })?,
            Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        (id > 0).then_some(id)
    }
}

/// Form-encoded video play event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPlayEvent {
    pub resource_id: String,
    pub contact_id: String,
    pub user_id: String,
    pub percentage_watched: u32,
    pub media_hash: String,
    pub duration: f64,
    pub visitor_key: String,
    pub event_key: String,
    pub delay_process: u32,
    pub webinar: String,
}

impl VideoPlayEvent {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("resourceId", self.resource_id.clone()),
            ("contactId", self.contact_id.clone()),
            ("userId", self.user_id.clone()),
            ("percentageWatched", self.percentage_watched.to_string()),
            ("mediaHash", self.media_hash.clone()),
            ("duration", self.duration.to_string()),
            ("visitorKey", self.visitor_key.clone()),
            ("eventKey", self.event_key.clone()),
            ("delayProcess", self.delay_process.to_string()),
            ("webinar", self.webinar.clone()),
        ]
    }
}

/// The remote endpoints the tracker reports to.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn contact_details(&self, contact_id: &str) -> Result<ContactDetails, RemoteError>;

    async fn send_cta_notification(&self, payload: &CtaNotification) -> Result<Value, RemoteError>;

    async fn create_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionResponse, RemoteError>;

    async fn push_video_event(&self, event: &VideoPlayEvent) -> Result<(), RemoteError>;
}
