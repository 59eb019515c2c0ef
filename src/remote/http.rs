use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::RemoteError;
use crate::page::context::Endpoints;
use crate::remote::api::{
    ContactDetails, ContactDetailsEnvelope, ContactSubmission, CtaNotification,
    SubmissionResponse, TrackerApi, VideoPlayEvent,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const FORM_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// `TrackerApi` over HTTP. No request timeout is configured.
pub struct HttpTrackerApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpTrackerApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(),
            endpoints,
        }
    }

    fn details_url(&self, contact_id: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.contact_details.trim_end_matches('/'),
            contact_id
        )
    }
}

fn network(endpoint: &str, e: reqwest::Error) -> RemoteError {
    RemoteError::Network {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    }
}

fn parse(endpoint: &str, reason: impl ToString) -> RemoteError {
    RemoteError::Parse {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

/// Turn a non-success status into `RemoteError::Http`, logging the body if it is JSON.
async fn check_status(endpoint: &str, response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<Value>().await {
        Ok(body) => error!(endpoint, status = status.as_u16(), %body, "request rejected"),
        Err(_) => error!(endpoint, status = status.as_u16(), "request rejected (unreadable body)"),
    }
    Err(RemoteError::Http {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
    })
}

#[async_trait]
impl TrackerApi for HttpTrackerApi {
    async fn contact_details(&self, contact_id: &str) -> Result<ContactDetails, RemoteError> {
        let url = self.details_url(contact_id);
        debug!(contact_id, "fetching contact details");

        let response = self.client.get(&url).send().await.map_err(|e| network(&url, e))?;
        let response = check_status(&url, response).await?;
        let envelope: ContactDetailsEnvelope =
            response.json().await.map_err(|e| parse(&url, e))?;

        match envelope.data {
            Some(details) => Ok(details),
            None => {
                warn!(contact_id, "contact details response has no data");
                Err(parse(&url, "missing 'data' object"))
            }
        }
    }

    async fn send_cta_notification(&self, payload: &CtaNotification) -> Result<Value, RemoteError> {
        let url = &self.endpoints.notification;
        debug!(cta = %payload.cta_location, "sending CTA notification");

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| network(url, e))?;
        let response = check_status(url, response).await?;
        let body: Value = response.json().await.map_err(|e| parse(url, e))?;

        info!(cta = %payload.cta_location, "CTA notification sent");
        Ok(body)
    }

    async fn create_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionResponse, RemoteError> {
        let url = &self.endpoints.submission;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(submission.form_fields())
            .finish();
        debug!(%body, "submitting contact");

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(header::ACCEPT, FORM_ACCEPT)
            .body(body)
            .send()
            .await
            .map_err(|e| network(url, e))?;
        let response = check_status(url, response).await?;
        response.json().await.map_err(|e| parse(url, e))
    }

    async fn push_video_event(&self, event: &VideoPlayEvent) -> Result<(), RemoteError> {
        let url = &self.endpoints.video;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(event.form_fields())
            .finish();

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(header::ACCEPT, FORM_ACCEPT)
            .header("X-Requested-With", "XMLHttpRequest")
            .body(body)
            .send()
            .await
            .map_err(|e| network(url, e))?;
        let response = check_status(url, response).await?;

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if is_json {
            let body: Value = response.json().await.map_err(|e| parse(url, e))?;
            if body.is_null() || body == Value::Bool(false) {
                warn!(media = %event.media_hash, "video telemetry returned a falsy response");
            }
        }
        info!(media = %event.media_hash, "video play recorded");
        Ok(())
    }
}
