use serde::{Deserialize, Serialize};
use url::Url;

/// Identity carried in the page's query string. Read once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// `userId` query parameter.
    pub sender_id: Option<String>,
    pub resource_id: Option<String>,
    pub contact_id: Option<String>,
}

impl PageContext {
    pub fn from_url(url: &Url) -> Self {
        let mut ctx = PageContext::default();
        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "userId" => &mut ctx.sender_id,
                "resourceId" => &mut ctx.resource_id,
                "contactId" => &mut ctx.contact_id,
                _ => continue,
            };
            // first occurrence wins
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        ctx
    }

    /// Contact id if present and non-empty.
    pub fn contact_id(&self) -> Option<&str> {
        self.contact_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn sender_id(&self) -> Option<&str> {
        self.sender_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref().filter(|s| !s.is_empty())
    }
}

/// Page-level configuration the embedding page may set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    pub page_name: Option<String>,
    pub next_page: Option<String>,
    pub campaign_id: Option<u64>,
    pub label_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_contact_details")]
    pub contact_details: String,
    #[serde(default = "default_notification")]
    pub notification: String,
    #[serde(default = "default_submission")]
    pub submission: String,
    #[serde(default = "default_video")]
    pub video: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            contact_details: default_contact_details(),
            notification: default_notification(),
            submission: default_submission(),
            video: default_video(),
        }
    }
}

fn default_contact_details() -> String {
    "https://apiv2.rapidfunnel.com/v2/contact-details".to_string()
}

fn default_notification() -> String {
    "https://app.rapidfunnel.com/api/mail/send-cta-email".to_string()
}

fn default_submission() -> String {
    "https://my.rapidfunnel.com/landing/resource/create-custom-contact".to_string()
}

fn default_video() -> String {
    "https://my.rapidfunnel.com/landing/resource/push-to-sqs".to_string()
}

/// Everything the tracker components read, constructed once per page.
#[derive(Debug, Clone)]
pub struct InitializationContext {
    pub page: PageContext,
    pub settings: PageSettings,
    pub page_url: Url,
}

impl InitializationContext {
    pub fn new(page_url: Url, settings: PageSettings) -> Self {
        Self {
            page: PageContext::from_url(&page_url),
            settings,
            page_url,
        }
    }

    /// Configured page name, else the URL path.
    pub fn page_name(&self) -> String {
        self.settings
            .page_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.page_url.path().to_string())
    }

    /// `sentFrom` value for submissions.
    pub fn sent_from(&self) -> String {
        if self.page_url.scheme() == "file" {
            "customPage".to_string()
        } else {
            self.page_url.to_string()
        }
    }
}
