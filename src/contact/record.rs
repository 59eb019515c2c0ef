use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::form_urlencoded;

use crate::dom::element::ElementHandle;
use crate::error::ValidationError;
use crate::fields::role::{Role, RoleAssignment};
use crate::page::context::PageSettings;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("static email pattern"));

/// Campaign and tag ids attached to every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactDefaults {
    pub campaign: u64,
    pub contact_tag: u64,
}

impl From<&PageSettings> for ContactDefaults {
    fn from(settings: &PageSettings) -> Self {
        Self {
            campaign: settings.campaign_id.unwrap_or(0),
            contact_tag: settings.label_id.unwrap_or(0),
        }
    }
}

/// Sparse, insertion-ordered contact payload. Holds no empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    fields: Vec<(String, String)>,
}

impl ContactRecord {
    /// Insert `value` unless it is empty after trimming.
    pub fn push(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.fields.retain(|(k, _)| k != key);
        self.fields.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject records that cannot identify a contact.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.get("email");
        let phone = self.get("phone");

        if email.is_none() && phone.is_none() {
            return Err(ValidationError::MissingContact);
        }
        if let Some(email) = email {
            if !EMAIL_SHAPE.is_match(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        Ok(())
    }

    /// URL-encoded form of the record, as sent in the `formData` field.
    pub fn to_form_data(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.fields {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

/// Build the submission record from identified fields.
pub fn build<E: ElementHandle>(
    roles: &RoleAssignment,
    elements: &[E],
    defaults: ContactDefaults,
) -> ContactRecord {
    let value = |role: Role| {
        roles
            .value_of(role, elements)
            .filter(|v| !v.is_empty())
    };

    let (first, last) = match (
        value(Role::FirstName),
        value(Role::LastName),
        value(Role::CombinedName),
    ) {
        (Some(first), Some(last), _) => (first.to_string(), last.to_string()),
        (_, _, Some(full)) => split_name(full),
        (Some(first), None, None) => (first.to_string(), String::new()),
        // A lone last-name field is sent as the first name.
        (None, Some(last), None) => (last.to_string(), String::new()),
        (None, None, None) => (String::new(), String::new()),
    };

    let mut record = ContactRecord::default();
    record.push("firstName", &first);
    record.push("lastName", &last);
    if let Some(email) = value(Role::Email) {
        record.push("email", email);
    }
    if let Some(phone) = value(Role::Phone) {
        record.push("phone", phone);
    }
    record.push("campaign", &defaults.campaign.to_string());
    record.push("contactTag", &defaults.contact_tag.to_string());
    record
}

/// First whitespace token is the first name; the rest, single-spaced, the last.
pub fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
