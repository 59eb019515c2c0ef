use futures::FutureExt;
use serde_json::Number;
use tracing::{debug, error, warn};

use crate::dom::element::{DomElement, ElementHandle, ElementId};
use crate::flow::description::describe_cta;
use crate::flow::dispatch::{Dispatch, IgnoreReason, Outcome, TrackerDeps};
use crate::flow::redirect::RedirectResolver;
use crate::remote::api::{ContactDetails, CtaNotification};
use crate::trace::trace::TraceEvent;

const NOT_AVAILABLE: &str = "N/A";
const LOOKUP_FAILED: &str = "System failed to retrieve";
const NO_CONTACT_ID: &str = "No contact ID found";

/// `userId` as a JSON number: integers stay exact, other finite decimals
/// go through `f64`. Anything else is sent as `null`.
pub fn numeric_user_id(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Number::from(n));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    /// The notification endpoint accepted the payload.
    pub notified: bool,
    /// URL handed to the navigator, if any.
    pub redirected_to: Option<String>,
}

/// CTA click handling: notify the sender, then optionally navigate.
#[derive(Clone)]
pub struct NotificationDispatcher {
    deps: TrackerDeps,
    redirect: RedirectResolver,
}

impl NotificationDispatcher {
    pub fn new(deps: TrackerDeps) -> Self {
        let redirect = RedirectResolver::new(deps.navigator.clone());
        Self { deps, redirect }
    }

    /// Base payload for `element`, or `None` when the page has no sender id.
    pub fn base_payload(&self, element: &DomElement) -> Option<CtaNotification> {
        let sender_id = self.deps.ctx.page.sender_id()?;
        Some(CtaNotification {
            legacy_user_id: numeric_user_id(sender_id),
            contact_first_name: NOT_AVAILABLE.to_string(),
            contact_last_name: NOT_AVAILABLE.to_string(),
            contact_phone_number: NOT_AVAILABLE.to_string(),
            contact_email: NOT_AVAILABLE.to_string(),
            cta_location: describe_cta(element),
            cta_page_name: self.deps.ctx.page_name(),
        })
    }

    /// Link: navigation is held back, the notification awaited, then the
    /// redirect always runs.
    pub fn on_link_click(&self, link: ElementId) -> Dispatch {
        let Some(el) = self.deps.document.get(link) else {
            return Dispatch::ignored(IgnoreReason::UnknownElement);
        };
        let Some(payload) = self.base_payload(el) else {
            warn!(link = %el.describe(), "skipping CTA notification: missing userId");
            return Dispatch::ignored(IgnoreReason::MissingSenderId);
        };

        let href = el.attribute("href").map(str::to_string);
        let target = el.attribute("target").unwrap_or("_self").to_string();
        self.trace("cta_link", el, "prevent_default");

        let this = self.clone();
        let task = async move {
            let payload = this.with_contact_details(payload).await;
            let notified = this.notify(&payload).await;

            // Finalizer: runs whatever happened above.
            let redirected = this.redirect.resolve(href.as_deref(), Some(target.as_str()));
            Outcome::Notification(NotificationOutcome {
                notified,
                redirected_to: if redirected { href } else { None },
            })
        };
        Dispatch::new(true, task.boxed())
    }

    /// Non-submit button: default behaviour proceeds; the notification runs
    /// unawaited and a `data-href` redirect follows once it settles.
    pub fn on_button_click(&self, button: ElementId) -> Dispatch {
        let Some(el) = self.deps.document.get(button) else {
            return Dispatch::ignored(IgnoreReason::UnknownElement);
        };
        let Some(payload) = self.base_payload(el) else {
            warn!(button = %el.describe(), "skipping CTA notification: missing userId");
            return Dispatch::ignored(IgnoreReason::MissingSenderId);
        };

        let href = el.attribute("data-href").map(str::to_string);
        let target = el.attribute("data-target").unwrap_or("_self").to_string();
        self.trace("cta_button", el, "allow_default");

        let this = self.clone();
        let task = async move {
            let notified = this.notify(&payload).await;
            let redirected = match href.as_deref() {
                Some(url) => {
                    debug!(url, "custom redirect for button");
                    this.redirect.resolve(Some(url), Some(target.as_str()))
                }
                None => false,
            };
            Outcome::Notification(NotificationOutcome {
                notified,
                redirected_to: if redirected { href } else { None },
            })
        };
        Dispatch::new(false, task.boxed())
    }

    /// Fill contact fields from the lookup; failures degrade to placeholders.
    async fn with_contact_details(&self, mut payload: CtaNotification) -> CtaNotification {
        let Some(contact_id) = self.deps.ctx.page.contact_id() else {
            debug!("no contactId to look up");
            payload.contact_first_name = NO_CONTACT_ID.to_string();
            return payload;
        };

        match self.deps.api.contact_details(contact_id).await {
            Ok(details) => apply_details(&mut payload, &details),
            Err(e) => {
                error!(contact_id, error = %e, "contact details lookup failed");
                payload.contact_first_name = LOOKUP_FAILED.to_string();
                payload.contact_last_name = format!("Contact ID: {}", contact_id);
            }
        }
        payload
    }

    async fn notify(&self, payload: &CtaNotification) -> bool {
        match self.deps.api.send_cta_notification(payload).await {
            Ok(_) => true,
            Err(e) => {
                error!(cta = %payload.cta_location, error = %e, "CTA notification failed");
                false
            }
        }
    }

    fn trace(&self, trigger: &str, el: &DomElement, decision: &str) {
        self.deps
            .tracer
            .log(&TraceEvent::now(trigger).with_element(el).with_decision(decision));
    }
}

fn apply_details(payload: &mut CtaNotification, details: &ContactDetails) {
    let or_na = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };
    payload.contact_first_name = or_na(&details.first_name);
    payload.contact_last_name = or_na(&details.last_name);
    payload.contact_phone_number = or_na(&details.phone);
    payload.contact_email = or_na(&details.email);
}
