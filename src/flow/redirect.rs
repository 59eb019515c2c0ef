use std::sync::Arc;

use tracing::info;
use url::{Origin, Url};

use crate::dom::document::Document;
use crate::dom::element::{DomElement, ElementHandle};
use crate::page::context::PageSettings;

/// Id of the container whose `data-redirect` is the last-resort target.
pub const SUBMIT_CONTAINER_ID: &str = "contactFormSubmitContainer";

/// Host capability to leave the page.
pub trait Navigator: Send + Sync {
    /// Navigate the current browsing context.
    fn navigate(&self, url: &str);

    /// Open `url` in a new browsing context.
    fn open_in_new_context(&self, url: &str);
}

#[derive(Clone)]
pub struct RedirectResolver {
    navigator: Arc<dyn Navigator>,
}

impl RedirectResolver {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Navigate to `url` honoring `target`; returns whether navigation happened.
    pub fn resolve(&self, url: Option<&str>, target: Option<&str>) -> bool {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            info!("no redirect URL specified");
            return false;
        };
        if target == Some("_blank") {
            info!(url, "redirecting (new context)");
            self.navigator.open_in_new_context(url);
        } else {
            info!(url, "redirecting (same context)");
            self.navigator.navigate(url);
        }
        true
    }
}

/// Where a post-submission redirect target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectSource {
    Control,
    PageSetting,
    Container,
}

/// Pick the post-submission target: control attribute, then page setting,
/// then the submit container's attribute. Empty values are skipped.
pub fn submission_target(
    control: Option<&DomElement>,
    settings: &PageSettings,
    document: &Document,
) -> Option<(RedirectSource, String)> {
    let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_string());

    if let Some(url) = control
        .and_then(|c| c.attribute("data-redirect"))
        .and_then(non_empty)
    {
        return Some((RedirectSource::Control, url));
    }
    if let Some(url) = settings.next_page.as_deref().and_then(non_empty) {
        return Some((RedirectSource::PageSetting, url));
    }
    document
        .find_by_id(SUBMIT_CONTAINER_ID)
        .and_then(|(_, el)| el.attribute("data-redirect"))
        .and_then(non_empty)
        .map(|url| (RedirectSource::Container, url))
}

/// Resolve `target` against the page origin and stamp the identity parameters.
///
/// Pages with an opaque origin (`file:`) resolve against the page URL itself.
pub fn with_identity(
    page_url: &Url,
    target: &str,
    sender_id: &str,
    resource_id: &str,
    contact_id: u64,
) -> Result<Url, url::ParseError> {
    let base = match page_url.origin() {
        origin @ Origin::Tuple(..) => Url::parse(&origin.ascii_serialization())?,
        Origin::Opaque(_) => page_url.clone(),
    };
    let mut url = base.join(target)?;
    set_query_param(&mut url, "userId", sender_id);
    set_query_param(&mut url, "resourceId", resource_id);
    set_query_param(&mut url, "contactId", &contact_id.to_string());
    Ok(url)
}

/// Replace the first `key` pair in place and drop the rest, or append it.
pub fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut seen = false;
            pairs.retain(|(k, _)| {
                if k != key {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Log-only navigator for hosts without a browsing context.
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, url: &str) {
        info!(url, "navigation requested (no browsing context)");
    }

    fn open_in_new_context(&self, url: &str) {
        info!(url, "new-context navigation requested (no browsing context)");
    }
}
