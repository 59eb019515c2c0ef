use std::sync::Arc;

use funnel_tracker::{
    Tracker,
    dom::{
        document::Document,
        element::{DomElement, ElementId},
    },
    flow::dispatch::TrackerDeps,
    page::context::{InitializationContext, PageSettings},
    testing::{MockTrackerApi, RecordingNavigator},
};
use url::Url;

pub const PAGE: &str = "https://landing.example.com/offer?userId=7&resourceId=11&contactId=99";

pub fn input(kind: &str) -> DomElement {
    DomElement::new("input").with_attr("type", kind)
}

pub fn text_input(name: &str) -> DomElement {
    input("text").with_attr("name", name)
}

/// Contact form `signup`: first/last/email/phone plus a submit button.
pub fn signup_form() -> Vec<DomElement> {
    vec![
        DomElement::new("form").with_attr("id", "signup"),
        text_input("first_name").in_form("signup").with_value("Ada"),
        text_input("last_name").in_form("signup").with_value("Lovelace"),
        input("email").with_attr("name", "email").in_form("signup").with_value("ada@example.com"),
        input("tel").with_attr("name", "phone").in_form("signup").with_value("555-0100"),
        DomElement::new("button")
            .with_attr("id", "send")
            .with_text("Send")
            .in_form("signup"),
    ]
}

pub struct Harness {
    pub tracker: Tracker,
    pub api: Arc<MockTrackerApi>,
    pub nav: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(url: &str, elements: Vec<DomElement>) -> Self {
        Self::with(url, elements, PageSettings::default(), MockTrackerApi::new())
    }

    pub fn with(
        url: &str,
        elements: Vec<DomElement>,
        settings: PageSettings,
        api: MockTrackerApi,
    ) -> Self {
        let url = Url::parse(url).unwrap();
        let doc = Document::new(url.clone(), elements);
        let ctx = InitializationContext::new(url, settings);

        let api = Arc::new(api);
        let nav = Arc::new(RecordingNavigator::new());
        let deps = TrackerDeps::new(ctx, doc, api.clone(), nav.clone());

        Self {
            tracker: Tracker::new(deps),
            api,
            nav,
        }
    }

    /// Element with the given `id` attribute.
    pub fn id(&self, id: &str) -> ElementId {
        self.tracker
            .deps()
            .document
            .find_by_id(id)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("no element #{}", id))
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        let el_id = self.id(id);
        self.tracker.deps().document.get(el_id).unwrap().is_disabled()
    }
}
