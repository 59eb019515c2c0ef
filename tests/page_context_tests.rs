use std::io::Write;
use std::sync::Arc;

use funnel_tracker::{
    Tracker, TrackerError,
    dom::{
        document::{Document, ScopeKind},
        element::{DomElement, ElementHandle},
    },
    flow::dispatch::TrackerDeps,
    page::context::{InitializationContext, PageContext, PageSettings},
    testing::{MockTrackerApi, RecordingNavigator},
    tracker::bootstrap::{Bootstrap, InitGuard, ReadySignal},
};
use pretty_assertions::assert_eq;
use url::Url;

use crate::common::fixtures::{PAGE, signup_form};

mod common;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

// ============================================================================
// PageContext
// ============================================================================

#[test]
fn context_reads_identity_parameters() {
    let ctx = PageContext::from_url(&url(PAGE));
    assert_eq!(ctx.sender_id(), Some("7"));
    assert_eq!(ctx.resource_id(), Some("11"));
    assert_eq!(ctx.contact_id(), Some("99"));
}

#[test]
fn context_takes_first_occurrence() {
    let ctx = PageContext::from_url(&url("https://x.example/?userId=1&userId=2"));
    assert_eq!(ctx.sender_id(), Some("1"));
}

#[test]
fn context_treats_empty_values_as_missing() {
    let ctx = PageContext::from_url(&url("https://x.example/?userId=&contactId="));
    assert_eq!(ctx.sender_id, Some(String::new()));
    assert_eq!(ctx.sender_id(), None);
    assert_eq!(ctx.contact_id(), None);
    assert_eq!(ctx.resource_id(), None);
}

#[test]
fn page_name_defaults_to_path() {
    let ctx = InitializationContext::new(url(PAGE), PageSettings::default());
    assert_eq!(ctx.page_name(), "/offer");

    let named = InitializationContext::new(
        url(PAGE),
        PageSettings {
            page_name: Some("Offer".to_string()),
            ..PageSettings::default()
        },
    );
    assert_eq!(named.page_name(), "Offer");
}

#[test]
fn sent_from_is_page_url_or_custom_page() {
    let web = InitializationContext::new(url(PAGE), PageSettings::default());
    assert_eq!(web.sent_from(), PAGE);

    let local = InitializationContext::new(url("file:///tmp/page.html"), PageSettings::default());
    assert_eq!(local.sent_from(), "customPage");
}

// ============================================================================
// Document
// ============================================================================

#[test]
fn document_normalizes_tags_and_attribute_names() {
    let mut el = DomElement::new("INPUT");
    el.attributes.insert("Type".to_string(), "EMAIL".to_string());
    let doc = Document::new(url(PAGE), vec![el]);

    let (_, el) = doc.iter().next().unwrap();
    assert_eq!(el.tag_name(), "input");
    assert_eq!(el.input_type(), "email");
}

#[test]
fn form_scope_is_document_ordered_subset() {
    let mut elements = vec![DomElement::new("input").with_attr("id", "outside")];
    elements.extend(signup_form());
    let doc = Document::new(url(PAGE), elements);

    let form = doc.scope(ScopeKind::Form("signup".to_string()));
    let all = doc.scope(ScopeKind::Document);

    assert_eq!(form.len(), 5);
    assert_eq!(form.label(), "form:signup");
    assert_eq!(all.len(), 7);
    assert_eq!(all.label(), "document");
    assert!(form.ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn submit_control_defaults() {
    let in_form = DomElement::new("button").in_form("f");
    let plain_button = DomElement::new("button").in_form("f").with_attr("type", "button");
    let outside = DomElement::new("button");
    let outside_submit = DomElement::new("input").with_attr("type", "Submit");
    let link = DomElement::new("a").in_form("f");

    assert!(in_form.is_submit_control());
    assert!(!plain_button.is_submit_control());
    assert!(!outside.is_submit_control());
    assert!(outside_submit.is_submit_control());
    assert!(!link.is_submit_control());
}

#[test]
fn load_yaml_fixture() {
    let yaml = r#"
url: "https://landing.example.com/offer?userId=7"
title: Offer
elements:
  - tag: form
    attributes: { id: signup }
  - tag: input
    attributes: { type: email, name: email }
    value: a@b.com
    formId: signup
  - tag: button
    text: Send
    formId: signup
"#;
    let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    f.write_all(yaml.as_bytes()).unwrap();

    let doc = Document::load(f.path().to_str().unwrap()).unwrap();

    assert_eq!(doc.title, "Offer");
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.submit_control_of("signup").map(|id| id.0), Some(2));
    assert_eq!(doc.scope(ScopeKind::Form("signup".to_string())).len(), 2);
}

#[test]
fn load_json_fixture() {
    let json = r#"{
        "url": "https://landing.example.com/",
        "elements": [{ "tag": "a", "attributes": { "href": "/x" }, "text": "Go" }]
    }"#;
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(json.as_bytes()).unwrap();

    let doc = Document::load(f.path().to_str().unwrap()).unwrap();

    let (_, link) = doc.iter().next().unwrap();
    assert!(link.is_link());
    assert_eq!(link.attribute("href"), Some("/x"));
}

#[test]
fn load_rejects_bad_page_url() {
    let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    f.write_all(b"url: not a url\n").unwrap();

    let result = Document::load(f.path().to_str().unwrap());
    assert!(matches!(result, Err(TrackerError::Fixture(_))));
}

#[test]
fn load_missing_file_is_io_error() {
    let result = Document::load("definitely_missing_page.yaml");
    assert!(matches!(result, Err(TrackerError::Io(_))));
}

// ============================================================================
// Bootstrap
// ============================================================================

fn make_tracker() -> Tracker {
    let page = url(PAGE);
    let deps = TrackerDeps::new(
        InitializationContext::new(page.clone(), PageSettings::default()),
        Document::new(page, signup_form()),
        Arc::new(MockTrackerApi::new()),
        Arc::new(RecordingNavigator::new()),
    );
    Tracker::new(deps)
}

#[test]
fn init_guard_admits_one_caller() {
    let guard = InitGuard::new();
    assert!(!guard.is_started());
    assert!(guard.try_begin());
    assert!(!guard.try_begin());
    assert!(guard.is_started());
}

#[test]
fn bootstrap_initializes_once_across_signals() {
    let bootstrap = Bootstrap::new();
    let mut runs = 0;

    for signal in [
        ReadySignal::BodyPresent,
        ReadySignal::DomContentLoaded,
        ReadySignal::PollTimeout,
    ] {
        bootstrap.signal_ready(signal, || {
            runs += 1;
            make_tracker()
        });
    }

    assert_eq!(runs, 1);
    assert!(bootstrap.tracker().is_some());
}

#[test]
fn bootstrap_is_safe_across_threads() {
    let bootstrap = Arc::new(Bootstrap::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bootstrap = bootstrap.clone();
            std::thread::spawn(move || bootstrap.signal_ready(ReadySignal::BodyPoll, make_tracker))
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
}
