use funnel_tracker::{
    dom::element::DomElement,
    error::{RemoteError, ValidationError},
    flow::dispatch::{Dispatch, IgnoreReason, Outcome},
    flow::submission::{SubmissionOutcome, SubmissionState},
    page::context::PageSettings,
    remote::api::SubmissionResponse,
    testing::{MockTrackerApi, Reply},
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::fixtures::{Harness, PAGE, input, signup_form, text_input};

mod common;

async fn submission(dispatch: Dispatch) -> SubmissionOutcome {
    match dispatch.settle().await {
        Outcome::Submission(outcome) => outcome,
        other => panic!("expected submission outcome, got {:?}", other),
    }
}

fn next_page(url: &str) -> PageSettings {
    PageSettings {
        next_page: Some(url.to_string()),
        ..PageSettings::default()
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn click_submits_record_and_redirects_with_identity() {
    let h = Harness::with(
        PAGE,
        signup_form(),
        next_page("/thanks?userId=1&x=2"),
        MockTrackerApi::new(),
    );

    let dispatch = h.tracker.click(h.id("send"));
    assert!(dispatch.default_prevented);
    assert!(h.is_disabled("send"));

    let outcome = submission(dispatch).await;
    let SubmissionOutcome::Redirected { contact_id, target } = &outcome else {
        panic!("expected redirect, got {:?}", outcome);
    };
    assert_eq!(*contact_id, 42);
    assert_eq!(
        target.as_str(),
        "https://landing.example.com/thanks?userId=7&x=2&resourceId=11&contactId=42"
    );
    assert_eq!(outcome.state(), SubmissionState::RedirectPending);
    assert_eq!(h.nav.last_url().as_deref(), Some(target.as_str()));

    let sent = h.api.last_submission().unwrap();
    assert_eq!(
        sent.form_data,
        "firstName=Ada&lastName=Lovelace&email=ada%40example.com&phone=555-0100&campaign=0&contactTag=0"
    );
    assert_eq!(sent.sender_id, "7");
    assert_eq!(sent.resource_id, "11");
    assert_eq!(sent.sent_from, PAGE);

    // The page is leaving; the control stays locked.
    assert!(h.is_disabled("send"));
}

#[tokio::test]
async fn control_redirect_beats_page_setting() {
    let mut elements = signup_form();
    elements[5] = elements[5]
        .clone()
        .with_attr("data-redirect", "https://partner.example.org/welcome");
    let h = Harness::with(PAGE, elements, next_page("/thanks"), MockTrackerApi::new());

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(
        h.nav.last_url().as_deref(),
        Some("https://partner.example.org/welcome?userId=7&resourceId=11&contactId=42")
    );
    assert!(matches!(outcome, SubmissionOutcome::Redirected { .. }));
}

#[tokio::test]
async fn container_redirect_is_last_resort() {
    let mut elements = signup_form();
    elements.push(
        DomElement::new("div")
            .with_attr("id", "contactFormSubmitContainer")
            .with_attr("data-redirect", "done.html"),
    );
    let h = Harness::new(PAGE, elements);

    submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(
        h.nav.last_url().as_deref(),
        Some("https://landing.example.com/done.html?userId=7&resourceId=11&contactId=42")
    );
}

#[tokio::test]
async fn empty_redirect_values_are_skipped() {
    let mut elements = signup_form();
    elements[5] = elements[5].clone().with_attr("data-redirect", "  ");
    elements.push(
        DomElement::new("div")
            .with_attr("id", "contactFormSubmitContainer")
            .with_attr("data-redirect", "/fallback"),
    );
    let h = Harness::with(PAGE, elements, next_page(""), MockTrackerApi::new());

    submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(
        h.nav.last_url().as_deref(),
        Some("https://landing.example.com/fallback?userId=7&resourceId=11&contactId=42")
    );
}

#[tokio::test]
async fn no_redirect_target_stays_and_unlocks() {
    let h = Harness::new(PAGE, signup_form());

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert!(matches!(outcome, SubmissionOutcome::Stayed { contact_id: 42 }));
    assert_eq!(outcome.state(), SubmissionState::Idle);
    assert!(h.nav.visits().is_empty());
    assert!(!h.is_disabled("send"));
}

#[tokio::test]
async fn string_contact_id_is_accepted() {
    let api = MockTrackerApi::new().with_submission(Reply::Ok(SubmissionResponse {
        contact_id: Some(json!("77")),
    }));
    let h = Harness::with(PAGE, signup_form(), next_page("/thanks"), api);

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(outcome.contact_id(), Some(77));
    assert!(h.nav.last_url().unwrap().ends_with("contactId=77"));
}

// ============================================================================
// Failures unlock the control
// ============================================================================

#[tokio::test]
async fn network_failure_unlocks_without_redirect() {
    let api = MockTrackerApi::new().with_submission(Reply::Network);
    let h = Harness::with(PAGE, signup_form(), next_page("/thanks"), api);

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(RemoteError::Network { .. })
    ));
    assert!(h.nav.visits().is_empty());
    assert!(!h.is_disabled("send"));
}

#[tokio::test]
async fn http_error_unlocks_without_redirect() {
    let api = MockTrackerApi::new().with_submission(Reply::Http(500));
    let h = Harness::with(PAGE, signup_form(), next_page("/thanks"), api);

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(RemoteError::Http { status: 500, .. })
    ));
    assert!(!h.is_disabled("send"));
}

#[tokio::test]
async fn response_without_positive_contact_id_unlocks() {
    for body in [None, Some(json!(0)), Some(json!(-3)), Some(json!("abc"))] {
        let api = MockTrackerApi::new()
            .with_submission(Reply::Ok(SubmissionResponse { contact_id: body }));
        let h = Harness::with(PAGE, signup_form(), next_page("/thanks"), api);

        let outcome = submission(h.tracker.click(h.id("send"))).await;

        assert!(matches!(outcome, SubmissionOutcome::MissingContactId));
        assert!(h.nav.visits().is_empty());
        assert!(!h.is_disabled("send"));
    }
}

#[tokio::test]
async fn control_can_submit_again_after_failure() {
    let api = MockTrackerApi::new().with_submission(Reply::Parse);
    let h = Harness::with(PAGE, signup_form(), PageSettings::default(), api);

    submission(h.tracker.click(h.id("send"))).await;
    submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(h.api.submission_calls(), 2);
}

// ============================================================================
// In-flight lock
// ============================================================================

#[tokio::test]
async fn second_activation_while_in_flight_sends_nothing() {
    let api = MockTrackerApi::new().hold_submissions();
    let h = Harness::with(PAGE, signup_form(), next_page("/thanks"), api);

    let first = h.tracker.click(h.id("send")).detach();
    tokio::task::yield_now().await;

    let second = h.tracker.click(h.id("send"));
    assert!(!second.default_prevented);
    assert!(matches!(
        second.settle().await,
        Outcome::Ignored(IgnoreReason::Disabled)
    ));

    let native = h.tracker.submit_form("signup");
    assert!(native.default_prevented);
    assert!(matches!(
        submission(native).await,
        SubmissionOutcome::Locked
    ));

    h.api.release_submissions(1);
    let outcome = first.await.unwrap();

    assert!(matches!(
        outcome.submission(),
        Some(SubmissionOutcome::Redirected { .. })
    ));
    assert_eq!(h.api.submission_calls(), 1);
    assert_eq!(h.nav.visits().len(), 1);
}

// ============================================================================
// Halting before the network
// ============================================================================

#[tokio::test]
async fn untrackable_form_is_left_alone() {
    let elements = vec![
        DomElement::new("form").with_attr("id", "search"),
        text_input("q").in_form("search").with_value("shoes"),
        DomElement::new("button").with_attr("id", "go").in_form("search"),
    ];
    let h = Harness::new(PAGE, elements);

    let dispatch = h.tracker.click(h.id("go"));
    assert!(!dispatch.default_prevented);
    assert!(matches!(submission(dispatch).await, SubmissionOutcome::NotTrackable));

    let native = h.tracker.submit_form("search");
    assert!(!native.default_prevented);
    submission(native).await;

    assert_eq!(h.api.submission_calls(), 0);
    assert!(!h.is_disabled("go"));
}

#[tokio::test]
async fn invalid_email_rejected_before_locking() {
    let mut elements = signup_form();
    elements[3] = elements[3].clone().with_value("ada-at-example");
    let h = Harness::new(PAGE, elements);

    let dispatch = h.tracker.click(h.id("send"));
    assert!(!dispatch.default_prevented);
    let outcome = submission(dispatch).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::InvalidEmail(_))
    ));
    assert!(!h.is_disabled("send"));
    assert_eq!(h.api.submission_calls(), 0);
}

#[tokio::test]
async fn native_submit_of_invalid_form_is_still_intercepted() {
    let mut elements = signup_form();
    elements[3] = elements[3].clone().with_value("");
    elements[4] = elements[4].clone().with_value("");
    let h = Harness::new(PAGE, elements);

    let dispatch = h.tracker.submit_form("signup");
    assert!(dispatch.default_prevented);
    assert!(matches!(
        submission(dispatch).await,
        SubmissionOutcome::Rejected(ValidationError::MissingContact)
    ));
    assert_eq!(h.api.submission_calls(), 0);
}

#[tokio::test]
async fn missing_page_identity_stops_submission() {
    let h = Harness::new("https://landing.example.com/offer?userId=7", signup_form());

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::MissingPageIdentity("resourceId"))
    ));
    assert_eq!(h.api.submission_calls(), 0);
    assert!(!h.is_disabled("send"));
}

#[tokio::test]
async fn empty_user_id_counts_as_missing() {
    let h = Harness::new(
        "https://landing.example.com/offer?userId=&resourceId=11",
        signup_form(),
    );

    let outcome = submission(h.tracker.click(h.id("send"))).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::MissingPageIdentity("userId"))
    ));
}

// ============================================================================
// Scopes and triggers
// ============================================================================

#[tokio::test]
async fn native_submit_is_intercepted_and_locks_the_form_control() {
    let api = MockTrackerApi::new().hold_submissions();
    let h = Harness::with(PAGE, signup_form(), PageSettings::default(), api);

    let dispatch = h.tracker.submit_form("signup");
    assert!(dispatch.default_prevented);
    assert!(h.is_disabled("send"));

    h.api.release_submissions(1);
    let outcome = submission(dispatch).await;

    assert!(matches!(outcome, SubmissionOutcome::Stayed { .. }));
    assert!(!h.is_disabled("send"));
}

#[tokio::test]
async fn form_scope_ignores_fields_of_other_forms() {
    let mut elements = vec![
        DomElement::new("form").with_attr("id", "newsletter"),
        input("email")
            .with_attr("name", "email")
            .in_form("newsletter")
            .with_value("someone@else.com"),
    ];
    elements.extend(signup_form());
    let h = Harness::new(PAGE, elements);

    submission(h.tracker.click(h.id("send"))).await;

    let sent = h.api.last_submission().unwrap();
    assert!(sent.form_data.contains("email=ada%40example.com"));
    assert!(!sent.form_data.contains("someone"));
}

#[tokio::test]
async fn page_wide_submit_control_uses_document_scope() {
    let elements = vec![
        text_input("your-name").with_value("Alan Turing"),
        input("email").with_value("alan@example.com"),
        input("submit").with_attr("id", "go"),
    ];
    let h = Harness::new(PAGE, elements);

    let dispatch = h.tracker.click(h.id("go"));
    assert!(dispatch.default_prevented);
    submission(dispatch).await;

    let sent = h.api.last_submission().unwrap();
    assert_eq!(
        sent.form_data,
        "firstName=Alan&lastName=Turing&email=alan%40example.com&campaign=0&contactTag=0"
    );
}

#[tokio::test]
async fn local_file_page_reports_custom_page() {
    let h = Harness::with(
        "file:///srv/pages/offer.html?userId=7&resourceId=11",
        signup_form(),
        next_page("thanks.html"),
        MockTrackerApi::new(),
    );

    submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(h.api.last_submission().unwrap().sent_from, "customPage");
    assert_eq!(
        h.nav.last_url().as_deref(),
        Some("file:///srv/pages/thanks.html?userId=7&resourceId=11&contactId=42")
    );
}

#[tokio::test]
async fn nested_page_redirects_from_site_root() {
    let h = Harness::with(
        "https://landing.example.com/funnels/offer/step1?userId=7&resourceId=11",
        signup_form(),
        next_page("thanks"),
        MockTrackerApi::new(),
    );

    submission(h.tracker.click(h.id("send"))).await;

    assert_eq!(
        h.nav.last_url().as_deref(),
        Some("https://landing.example.com/thanks?userId=7&resourceId=11&contactId=42")
    );
}
