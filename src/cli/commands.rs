use std::sync::Arc;

use crate::contact::record::{ContactDefaults, build};
use crate::dom::document::{Document, ScopeKind};
use crate::dom::element::ElementId;
use crate::fields::identify::identify;
use crate::fields::role::Role;
use crate::flow::dispatch::{Dispatch, Outcome, TrackerDeps};
use crate::flow::redirect::LoggingNavigator;
use crate::page::context::{Endpoints, InitializationContext, PageSettings};
use crate::remote::http::HttpTrackerApi;
use crate::trace::logger::TraceLogger;
use crate::tracker::tracker::Tracker;
use crate::video::telemetry::VideoInfo;

// ============================================================================
// identify / record subcommands
// ============================================================================

fn scope_kind(form: Option<&str>) -> ScopeKind {
    match form {
        Some(id) => ScopeKind::Form(id.to_string()),
        None => ScopeKind::Document,
    }
}

pub fn cmd_identify(page: &str, form: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::load(page)?;
    let scope = doc.scope(scope_kind(form));
    let elements = doc.resolve(&scope);

    let roles = identify(&elements)?;

    println!("Scope {} ({} elements):", scope.label(), scope.len());
    for role in Role::ALL {
        let bound = roles
            .get(role)
            .and_then(|p| elements.get(p))
            .map(|el| el.describe())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<13} {}", role.as_str(), bound);
    }
    Ok(())
}

pub fn cmd_record(
    page: &str,
    form: Option<&str>,
    settings: &PageSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Document::load(page)?;
    let scope = doc.scope(scope_kind(form));
    let elements = doc.resolve(&scope);

    let roles = identify(&elements)?;
    let record = build(&roles, &elements, ContactDefaults::from(settings));
    record.validate()?;

    println!("{}", record.to_form_data());
    Ok(())
}

// ============================================================================
// click / submit / play subcommands
// ============================================================================

/// Wire a tracker over HTTP endpoints and a log-only navigator.
pub fn build_tracker(
    page: &str,
    settings: PageSettings,
    endpoints: Endpoints,
    trace: Option<&str>,
) -> Result<Tracker, Box<dyn std::error::Error>> {
    let doc = Document::load(page)?;
    let ctx = InitializationContext::new(doc.url.clone(), settings);
    let api = Arc::new(HttpTrackerApi::new(endpoints));

    let mut deps = TrackerDeps::new(ctx, doc, api, Arc::new(LoggingNavigator));
    if let Some(path) = trace {
        deps = deps.with_tracer(TraceLogger::new(path));
    }
    Ok(Tracker::new(deps))
}

pub async fn cmd_click(
    tracker: &Tracker,
    element: Option<&str>,
    index: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = &tracker.deps().document;
    let id = match (element, index) {
        (Some(name), _) => doc
            .find_by_id(name)
            .map(|(id, _)| id)
            .ok_or_else(|| format!("no element with id '{}'", name))?,
        (None, Some(i)) => ElementId(i),
        (None, None) => return Err("pass --element or --index".into()),
    };

    report(tracker.click(id)).await;
    Ok(())
}

pub async fn cmd_submit(tracker: &Tracker, form: &str) -> Result<(), Box<dyn std::error::Error>> {
    report(tracker.submit_form(form)).await;
    Ok(())
}

pub async fn cmd_play(
    tracker: &Tracker,
    video: VideoInfo,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = tracker.video_play(&video).await;
    println!("Video play: {:?}", outcome);
    Ok(())
}

async fn report(dispatch: Dispatch) {
    println!("Default prevented: {}", dispatch.default_prevented);
    match dispatch.settle().await {
        Outcome::Ignored(reason) => println!("Ignored: {:?}", reason),
        Outcome::Submission(outcome) => {
            println!("Submission: {:?} (state {:?})", outcome, outcome.state())
        }
        Outcome::Notification(outcome) => println!(
            "Notification sent: {}, redirect: {}",
            outcome.notified,
            outcome.redirected_to.as_deref().unwrap_or("-")
        ),
    }
}
