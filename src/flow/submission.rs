use futures::FutureExt;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::contact::record::{ContactDefaults, build};
use crate::dom::document::{Scope, ScopeKind};
use crate::dom::element::ElementId;
use crate::error::{RemoteError, ValidationError};
use crate::fields::identify::identify;
use crate::flow::dispatch::{Dispatch, IgnoreReason, Outcome, TrackerDeps};
use crate::flow::redirect::{submission_target, with_identity};
use crate::remote::api::ContactSubmission;
use crate::trace::trace::TraceEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    RedirectPending,
}

/// What started a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// Click on a submit control; suppression waits until `Submitting`.
    ControlClick(ElementId),
    /// Native submit of a form; intercepted once the form is trackable.
    FormSubmit(String),
}

impl SubmitTrigger {
    fn label(&self) -> &'static str {
        match self {
            SubmitTrigger::ControlClick(_) => "submit_click",
            SubmitTrigger::FormSubmit(_) => "form_submit",
        }
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Control already disabled by an attempt in flight.
    Locked,
    NotTrackable,
    Rejected(ValidationError),
    Failed(RemoteError),
    /// Submission succeeded but carried no positive contact id.
    MissingContactId,
    /// Contact created, no redirect target resolved.
    Stayed { contact_id: u64 },
    Redirected { contact_id: u64, target: Url },
}

impl SubmissionOutcome {
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionOutcome::Redirected { .. } => SubmissionState::RedirectPending,
            _ => SubmissionState::Idle,
        }
    }

    pub fn contact_id(&self) -> Option<u64> {
        match self {
            SubmissionOutcome::Stayed { contact_id }
            | SubmissionOutcome::Redirected { contact_id, .. } => Some(*contact_id),
            _ => None,
        }
    }
}

/// Validates, locks the triggering control, submits, then redirects or unlocks.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    deps: TrackerDeps,
}

impl SubmissionOrchestrator {
    pub fn new(deps: TrackerDeps) -> Self {
        Self { deps }
    }

    pub fn dispatch(&self, trigger: SubmitTrigger) -> Dispatch {
        let doc = &self.deps.document;
        let intercept_early = matches!(trigger, SubmitTrigger::FormSubmit(_));

        let (control, scope) = match &trigger {
            SubmitTrigger::ControlClick(id) => match doc.get(*id) {
                Some(el) => (Some(*id), doc.scope_for_control(el)),
                None => return Dispatch::ignored(IgnoreReason::UnknownElement),
            },
            SubmitTrigger::FormSubmit(form_id) => (
                doc.submit_control_of(form_id),
                doc.scope(ScopeKind::Form(form_id.clone())),
            ),
        };
        let control_el = control.and_then(|id| doc.get(id));

        let mut trace = TraceEvent::now(trigger.label());
        if let Some(el) = control_el {
            trace = trace.with_element(el);
        }

        if control_el.is_some_and(|el| el.is_disabled()) {
            debug!(trigger = trigger.label(), "control locked by attempt in flight");
            return self.finish_early(trace, intercept_early, SubmissionOutcome::Locked);
        }

        // ---- Idle → Validating ----
        let elements = doc.resolve(&scope);
        trace = trace
            .with_scope(scope.label(), &elements)
            .with_state(SubmissionState::Validating);

        let roles = match identify(&elements) {
            Ok(roles) => roles,
            Err(e) => {
                warn!(scope = %scope.label(), "{}", e);
                return self.finish_early(trace, false, SubmissionOutcome::NotTrackable);
            }
        };
        trace = trace.with_roles(&roles);

        let defaults = ContactDefaults::from(&self.deps.ctx.settings);
        let record = build(&roles, &elements, defaults);
        if let Err(e) = record.validate() {
            warn!(scope = %scope.label(), "submission stopped: {}", e);
            return self.finish_early(trace, intercept_early, SubmissionOutcome::Rejected(e));
        }

        let page = &self.deps.ctx.page;
        let (Some(sender_id), Some(resource_id)) = (page.sender_id(), page.resource_id()) else {
            let missing = if page.sender_id().is_none() { "userId" } else { "resourceId" };
            error!(missing, "cannot submit contact without page identity");
            return self.finish_early(
                trace,
                intercept_early,
                SubmissionOutcome::Rejected(ValidationError::MissingPageIdentity(missing)),
            );
        };

        // ---- Validating → Submitting ----
        if let Some(el) = control_el {
            if !el.try_disable() {
                return self.finish_early(trace, intercept_early, SubmissionOutcome::Locked);
            }
        }
        info!(scope = %scope.label(), fields = ?record.keys(), "submitting contact");
        self.deps
            .tracer
            .log(&trace.with_state(SubmissionState::Submitting).with_decision("submit"));

        let submission = ContactSubmission {
            form_data: record.to_form_data(),
            resource_id: resource_id.to_string(),
            sender_id: sender_id.to_string(),
            sent_from: self.deps.ctx.sent_from(),
        };
        let this = self.clone();
        let task = async move {
            let outcome = this.submit(control, scope, submission).await;
            Outcome::Submission(outcome)
        };
        Dispatch::new(true, task.boxed())
    }

    fn finish_early(
        &self,
        trace: TraceEvent,
        default_prevented: bool,
        outcome: SubmissionOutcome,
    ) -> Dispatch {
        self.deps.tracer.log(
            &trace
                .with_state(outcome.state())
                .with_decision("halt")
                .with_outcome(&outcome),
        );
        Dispatch::settled(default_prevented, Outcome::Submission(outcome))
    }

    async fn submit(
        &self,
        control: Option<ElementId>,
        scope: Scope,
        submission: ContactSubmission,
    ) -> SubmissionOutcome {
        let outcome = match self.deps.api.create_contact(&submission).await {
            Err(e) => {
                error!(error = %e, "contact submission failed");
                SubmissionOutcome::Failed(e)
            }
            Ok(response) => match response.positive_contact_id() {
                None => {
                    error!(
                        response = ?response.contact_id,
                        "submission returned no valid contactId"
                    );
                    SubmissionOutcome::MissingContactId
                }
                Some(contact_id) => self.redirect_after(control, &submission, contact_id),
            },
        };

        // ---- Submitting → Idle: unlock ----
        if outcome.state() == SubmissionState::Idle {
            if let Some(el) = control.and_then(|id| self.deps.document.get(id)) {
                debug!(control = %el.describe(), "re-enabling control");
                el.set_disabled(false);
            }
        }

        self.deps.tracer.log(
            &TraceEvent::now("submission_settled")
                .with_scope(scope.label(), &self.deps.document.resolve(&scope))
                .with_state(outcome.state())
                .with_outcome(&outcome),
        );
        outcome
    }

    fn redirect_after(
        &self,
        control: Option<ElementId>,
        submission: &ContactSubmission,
        contact_id: u64,
    ) -> SubmissionOutcome {
        let doc = &self.deps.document;
        let control_el = control.and_then(|id| doc.get(id));

        let Some((source, target)) = submission_target(control_el, &self.deps.ctx.settings, doc)
        else {
            info!(contact_id, "contact created, no redirect configured");
            return SubmissionOutcome::Stayed { contact_id };
        };

        match with_identity(
            &self.deps.ctx.page_url,
            &target,
            &submission.sender_id,
            &submission.resource_id,
            contact_id,
        ) {
            Ok(url) => {
                info!(contact_id, ?source, url = %url, "redirecting after submission");
                self.deps.navigator.navigate(url.as_str());
                SubmissionOutcome::Redirected {
                    contact_id,
                    target: url,
                }
            }
            Err(e) => {
                error!(redirect = %target, error = %e, "could not build redirect URL");
                SubmissionOutcome::Stayed { contact_id }
            }
        }
    }
}
