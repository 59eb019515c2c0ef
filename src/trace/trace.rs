use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dom::element::{DomElement, ElementHandle};
use crate::fields::patterns::MATCH_ATTRIBUTES;
use crate::fields::role::RoleAssignment;

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,

    pub trigger: String,
    pub element: Option<String>,

    pub scope: Option<String>,
    pub scope_fingerprint: Option<String>,
    pub roles: Vec<String>,

    pub state: Option<String>,
    pub decision: Option<String>,
    pub outcome: Option<String>,
}

impl TraceEvent {
    pub fn now(trigger: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            trigger: trigger.to_string(),
            element: None,
            scope: None,
            scope_fingerprint: None,
            roles: vec![],
            state: None,
            decision: None,
            outcome: None,
        }
    }

    pub fn with_element(mut self, element: &DomElement) -> Self {
        self.element = Some(element.describe());
        self
    }

    /// Record the scope label plus a fingerprint of its markup.
    pub fn with_scope(mut self, label: impl ToString, elements: &[&DomElement]) -> Self {
        self.scope = Some(label.to_string());
        self.scope_fingerprint = Some(scope_fingerprint(elements));
        self
    }

    pub fn with_roles(mut self, roles: &RoleAssignment) -> Self {
        self.roles = roles.role_names();
        self
    }

    pub fn with_state(mut self, state: impl std::fmt::Debug) -> Self {
        self.state = Some(format!("{:?}", state));
        self
    }

    pub fn with_decision(mut self, decision: impl ToString) -> Self {
        self.decision = Some(decision.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl std::fmt::Debug) -> Self {
        self.outcome = Some(format!("{:?}", outcome));
        self
    }
}

/// SHA-1 over the identifying attributes of every element in a scope.
///
/// Same markup gives the same fingerprint, so repeated passes over one form
/// can be correlated in the trace.
pub fn scope_fingerprint(elements: &[&DomElement]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    for el in elements {
        hasher.update(el.tag_name().as_bytes());
        hasher.update(b"|");
        hasher.update(el.input_type().as_bytes());
        for attr in MATCH_ATTRIBUTES {
            hasher.update(b"|");
            hasher.update(el.attribute(attr).unwrap_or("").as_bytes());
        }
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
