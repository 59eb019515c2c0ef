use tracing::{debug, trace};

use crate::dom::element::ElementHandle;
use crate::error::NotTrackable;
use crate::fields::patterns::{ELIGIBLE_TYPES, MATCH_ATTRIBUTES, patterns_for};
use crate::fields::role::{Role, RoleAssignment};

/// Assign contact roles to the elements of one scope.
///
/// `elements` must be in document order. Positions in the returned
/// assignment index into `elements`. Each element is claimed by at most one
/// role. Fails with [`NotTrackable`] when neither email nor phone resolved.
pub fn identify<E: ElementHandle>(elements: &[E]) -> Result<RoleAssignment, NotTrackable> {
    let mut roles = RoleAssignment::default();
    let mut claimed = vec![false; elements.len()];

    // ---- Type phase ----
    for (role, wanted) in [(Role::Email, "email"), (Role::Phone, "tel")] {
        if let Some(pos) = elements.iter().position(|el| el.input_type() == wanted) {
            trace!(role = role.as_str(), position = pos, "matched by type");
            roles.set(role, pos);
            claimed[pos] = true;
        }
    }

    // ---- Pattern phase ----
    for role in Role::ALL {
        let typed = matches!(role, Role::Email | Role::Phone);
        if roles.is_resolved(role) && !typed {
            continue;
        }

        if let Some((pos, attr)) = match_pattern(role, elements, &claimed) {
            debug!(
                role = role.as_str(),
                position = pos,
                attribute = attr,
                "matched by pattern"
            );
            roles.set(role, pos);
            claimed[pos] = true;
        }
    }

    if !roles.is_trackable() {
        debug!(candidates = elements.len(), "no email or phone field in scope");
        return Err(NotTrackable);
    }

    Ok(roles)
}

/// First (pattern, element, attribute) hit for `role` among unclaimed elements.
fn match_pattern<E: ElementHandle>(
    role: Role,
    elements: &[E],
    claimed: &[bool],
) -> Option<(usize, &'static str)> {
    for regex in patterns_for(role) {
        for (pos, el) in elements.iter().enumerate() {
            if claimed[pos] || !is_eligible(el) {
                continue;
            }
            for attr in MATCH_ATTRIBUTES {
                if el.attribute(attr).is_some_and(|v| regex.is_match(v)) {
                    return Some((pos, attr));
                }
            }
        }
    }
    None
}

fn is_eligible<E: ElementHandle>(el: &E) -> bool {
    let kind = el.input_type();
    ELIGIBLE_TYPES.contains(&kind.as_str()) || el.tag_name() == "textarea"
}
