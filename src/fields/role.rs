use serde::Serialize;

use crate::dom::element::ElementHandle;

/// Semantic meaning assigned to a contact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    FirstName,
    LastName,
    CombinedName,
    Email,
    Phone,
}

impl Role {
    /// Fixed resolution order of the pattern phase.
    pub const ALL: [Role; 5] = [
        Role::FirstName,
        Role::LastName,
        Role::CombinedName,
        Role::Email,
        Role::Phone,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::FirstName => "firstName",
            Role::LastName => "lastName",
            Role::CombinedName => "combinedName",
            Role::Email => "email",
            Role::Phone => "phone",
        }
    }
}

/// Role → position in the scope the assignment was computed over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    slots: [Option<usize>; 5],
}

impl RoleAssignment {
    pub fn get(&self, role: Role) -> Option<usize> {
        self.slots[role.slot()]
    }

    pub fn set(&mut self, role: Role, position: usize) {
        self.slots[role.slot()] = Some(position);
    }

    pub fn is_resolved(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    /// At least one of email/phone resolved.
    pub fn is_trackable(&self) -> bool {
        self.is_resolved(Role::Email) || self.is_resolved(Role::Phone)
    }

    pub fn resolved(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        Role::ALL
            .iter()
            .filter_map(|r| self.get(*r).map(|p| (*r, p)))
    }

    /// Trimmed value of the element bound to `role`.
    pub fn value_of<'a, E: ElementHandle>(&self, role: Role, elements: &'a [E]) -> Option<&'a str> {
        self.get(role)
            .and_then(|p| elements.get(p))
            .map(|el| el.value().trim())
    }

    /// Resolved role names, in resolution order.
    pub fn role_names(&self) -> Vec<String> {
        self.resolved().map(|(r, _)| r.as_str().to_string()).collect()
    }
}
