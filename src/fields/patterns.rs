use std::sync::LazyLock;

use regex::Regex;

use crate::fields::role::Role;

/// Attributes inspected, in order, for every candidate element.
pub const MATCH_ATTRIBUTES: [&str; 5] = ["id", "name", "class", "placeholder", "aria-label"];

/// Element types eligible for the pattern phase (plus multi-line fields).
pub const ELIGIBLE_TYPES: [&str; 4] = ["text", "email", "tel", "hidden"];

static FIRST_NAME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"first.?name",
        r"fname",
        r"first_name",
        r"first-name",
        r"firstname",
    ])
});

static LAST_NAME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"last.?name",
        r"lname",
        r"surname",
        r"last_name",
        r"last-name",
    ])
});

static COMBINED_NAME: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"^name$", r"full.?name", r"your.?name"]));

static EMAIL: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(&[r"e.?mail"]));

static PHONE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"phone", r"mobile", r"contact.?number"]));

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|s| Regex::new(&format!("(?i){}", s)).expect("static field pattern"))
        .collect()
}

/// Ordered pattern list for a role; earlier patterns win.
pub fn patterns_for(role: Role) -> &'static [Regex] {
    match role {
        Role::FirstName => &FIRST_NAME,
        Role::LastName => &LAST_NAME,
        Role::CombinedName => &COMBINED_NAME,
        Role::Email => &EMAIL,
        Role::Phone => &PHONE,
    }
}
