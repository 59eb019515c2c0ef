use crate::dom::element::{DomElement, ElementHandle};

const MAX_DESCRIPTION_CHARS: usize = 100;

/// Human-readable label for a clicked link or button (`ctaLocation`).
pub fn describe_cta(element: &DomElement) -> String {
    let mut candidates = vec![
        element.attribute("data-description"),
        element.attribute("aria-label"),
        element.text.as_deref(),
    ];
    if element.is_button() {
        candidates.push(Some(element.value()));
        candidates.push(element.attribute("name"));
    }

    let description = candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(str::trim)
        .unwrap_or("");

    if description.is_empty() {
        return if element.is_link() {
            "Unnamed Link".to_string()
        } else {
            "Unnamed Button".to_string()
        };
    }

    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let head: String = description.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        return format!("{}...", head);
    }
    description.to_string()
}
