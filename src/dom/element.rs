use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;

/// Read view over a page node, enough for field identification.
///
/// Tag names and types are reported lowercase.
pub trait ElementHandle {
    fn attribute(&self, name: &str) -> Option<&str>;
    fn value(&self) -> &str;
    fn input_type(&self) -> String;
    fn tag_name(&self) -> &str;
}

impl<T: ElementHandle + ?Sized> ElementHandle for &T {
    fn attribute(&self, name: &str) -> Option<&str> {
        (**self).attribute(name)
    }

    fn value(&self) -> &str {
        (**self).value()
    }

    fn input_type(&self) -> String {
        (**self).input_type()
    }

    fn tag_name(&self) -> &str {
        (**self).tag_name()
    }
}

/// Index of an element in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Deserialize)]
pub struct DomElement {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub value: String,
    pub text: Option<String>,
    #[serde(rename = "formId")]
    pub form_id: Option<String>,
    #[serde(default)]
    disabled: AtomicBool,
}

impl Clone for DomElement {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            value: self.value.clone(),
            text: self.text.clone(),
            form_id: self.form_id.clone(),
            disabled: AtomicBool::new(self.is_disabled()),
        }
    }
}

impl DomElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: BTreeMap::new(),
            value: String::new(),
            text: None,
            form_id: None,
            disabled: AtomicBool::new(false),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn in_form(mut self, form_id: &str) -> Self {
        self.form_id = Some(form_id.to_string());
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Atomically claim the control: returns false if it was already disabled.
    pub fn try_disable(&self) -> bool {
        self.disabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_link(&self) -> bool {
        self.tag == "a"
    }

    pub fn is_button(&self) -> bool {
        self.tag == "button"
    }

    /// Whether clicking this element submits contact data.
    ///
    /// Inside a form the default button type counts; outside any form only an
    /// explicit `type="submit"` marks a page-wide submit control.
    pub fn is_submit_control(&self) -> bool {
        if !matches!(self.tag.as_str(), "input" | "button") {
            return false;
        }
        if self.form_id.is_some() {
            self.input_type() == "submit"
        } else {
            self.attribute("type")
                .map(|t| t.trim().eq_ignore_ascii_case("submit"))
                .unwrap_or(false)
        }
    }

    /// Short label for logs and traces.
    pub fn describe(&self) -> String {
        match (self.attribute("id"), self.attribute("name")) {
            (Some(id), _) => format!("{}#{}", self.tag, id),
            (None, Some(name)) => format!("{}[name={}]", self.tag, name),
            (None, None) => self.tag.clone(),
        }
    }
}

impl ElementHandle for DomElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn input_type(&self) -> String {
        if let Some(t) = self.attributes.get("type") {
            return t.trim().to_lowercase();
        }
        match self.tag.as_str() {
            "input" => "text".into(),
            "button" => "submit".into(),
            "textarea" => "textarea".into(),
            "select" => "select-one".into(),
            _ => String::new(),
        }
    }

    fn tag_name(&self) -> &str {
        &self.tag
    }
}
