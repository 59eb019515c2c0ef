use serde::Deserialize;
use url::Url;

use crate::dom::element::{DomElement, ElementHandle, ElementId};
use crate::error::{Result, TrackerError};

/// A loaded page: its URL plus every element in document order.
#[derive(Debug)]
pub struct Document {
    pub url: Url,
    pub title: String,
    elements: Vec<DomElement>,
}

/// On-disk page description (YAML or JSON).
#[derive(Debug, Deserialize)]
pub struct PageFixture {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub elements: Vec<DomElement>,
}

/// Boundary searched by field identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Form(String),
    Document,
}

/// Ordered view of the elements inside one scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub ids: Vec<ElementId>,
}

impl Document {
    pub fn new(url: Url, elements: Vec<DomElement>) -> Self {
        let elements = elements.into_iter().map(normalize).collect();
        Self {
            url,
            title: String::new(),
            elements,
        }
    }

    pub fn from_fixture(fixture: PageFixture) -> Result<Self> {
        let url = Url::parse(&fixture.url)
            .map_err(|e| TrackerError::Fixture(format!("bad page url '{}': {}", fixture.url, e)))?;
        let mut doc = Self::new(url, fixture.elements);
        doc.title = fixture.title;
        Ok(doc)
    }

    /// Load a fixture file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture: PageFixture = if path.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| TrackerError::Fixture(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| TrackerError::Fixture(e.to_string()))?
        };
        Self::from_fixture(fixture)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&DomElement> {
        self.elements.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &DomElement)> {
        self.elements.iter().enumerate().map(|(i, el)| (ElementId(i), el))
    }

    /// First element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<(ElementId, &DomElement)> {
        self.iter().find(|(_, el)| el.attribute("id") == Some(id))
    }

    pub fn scope(&self, kind: ScopeKind) -> Scope {
        let ids = match &kind {
            ScopeKind::Form(form_id) => self
                .iter()
                .filter(|(_, el)| el.form_id.as_deref() == Some(form_id.as_str()))
                .map(|(id, _)| id)
                .collect(),
            ScopeKind::Document => self.iter().map(|(id, _)| id).collect(),
        };
        Scope { kind, ids }
    }

    /// Scope searched when `control` triggers a submission.
    pub fn scope_for_control(&self, control: &DomElement) -> Scope {
        match &control.form_id {
            Some(form_id) => self.scope(ScopeKind::Form(form_id.clone())),
            None => self.scope(ScopeKind::Document),
        }
    }

    /// Resolve scope ids to elements, preserving order.
    pub fn resolve(&self, scope: &Scope) -> Vec<&DomElement> {
        scope.ids.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// First submit-typed element of a form, used as the lock for native submits.
    pub fn submit_control_of(&self, form_id: &str) -> Option<ElementId> {
        self.iter()
            .find(|(_, el)| {
                el.form_id.as_deref() == Some(form_id) && el.input_type() == "submit"
            })
            .map(|(id, _)| id)
    }
}

fn normalize(mut el: DomElement) -> DomElement {
    el.tag = el.tag.to_lowercase();
    el.attributes = el
        .attributes
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect();
    el
}

impl Scope {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn label(&self) -> String {
        match &self.kind {
            ScopeKind::Form(id) => format!("form:{}", id),
            ScopeKind::Document => "document".to_string(),
        }
    }
}
