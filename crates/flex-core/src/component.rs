//! Template components and their persisted record form.
//!
//! A [`Component`] is one fragment of a rendered line: a template string plus
//! the id of the handler that supplies the value substituted for the
//! placeholder. Components are immutable; a slot's list is replaced wholesale
//! on reload.
//!
//! On disk a component list is a JSON array of records:
//!
//! ```json
//! [
//!   { "handler": "flex:name-colored", "template": "[coral][[%VALUE%[coral]]:[white] " },
//!   { "handler": "flex:message", "template": "%VALUE%" }
//! ]
//! ```
//!
//! [`decode_components`] parses that shape into typed records and validates
//! them one by one, so a bad file is rejected with the offending index rather
//! than a generic parse failure.

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};

/// Placeholder token used when the configuration does not name another one.
pub const DEFAULT_PLACEHOLDER: &str = "%VALUE%";

/// One template fragment bound to the handler that supplies its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    handler: String,
    template: String,
}

impl Component {
    /// Creates a component from trusted input (built-in defaults, tests).
    ///
    /// Untrusted input goes through [`decode_components`], which validates.
    pub fn new(handler: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            template: template.into(),
        }
    }

    /// The handler id resolved at render time.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// The raw template, placeholder included.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes `value` for every occurrence of `placeholder`.
    pub fn apply(&self, placeholder: &str, value: &str) -> String {
        if placeholder.is_empty() {
            return self.template.clone();
        }
        self.template.replace(placeholder, value)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {:?}", self.handler, self.template)
    }
}

/// Wire shape of a single persisted component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentRecord {
    /// Handler id.
    pub handler: String,
    /// Template string.
    pub template: String,
}

impl From<&Component> for ComponentRecord {
    fn from(component: &Component) -> Self {
        Self {
            handler: component.handler.clone(),
            template: component.template.clone(),
        }
    }
}

impl ComponentRecord {
    /// Validates this record and turns it into a [`Component`].
    ///
    /// `index` is only used for error reporting.
    pub fn into_component(self, index: usize, placeholder: &str) -> RecordResult<Component> {
        if self.handler.trim().is_empty() {
            return Err(RecordError::EmptyHandler { index });
        }
        if !placeholder.is_empty() {
            let count = self.template.matches(placeholder).count();
            if count > 1 {
                return Err(RecordError::TooManyPlaceholders {
                    index,
                    placeholder: placeholder.to_string(),
                    count,
                });
            }
        }
        Ok(Component {
            handler: self.handler,
            template: self.template,
        })
    }
}

/// Decodes a persisted component list, validating every record.
pub fn decode_components(source: &str, placeholder: &str) -> RecordResult<Vec<Component>> {
    let records: Vec<ComponentRecord> = serde_json::from_str(source)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_component(index, placeholder))
        .collect()
}

/// Encodes a component list in its persisted, pretty-printed form.
pub fn encode_components(components: &[Component]) -> serde_json::Result<String> {
    let records: Vec<ComponentRecord> = components.iter().map(ComponentRecord::from).collect();
    serde_json::to_string_pretty(&records)
}
