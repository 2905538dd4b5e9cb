//! Binding map: runtime data substituted into a template at render time.
//!
//! Bindings fill three things:
//! - whole-content replacement through an element's `variableName`
//! - `{{key}}` placeholders inside literal content
//! - dynamic color slots keyed `"<variableName or id>_<attr>"`

use std::collections::BTreeMap;

use carousel_core::{ColorSlot, Element};
use serde::{Deserialize, Serialize};

/// Flat key to string map supplied with a render request.
///
/// Non-string JSON values are stringified on load (`null` becomes empty),
/// so callers may pass numbers and booleans directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Map<String, serde_json::Value>")]
pub struct Bindings(BTreeMap<String, String>);

impl From<serde_json::Map<String, serde_json::Value>> for Bindings {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(key, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key, text)
                })
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Bindings {
    /// Empty binding map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve an element's content (text or image URL).
    ///
    /// A present `variableName` binding replaces the content verbatim;
    /// otherwise `{{key}}` placeholders are filled in.
    #[must_use]
    pub fn resolve_content(&self, element: &Element) -> String {
        if let Some(value) = element
            .variable_name
            .as_deref()
            .and_then(|name| self.get(name))
        {
            return value.to_string();
        }
        self.apply_placeholders(element.content().unwrap_or_default())
    }

    /// Replace every `{{key}}` token with its bound value.
    ///
    /// Keys are trimmed. Unbound keys resolve to the empty string. A `{{`
    /// without a closing `}}` on the same line is left as literal text.
    #[must_use]
    pub fn apply_placeholders(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .filter(|&end| !after_open[..end].contains('\n'));
            match close {
                Some(end) => {
                    let key = after_open[..end].trim();
                    if let Some(value) = self.get(key) {
                        out.push_str(value);
                    } else {
                        tracing::debug!("Unbound placeholder {{{{{key}}}}} left empty");
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after_open;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Key under which a dynamic override for `slot` is looked up.
    #[must_use]
    pub fn dynamic_key(element: &Element, slot: ColorSlot) -> String {
        format!("{}_{}", element.binding_prefix(), slot.attr())
    }

    /// Runtime override for a color slot, if the slot is flagged dynamic and
    /// a value is bound.
    #[must_use]
    pub fn dynamic_color(&self, element: &Element, slot: ColorSlot) -> Option<&str> {
        if !element.kind.dynamic_slots().contains(&slot) {
            return None;
        }
        self.get(&Self::dynamic_key(element, slot))
    }
}
