//! Font catalog: CSS font stacks and web font stylesheet links.

use std::collections::HashSet;
use std::path::Path;

use carousel_core::{Element, ElementKind};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Family used when an element does not name one.
pub const DEFAULT_FAMILY: &str = "Inter";

const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css2";

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontEntry {
    /// Family name as stored on elements.
    pub value: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Generic fallback family.
    #[serde(default = "default_fallback")]
    pub fallback: String,
    /// Google Fonts `family=` parameter; system fonts have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
}

fn default_fallback() -> String {
    "sans-serif".to_string()
}

impl FontEntry {
    fn google(value: &str, fallback: &str, google_id: &str) -> Self {
        Self {
            value: value.to_string(),
            label: None,
            fallback: fallback.to_string(),
            google_id: Some(google_id.to_string()),
        }
    }
}

/// Known font families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontCatalog {
    entries: Vec<FontEntry>,
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontCatalog {
    /// Catalog from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<FontEntry>) -> Self {
        Self { entries }
    }

    /// The families offered by the editor out of the box.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            FontEntry::google("Inter", "sans-serif", "Inter:wght@400;500;600;700"),
            FontEntry::google("Roboto", "sans-serif", "Roboto:wght@400;500;700"),
            FontEntry::google("Open Sans", "sans-serif", "Open+Sans:wght@400;600;700"),
            FontEntry::google("Montserrat", "sans-serif", "Montserrat:wght@400;600;700;800"),
            FontEntry::google("Poppins", "sans-serif", "Poppins:wght@400;500;600;700"),
            FontEntry::google("Lato", "sans-serif", "Lato:wght@400;700"),
            FontEntry::google("Oswald", "sans-serif", "Oswald:wght@400;600;700"),
            FontEntry::google("Bebas Neue", "sans-serif", "Bebas+Neue"),
            FontEntry::google("Playfair Display", "serif", "Playfair+Display:wght@400;700"),
            FontEntry::google("Merriweather", "serif", "Merriweather:wght@400;700"),
            FontEntry {
                value: "Georgia".to_string(),
                label: None,
                fallback: "serif".to_string(),
                google_id: None,
            },
        ])
    }

    /// Parse a catalog from a JSON array of entries.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::FontCatalog`] if the JSON is not a valid catalog.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::FontCatalog(e.to_string()))
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> RenderResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&json)?;
        tracing::debug!(
            "Loaded {} font families from {}",
            catalog.entries.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Look up a family.
    #[must_use]
    pub fn get(&self, family: &str) -> Option<&FontEntry> {
        self.entries.iter().find(|entry| entry.value == family)
    }

    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }

    /// CSS `font-family` value for a family.
    #[must_use]
    pub fn font_stack(&self, family: Option<&str>) -> String {
        match family.map(str::trim).filter(|f| !f.is_empty()) {
            Some(family) => match self.get(family) {
                Some(entry) => format!("'{}', {}", entry.value, entry.fallback),
                None => format!("'{family}', sans-serif"),
            },
            None => format!("'{DEFAULT_FAMILY}', sans-serif"),
        }
    }

    /// Stylesheet URL that provides a family.
    ///
    /// Catalog fonts without a Google id are system fonts and need none.
    /// Unknown families get a synthesized Google Fonts request for the
    /// regular and bold weights.
    #[must_use]
    pub fn import_url(&self, family: &str) -> Option<String> {
        let family = family.trim();
        if family.is_empty() {
            return None;
        }
        let google_id = match self.get(family) {
            Some(entry) => entry.google_id.clone()?,
            None => format!("{}:wght@400;700", family.replace(' ', "+")),
        };
        Some(format!("{GOOGLE_FONTS_CSS}?family={google_id}&display=swap"))
    }

    /// Stylesheet links for every family used by visible text elements,
    /// deduplicated in first-use order.
    #[must_use]
    pub fn font_links<'a>(&self, elements: impl IntoIterator<Item = &'a Element>) -> Vec<String> {
        let mut seen = HashSet::new();
        elements
            .into_iter()
            .filter(|element| element.visible)
            .filter_map(|element| match &element.kind {
                ElementKind::Text(style) => style.font_family.as_deref(),
                _ => None,
            })
            .filter(|family| seen.insert(*family))
            .filter_map(|family| self.import_url(family))
            .collect()
    }
}
