//! Persisted template document, as stored by the template store and accepted
//! by ad-hoc render requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Element, Scene, SceneError, SceneResult};

/// Raster format requested in the export settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Let the renderer choose (PNG).
    #[default]
    Automatic,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ImageFormat {
    /// Concrete format after resolving `automatic`.
    #[must_use]
    pub const fn resolved(self) -> Self {
        match self {
            Self::Automatic | Self::Png => Self::Png,
            Self::Jpeg => Self::Jpeg,
        }
    }

    /// File extension of the resolved format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self.resolved() {
            Self::Jpeg => "jpeg",
            Self::Automatic | Self::Png => "png",
        }
    }

    /// MIME type of the resolved format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self.resolved() {
            Self::Jpeg => "image/jpeg",
            Self::Automatic | Self::Png => "image/png",
        }
    }
}

/// Output color model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Screen colors.
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    /// Print colors (beta).
    #[serde(rename = "CMYK")]
    Cmyk,
}

/// PDF export quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfQuality {
    /// High quality (default).
    #[default]
    High,
    /// Standard quality.
    Standard,
}

/// Export settings persisted with each template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct ExportSettings {
    pub image_format: ImageFormat,
    pub image_dpi: u32,
    pub image_color_mode: ColorMode,
    pub pdf_quality: PdfQuality,
    pub pdf_dpi: u32,
    pub pdf_color_mode: ColorMode,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            image_format: ImageFormat::Automatic,
            image_dpi: 72,
            image_color_mode: ColorMode::Rgb,
            pdf_quality: PdfQuality::High,
            pdf_dpi: 96,
            pdf_color_mode: ColorMode::Rgb,
        }
    }
}

/// Canonical template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    /// Template identifier.
    #[serde(default = "TemplateDocument::fresh_id")]
    pub id: String,
    /// Display name.
    #[serde(default = "TemplateDocument::default_name")]
    pub name: String,
    /// Canvas width in pixels.
    #[serde(default)]
    pub width: f32,
    /// Canvas height in pixels.
    #[serde(default)]
    pub height: f32,
    /// Elements in paint order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Export settings.
    #[serde(default)]
    pub export_settings: ExportSettings,
    /// Last modification time, as stamped by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Containing folder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl TemplateDocument {
    fn fresh_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn default_name() -> String {
        "Untitled".to_string()
    }

    /// Build a document from a runtime scene.
    #[must_use]
    pub fn from_scene(id: impl Into<String>, name: impl Into<String>, scene: &Scene) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width: scene.width,
            height: scene.height,
            elements: scene.elements().to_vec(),
            export_settings: ExportSettings::default(),
            updated_at: None,
            folder_id: None,
        }
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a template.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(SceneError::Serialization)
    }

    /// Check that the document can be rendered: positive, finite canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidTemplate`] when width or height is missing.
    pub fn validate(&self) -> SceneResult<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(SceneError::InvalidTemplate(
                "Template must have width and height properties".to_string(),
            ))
        }
    }

    /// Materialize the runtime scene.
    #[must_use]
    pub fn to_scene(&self) -> Scene {
        Scene::with_elements(self.width, self.height, self.elements.clone())
    }

    /// Whether `id` is safe to use as a storage key (no path traversal).
    #[must_use]
    pub fn is_safe_id(id: &str) -> bool {
        !id.is_empty() && !id.contains("..") && !id.contains('/') && !id.contains('\\')
    }
}
