//! # Carousel CLI
//!
//! Command line front end: render a template with a data file to a static
//! HTML document, optionally rasterize it through a headless browser, or
//! probe the auto-fit sizer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use carousel_core::TemplateDocument;
use carousel_renderer::{
    Bindings, FontCatalog, RasterConfig, RenderError, RenderResult, SceneRef,
    TemplateSource, WrapStyle,
};
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for carousel.
#[derive(Debug, Clone, Parser)]
#[command(name = "carousel")]
#[command(about = "Render Carousel templates with runtime data")]
#[command(version)]
pub struct CliArgs {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a template to HTML and optionally to an image.
    Render(RenderArgs),
    /// Print the auto-fit font size for a text and box.
    Fit(FitArgs),
}

/// Arguments of `carousel render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Template JSON file.
    #[arg(long, conflicts_with = "template_id", required_unless_present = "template_id")]
    pub template: Option<PathBuf>,

    /// Id of a template stored in `--templates-dir`.
    #[arg(long, requires = "templates_dir")]
    pub template_id: Option<String>,

    /// Directory holding `<id>.json` templates.
    #[arg(long, env = "CAROUSEL_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Binding map JSON file (a flat object).
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Write the static HTML document here.
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Rasterize and write the image here.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Chromium-compatible browser used for rasterization.
    #[arg(long, env = "CAROUSEL_BROWSER", default_value = "chromium")]
    pub browser: PathBuf,

    /// Font catalog JSON file replacing the builtin families.
    #[arg(long, env = "CAROUSEL_FONT_CATALOG")]
    pub font_catalog: Option<PathBuf>,

    /// Browser timeout in seconds; 0 disables it.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

impl RenderArgs {
    /// Which template to render.
    #[must_use]
    pub fn scene_ref(&self, inline: Option<TemplateDocument>) -> Option<SceneRef> {
        match (inline, &self.template_id) {
            (Some(document), _) => Some(SceneRef::Inline(document)),
            (None, Some(id)) => Some(SceneRef::Stored(id.clone())),
            (None, None) => None,
        }
    }

    /// Rasterizer configuration.
    #[must_use]
    pub fn raster_config(&self) -> RasterConfig {
        RasterConfig {
            browser: self.browser.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            extra_args: Vec::new(),
        }
    }

    /// Font catalog to render with.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be loaded.
    pub fn font_catalog(&self) -> anyhow::Result<FontCatalog> {
        match &self.font_catalog {
            Some(path) => FontCatalog::from_path(path)
                .with_context(|| format!("loading font catalog {}", path.display())),
            None => Ok(FontCatalog::builtin()),
        }
    }
}

/// Arguments of `carousel fit`.
#[derive(Debug, Clone, Args)]
pub struct FitArgs {
    /// Text to fit.
    #[arg(long)]
    pub text: String,

    /// Box width in pixels.
    #[arg(long)]
    pub width: f32,

    /// Box height in pixels.
    #[arg(long)]
    pub height: f32,

    /// Font weight.
    #[arg(long, default_value = "400")]
    pub weight: u16,

    /// Line height multiplier.
    #[arg(long, default_value = "1.2")]
    pub line_height: f32,

    /// Letter spacing in pixels.
    #[arg(long, default_value = "0")]
    pub letter_spacing: f32,
}

impl FitArgs {
    /// Wrap style described by the arguments.
    #[must_use]
    pub fn wrap_style(&self) -> WrapStyle {
        WrapStyle {
            font_weight: self.weight,
            line_height: self.line_height,
            letter_spacing: self.letter_spacing,
            ..WrapStyle::default()
        }
    }
}

/// Read a template document from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_template(path: &Path) -> anyhow::Result<TemplateDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading template {}", path.display()))?;
    TemplateDocument::from_json(&json).with_context(|| format!("parsing template {}", path.display()))
}

/// Read a binding map from a JSON file; no file means no bindings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON object.
pub fn read_bindings(path: Option<&Path>) -> anyhow::Result<Bindings> {
    let Some(path) = path else {
        return Ok(Bindings::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading data {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing data {}", path.display()))
}

/// Templates stored as `<id>.json` files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TemplateSource for DirectorySource {
    async fn load(&self, id: &str) -> RenderResult<Option<TemplateDocument>> {
        if !TemplateDocument::is_safe_id(id) {
            return Err(RenderError::InvalidTemplateId(id.to_string()));
        }
        let path = self.root.join(format!("{id}.json"));
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut document = TemplateDocument::from_json(&json)?;
        document.id = id.to_string();
        tracing::debug!("Loaded template {} from {}", id, path.display());
        Ok(Some(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_renderer::FitConfig;

    #[test]
    fn test_render_args_parse() {
        let args = CliArgs::try_parse_from([
            "carousel",
            "render",
            "--template",
            "t.json",
            "--data",
            "d.json",
            "--timeout-secs",
            "0",
        ])
        .expect("args");
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.template.as_deref(), Some(Path::new("t.json")));
        assert!(render.raster_config().timeout.is_none());
    }

    #[test]
    fn test_template_or_id_required() {
        assert!(CliArgs::try_parse_from(["carousel", "render"]).is_err());
        assert!(CliArgs::try_parse_from([
            "carousel",
            "render",
            "--template-id",
            "promo",
            "--templates-dir",
            "/srv/templates",
        ])
        .is_ok());
    }

    #[test]
    fn test_fit_args() {
        let args = CliArgs::try_parse_from([
            "carousel", "fit", "--text", "Hi", "--width", "1000", "--height", "61",
        ])
        .expect("args");
        let Command::Fit(fit) = args.command else {
            panic!("expected fit");
        };
        let size = carousel_renderer::fit(
            &carousel_renderer::MetricsMeasurer,
            &FitConfig::default(),
            &fit.text,
            fit.width,
            fit.height,
            &fit.wrap_style(),
        );
        assert_eq!(size, 50);
    }

    #[test]
    fn test_read_bindings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"name": "Ann", "count": 3}"#).expect("write");
        let bindings = read_bindings(Some(&path)).expect("bindings");
        assert_eq!(bindings.get("count"), Some("3"));
        assert!(read_bindings(None).expect("empty").is_empty());
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("promo.json"),
            r#"{"id": "other", "width": 800, "height": 600}"#,
        )
        .expect("write");
        let source = DirectorySource::new(dir.path());

        let document = source.load("promo").await.expect("load").expect("found");
        assert_eq!(document.id, "promo");
        assert!(source.load("missing").await.expect("load").is_none());
        assert!(matches!(
            source.load("../promo").await,
            Err(RenderError::InvalidTemplateId(_))
        ));
    }
}
