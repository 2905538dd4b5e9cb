//! Render jobs: template resolution, document preparation and the external
//! rasterizer.
//!
//! ```text
//! RenderRequest ──► TemplateSource ──► RenderPipeline ──► Rasterizer ──► image
//!  (stored id or      (stored only)     (pure, sync)      (async, may
//!   inline doc)                                            fail; no retry)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use carousel_core::{ImageFormat, TemplateDocument};

use crate::binding::Bindings;
use crate::document::StaticDocument;
use crate::error::{RenderError, RenderResult};
use crate::pipeline::RenderPipeline;

/// Bytes produced by a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
}

/// Turns a static document into an encoded image.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Load the document in a viewport of its canvas size and capture it.
    async fn rasterize(
        &self,
        document: &StaticDocument,
        format: ImageFormat,
    ) -> RenderResult<RasterImage>;
}

/// Looks up stored templates by id.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Fetch a template; `None` when no template has this id.
    async fn load(&self, id: &str) -> RenderResult<Option<TemplateDocument>>;
}

/// Which template a job renders.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRef {
    /// A template held by the [`TemplateSource`].
    Stored(String),
    /// A template supplied with the request.
    Inline(TemplateDocument),
}

/// A single render job.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Template to render.
    pub scene: SceneRef,
    /// Runtime data.
    pub bindings: Bindings,
}

impl RenderRequest {
    /// Job for a stored template.
    #[must_use]
    pub fn stored(id: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            scene: SceneRef::Stored(id.into()),
            bindings,
        }
    }

    /// Job for an inline template.
    #[must_use]
    pub fn inline(document: TemplateDocument, bindings: Bindings) -> Self {
        Self {
            scene: SceneRef::Inline(document),
            bindings,
        }
    }
}

/// Result of a render job.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// Template that was rendered.
    pub template_id: String,
    /// The document handed to the rasterizer.
    pub document: StaticDocument,
    /// Rasterized image.
    pub image: RasterImage,
}

impl RenderOutput {
    /// MIME type of the image.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.image.format.mime_type()
    }
}

/// Runs render jobs end to end.
#[derive(Clone)]
pub struct RenderService {
    pipeline: RenderPipeline,
    source: Option<Arc<dyn TemplateSource>>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl std::fmt::Debug for RenderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderService")
            .field("pipeline", &self.pipeline)
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

impl RenderService {
    /// Service for inline templates only.
    #[must_use]
    pub fn new(pipeline: RenderPipeline, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            pipeline,
            source: None,
            rasterizer,
        }
    }

    /// Attach a store for [`SceneRef::Stored`] jobs.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// The pipeline in use.
    #[must_use]
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Resolve the template a job refers to.
    ///
    /// # Errors
    ///
    /// Fails for unsafe or unknown ids and for templates without a canvas
    /// size.
    pub async fn resolve(&self, scene: &SceneRef) -> RenderResult<TemplateDocument> {
        let document = match scene {
            SceneRef::Inline(document) => document.clone(),
            SceneRef::Stored(id) => {
                if !TemplateDocument::is_safe_id(id) {
                    tracing::warn!("Rejected template id {:?}", id);
                    return Err(RenderError::InvalidTemplateId(id.clone()));
                }
                let source = self
                    .source
                    .as_ref()
                    .ok_or_else(|| RenderError::TemplateNotFound(id.clone()))?;
                source
                    .load(id)
                    .await?
                    .ok_or_else(|| RenderError::TemplateNotFound(id.clone()))?
            }
        };
        document.validate()?;
        Ok(document)
    }

    /// Resolve the template and produce its static document.
    ///
    /// # Errors
    ///
    /// See [`RenderService::resolve`].
    pub async fn prepare(&self, request: &RenderRequest) -> RenderResult<(TemplateDocument, StaticDocument)> {
        let template = self.resolve(&request.scene).await?;
        let document = self.pipeline.render_document(&template, &request.bindings)?;
        Ok((template, document))
    }

    /// Run a job. Rasterizer failures are returned as they are.
    ///
    /// # Errors
    ///
    /// Fails if the template cannot be resolved or rasterization fails.
    pub async fn render(&self, request: &RenderRequest) -> RenderResult<RenderOutput> {
        let (template, document) = self.prepare(request).await?;
        self.rasterize(template, document).await
    }

    /// Rasterize a document produced by [`RenderService::prepare`] without
    /// resolving the template again.
    ///
    /// # Errors
    ///
    /// Returns the rasterizer's error unchanged.
    pub async fn rasterize(
        &self,
        template: TemplateDocument,
        document: StaticDocument,
    ) -> RenderResult<RenderOutput> {
        let format = template.export_settings.image_format.resolved();
        tracing::info!(
            "Rasterizing template {} ({}x{}, {} boxes) as {:?}",
            template.id,
            document.width,
            document.height,
            document.boxes.len(),
            format
        );
        let image = self.rasterizer.rasterize(&document, format).await.map_err(|e| {
            tracing::warn!("Render of template {} failed: {}", template.id, e);
            e
        })?;
        Ok(RenderOutput {
            template_id: template.id,
            document,
            image,
        })
    }
}

/// External browser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterConfig {
    /// Chromium-compatible executable.
    pub browser: PathBuf,
    /// Kill the browser after this long.
    pub timeout: Option<Duration>,
    /// Extra command line arguments.
    pub extra_args: Vec<String>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            browser: PathBuf::from("chromium"),
            timeout: Some(Duration::from_secs(30)),
            extra_args: Vec::new(),
        }
    }
}

/// Rasterizer that screenshots the document with a headless browser.
///
/// The browser always produces PNG.
#[derive(Debug, Clone, Default)]
pub struct BrowserRasterizer {
    config: RasterConfig,
}

impl BrowserRasterizer {
    /// Create a rasterizer.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Command line arguments for a capture.
    #[must_use]
    pub fn arguments(&self, document: &StaticDocument, page_url: &str, screenshot: &std::path::Path) -> Vec<String> {
        let (width, height) = document.viewport();
        let mut args = vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-sandbox".to_string(),
            format!("--window-size={width},{height}"),
            format!("--screenshot={}", screenshot.display()),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(page_url.to_string());
        args
    }
}

#[async_trait]
impl Rasterizer for BrowserRasterizer {
    async fn rasterize(
        &self,
        document: &StaticDocument,
        format: ImageFormat,
    ) -> RenderResult<RasterImage> {
        if format.resolved() != ImageFormat::Png {
            tracing::debug!("Browser capture produces PNG; {:?} requested", format);
        }

        let workdir = tempfile::tempdir()?;
        let page = workdir.path().join("index.html");
        let screenshot = workdir.path().join("screenshot.png");
        tokio::fs::write(&page, document.to_html()).await?;

        let page_url = format!("file://{}", page.display());
        let mut command = tokio::process::Command::new(&self.config.browser);
        command
            .args(self.arguments(document, &page_url, &screenshot))
            .kill_on_drop(true);

        tracing::debug!("Launching {}", self.config.browser.display());
        let run = command.output();
        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| RenderError::Timeout(limit))??,
            None => run.await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Raster(format!(
                "{} exited with {}: {}",
                self.config.browser.display(),
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&screenshot).await.map_err(|e| {
            RenderError::Raster(format!("browser produced no screenshot: {e}"))
        })?;
        Ok(RasterImage {
            bytes,
            format: ImageFormat::Png,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_arguments() {
        let rasterizer = BrowserRasterizer::new(RasterConfig {
            extra_args: vec!["--force-device-scale-factor=2".to_string()],
            ..RasterConfig::default()
        });
        let document = StaticDocument {
            width: 1080.0,
            height: 1350.5,
            font_links: Vec::new(),
            boxes: Vec::new(),
        };
        let args = rasterizer.arguments(
            &document,
            "file:///tmp/index.html",
            std::path::Path::new("/tmp/shot.png"),
        );
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--window-size=1080,1351".to_string()));
        assert!(args.contains(&"--screenshot=/tmp/shot.png".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("file:///tmp/index.html"));
        assert!(args.contains(&"--force-device-scale-factor=2".to_string()));
    }

    #[tokio::test]
    async fn test_missing_browser_fails() {
        let rasterizer = BrowserRasterizer::new(RasterConfig {
            browser: PathBuf::from("/nonexistent/carousel-browser"),
            timeout: None,
            extra_args: Vec::new(),
        });
        let document = StaticDocument {
            width: 10.0,
            height: 10.0,
            font_links: Vec::new(),
            boxes: Vec::new(),
        };
        let result = rasterizer.rasterize(&document, ImageFormat::Png).await;
        assert!(matches!(result, Err(RenderError::Io(_))));
    }
}
