//! # Carousel
//!
//! Render templates with runtime data from the command line.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context;
use carousel_cli::{read_bindings, read_template, CliArgs, Command, DirectorySource, FitArgs, RenderArgs};
use carousel_renderer::{
    fit, BrowserRasterizer, FitConfig, MetricsMeasurer, RenderPipeline, RenderRequest,
    RenderService,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,carousel=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,carousel=debug,carousel_core=debug,carousel_renderer=debug")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Render(render) => run_render(render).await,
        Command::Fit(fit_args) => {
            run_fit(&fit_args);
            Ok(())
        }
    }
}

async fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let pipeline = RenderPipeline::with_defaults().with_fonts(args.font_catalog()?);
    let mut service = RenderService::new(
        pipeline,
        Arc::new(BrowserRasterizer::new(args.raster_config())),
    );
    if let Some(dir) = &args.templates_dir {
        service = service.with_source(Arc::new(DirectorySource::new(dir)));
    }

    let inline = args.template.as_deref().map(read_template).transpose()?;
    let scene = args
        .scene_ref(inline)
        .context("either --template or --template-id is required")?;
    let request = RenderRequest {
        scene,
        bindings: read_bindings(args.data.as_deref())?,
    };

    let (template, document) = service.prepare(&request).await?;
    tracing::info!(
        "Prepared template {} \"{}\" with {} boxes",
        template.id,
        template.name,
        document.boxes.len()
    );

    let html = document.to_html();
    if let Some(path) = &args.html {
        tokio::fs::write(path, &html)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote HTML to {}", path.display());
    }

    if let Some(path) = &args.out {
        let output = service.rasterize(template, document).await?;
        tokio::fs::write(path, &output.image.bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(
            "Wrote {} ({} bytes) to {}",
            output.mime_type(),
            output.image.bytes.len(),
            path.display()
        );
    } else if args.html.is_none() {
        std::io::stdout()
            .write_all(html.as_bytes())
            .context("writing HTML to stdout")?;
    }

    Ok(())
}

fn run_fit(args: &FitArgs) {
    let size = fit(
        &MetricsMeasurer,
        &FitConfig::default(),
        &args.text,
        args.width,
        args.height,
        &args.wrap_style(),
    );
    println!("{size}");
}
