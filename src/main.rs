//! aug_vision CLI - preview random augmentations of a single image.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aug_vision::{
    AugmentationConfig, AugmentationFlow, Augmenter, GridRenderer, ImageBatch, ParallelFlow, RenderConfig,
};

/// Load one image, draw randomized variants of it, and render them in a grid.
#[derive(Parser, Debug)]
#[command(name = "aug_vision")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source image path.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Directory that receives `original.png` and `augmented.png`.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// Number of augmented variants to draw.
    #[arg(short = 'n', long, default_value = "10", value_name = "INT")]
    count: usize,

    /// Rows in the variant grid.
    #[arg(short, long, default_value = "2", value_name = "INT")]
    rows: usize,

    /// Random seed for reproducibility.
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// JSON augmentation config. Defaults to the built-in demo ranges.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TrueType/OpenType font used for cell titles.
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Label each variant with its draw number.
    #[arg(long)]
    titles: bool,

    /// Smooth cell scaling instead of nearest-neighbour.
    #[arg(long)]
    interp: bool,

    /// Parallel workers for drawing variants (1 = sequential).
    #[arg(short, long, default_value = "1", value_name = "INT")]
    jobs: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("aug_vision={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args).await {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(args: &Args) -> Result<()> {
    // --- 1. Augmentation Config ---
    let config = match &args.config {
        Some(path) => AugmentationConfig::from_json_file(path)?,
        None => AugmentationConfig::demo(),
    };
    tracing::info!(?config, "augmentation config");
    let augmenter = Augmenter::new(config).context("Invalid augmentation config")?;

    // --- 2. Load the Source Batch ---
    let batch = ImageBatch::load(&args.image)?;
    let (width, height) = batch.first().dimensions();
    tracing::info!(path = %args.image.display(), width, height, "loaded image");

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory {}", args.output_dir.display()))?;

    // --- 3. Show the Original ---
    let original_renderer = renderer(args, (12.0, 6.0))?;
    original_renderer.render_to_file(batch.images(), None, 1, args.output_dir.join("original.png"))?;

    // --- 4. Draw Variants ---
    let flow = AugmentationFlow::new(augmenter, batch, args.seed);
    tracing::info!(seed = flow.base_seed(), count = args.count, jobs = args.jobs, "drawing variants");
    let batches = if args.jobs > 1 {
        let mut parallel = ParallelFlow::new(flow).with_workers(args.jobs);
        parallel.take(args.count).await?
    } else {
        flow.take(args.count).collect()
    };
    let variants: Vec<_> = batches.into_iter().map(|b| b.first().clone()).collect();

    // --- 5. Render the Grid ---
    let titles: Option<Vec<String>> = args
        .titles
        .then(|| (1..=variants.len()).map(|i| format!("#{i}")).collect());
    let grid_renderer = renderer(args, (20.0, 7.0))?;
    let grid_path = args.output_dir.join("augmented.png");
    grid_renderer.render_to_file(&variants, titles.as_deref(), args.rows, &grid_path)?;

    println!("Wrote {} variants to {}", variants.len(), grid_path.display());
    Ok(())
}

fn renderer(args: &Args, figsize: (f32, f32)) -> Result<GridRenderer> {
    let renderer = GridRenderer::new(RenderConfig {
        figsize,
        interpolate: args.interp,
        ..RenderConfig::default()
    })?;
    Ok(match &args.font {
        Some(path) => renderer.with_font_file(path)?,
        None => renderer,
    })
}
