//! Geometric Art CLI - Approximate an image with polygons or circles.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use geometric_art::{
    compute::HillClimber,
    io::{ConsoleReporter, RecorderConfig, RunLayout, SnapshotRecorder, load_target, target_file_name},
    schema::{RunConfig, ShapeKind},
};

/// Hill-climbing optimization to represent images using geometric shapes.
#[derive(Parser, Debug)]
#[command(name = "geometric-art", version)]
struct Cli {
    /// Path to the image to represent
    #[arg(required_unless_present = "print_config")]
    image: Option<PathBuf>,

    /// Use circles instead of polygons
    #[arg(short, long)]
    circle: bool,

    /// Number of iterations
    #[arg(short, long, default_value_t = 100_000)]
    iterations: u64,

    /// Maximum radius of circles
    #[arg(short, long, default_value_t = 30)]
    max_radius: u32,

    /// Number of geometric shapes
    #[arg(short, long, default_value_t = 50)]
    number: usize,

    /// Random seed for reproducible runs
    #[arg(short, long)]
    random: Option<u64>,

    /// Number of sides for the polygons
    #[arg(short, long, default_value_t = 6)]
    sides: usize,

    /// Print progress and save snapshots of the current best
    #[arg(short, long)]
    verbose: bool,

    /// Progress cadence in iterations
    #[arg(long, default_value_t = 10_000)]
    report_every: u64,

    /// Maximum snapshots to save (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_snapshots: u64,

    /// Load the run configuration from JSON instead of the shape flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Scratch directory, emptied at start
    #[arg(long, default_value = "run")]
    run_dir: PathBuf,

    /// Directory for final results
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

impl Cli {
    /// Configuration from `--config`, or from the individual flags.
    ///
    /// `--random` overrides the seed of a loaded configuration.
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => RunConfig {
                shape: if self.circle {
                    ShapeKind::Circle {
                        max_radius: self.max_radius,
                    }
                } else {
                    ShapeKind::Polygon { sides: self.sides }
                },
                individuals: self.number,
                iterations: self.iterations,
                report_interval: self.report_every,
                random_seed: None,
            },
        };
        if self.random.is_some() {
            config.random_seed = self.random;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&RunConfig::default())?);
        return Ok(());
    }

    let image_path = cli.image.clone().context("an image path is required")?;
    let config = cli.run_config()?;
    config.validate().context("invalid configuration")?;

    let layout = RunLayout::new(&cli.run_dir, &cli.output_dir);
    layout.prepare().context("preparing run directories")?;

    let target = load_target(&image_path)
        .with_context(|| format!("loading target {}", image_path.display()))?;
    layout.save_target(&target)?;
    let target_name = target_file_name(&image_path);

    println!("Geometric Art");
    println!("=============");
    println!("Target: {} ({})", target_name, target.canvas());
    println!(
        "Shapes: {} {}s (parameter {})",
        config.individuals,
        config.shape.name(),
        config.shape.parameter()
    );
    println!("Iterations: {}", config.iterations);
    println!();

    let mut climber = HillClimber::new(config.clone(), target)?;
    println!("Seed: {}", climber.seed());

    let mut reporter = ConsoleReporter::stdout();
    let mut recorder = SnapshotRecorder::new(
        layout.run_dir(),
        RecorderConfig {
            max_snapshots: cli.max_snapshots,
        },
    );

    let result = climber.run_with_callback(|event| {
        if !cli.verbose {
            return;
        }
        if let Err(e) = recorder.record(event.iteration, event.frame) {
            log::warn!("Failed to save snapshot {}: {}", event.iteration, e);
        }
        if let Err(e) = reporter.report(event) {
            log::warn!("Failed to print progress: {}", e);
        }
    })?;

    if cli.verbose {
        println!("{}", recorder.finalize());
    }

    let saved = layout.save_result(&config, &target_name, &result)?;

    println!();
    println!("Final state:");
    println!("  {}", result.stats);
    println!("  Seed: {}", result.stats.random_seed);
    println!("  Time: {:.2}s", result.stats.elapsed_seconds);
    println!("  Saved: {}", saved.artifact.display());
    println!("  Record: {}", saved.sidecar.display());

    Ok(())
}
