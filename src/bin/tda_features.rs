//! Batch feature extraction from a JSON file of point clouds, distance
//! matrices or scalar series.
//!
//! Input format (one of the three keys):
//!
//! ```json
//! { "point_clouds": [ [[0.0, 0.0], [1.0, 0.0]], ... ] }
//! { "distance_matrices": [ [[0.0, 1.0], [1.0, 0.0]], ... ] }
//! { "series": [ [0.1, 0.4, ...], ... ] }
//! ```
//!
//! Output is a JSON batch result: one record per item, in input order,
//! holding either the feature vector (or the diagrams with `--diagrams`)
//! or an error record.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use tda_rips_features::topology::array_from_rows;
use tda_rips_features::{Pipeline, PipelineConfig, PipelineInput, SlidingWindow};

/// Persistent homology features for a batch of inputs
#[derive(Parser)]
#[command(name = "tda-features")]
#[command(about = "Vietoris-Rips persistence diagrams and topological features", long_about = None)]
struct Cli {
    /// JSON batch file
    #[arg(long)]
    input: PathBuf,
    /// JSON pipeline configuration (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the number of worker threads
    #[arg(long)]
    workers: Option<usize>,
    /// Enable edge collapse regardless of the configuration
    #[arg(long)]
    collapse: bool,
    /// Emit persistence diagrams instead of feature vectors
    #[arg(long)]
    diagrams: bool,
    /// Split each series into windows of this many samples
    #[arg(long)]
    window: Option<usize>,
    /// Offset between consecutive windows
    #[arg(long, default_value_t = 1)]
    window_stride: usize,
    /// Output path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct BatchFile {
    #[serde(default)]
    point_clouds: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    distance_matrices: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    series: Vec<Vec<f64>>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config.n_parallel_workers = workers;
    }
    if cli.collapse {
        config.collapse_edges = true;
    }

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading batch {}", cli.input.display()))?;
    let batch: BatchFile = serde_json::from_str(&content)?;
    let inputs = load_inputs(batch, &cli)?;
    if inputs.is_empty() {
        anyhow::bail!("No inputs found in {}", cli.input.display());
    }

    let pipeline = Pipeline::from_config(&config)?;
    log::info!(
        "{} inputs, stages: {}",
        inputs.len(),
        pipeline
            .stages()
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let (json, n_failed) = if cli.diagrams {
        let result = pipeline.diagrams_batch(&inputs)?;
        (serde_json::to_string_pretty(&result)?, result.failed().count())
    } else {
        let result = pipeline.run_batch(&inputs)?;
        (serde_json::to_string_pretty(&result)?, result.failed().count())
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing output {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    if n_failed > 0 {
        log::warn!("{} of {} items failed", n_failed, inputs.len());
    }

    Ok(())
}

fn load_inputs(batch: BatchFile, cli: &Cli) -> anyhow::Result<Vec<PipelineInput>> {
    let mut inputs = Vec::new();

    for (i, rows) in batch.point_clouds.iter().enumerate() {
        let points = array_from_rows(rows).with_context(|| format!("point cloud {}", i))?;
        inputs.push(PipelineInput::PointCloud(points));
    }

    for (i, rows) in batch.distance_matrices.iter().enumerate() {
        let matrix = array_from_rows(rows).with_context(|| format!("distance matrix {}", i))?;
        inputs.push(PipelineInput::DistanceMatrix(matrix));
    }

    for series in batch.series {
        match cli.window {
            Some(size) => {
                let windows = SlidingWindow::new(size, cli.window_stride).windows(&series)?;
                inputs.extend(windows.into_iter().map(PipelineInput::Series));
            }
            None => inputs.push(PipelineInput::Series(series)),
        }
    }

    Ok(inputs)
}
