//! Batch Pipeline: Series / Point Clouds → Diagrams → Feature Vectors
//!
//! A pipeline is a chain of typed stages:
//!
//! ```text
//!   Series ──Embed──▶ PointCloud ──Distances──▶ DistanceMatrix
//!          ──Persistence──▶ Diagrams ──Vectorize──▶ FeatureVector
//! ```
//!
//! Adjacent stages must agree on the shape they exchange; this is checked
//! once when the pipeline is composed, never per item.
//!
//! An item enters the chain at the first stage accepting its shape, so a
//! single pipeline serves raw series, point clouds and precomputed
//! distance matrices alike.
//!
//! ## Batches
//!
//! Items are independent. Each one runs as its own task on a dedicated
//! rayon pool, and results come back in input order. A failing item
//! yields an error record at its index; its siblings are unaffected.

use std::borrow::Cow;
use std::fmt;

use log::{debug, info, warn};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::embedding::TakensEmbedding;
use crate::error::{ErrorKind, Result, TdaError};
use crate::topology::{
    compute_persistence_from_distances, DistanceMatrix, Metric, PersistenceConfig,
    PersistenceDiagrams,
};
use crate::vectorize::{vectorize, VectorizerConfig};

/// Kind of data flowing between stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Series,
    PointCloud,
    DistanceMatrix,
    Diagrams,
    FeatureVector,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Series => "series",
            Shape::PointCloud => "point cloud",
            Shape::DistanceMatrix => "distance matrix",
            Shape::Diagrams => "persistence diagrams",
            Shape::FeatureVector => "feature vector",
        };
        f.write_str(name)
    }
}

/// One step of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Delay embedding of a scalar series
    Embed(TakensEmbedding),
    /// Pairwise distances of a point cloud
    Distances(Metric),
    /// Vietoris-Rips persistence of a distance matrix
    Persistence {
        homology_dimensions: Vec<usize>,
        max_scale: Option<f64>,
        collapse_edges: bool,
    },
    /// Fixed-length features of the diagrams
    Vectorize(VectorizerConfig),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Embed(_) => "embed",
            Stage::Distances(_) => "distances",
            Stage::Persistence { .. } => "persistence",
            Stage::Vectorize(_) => "vectorize",
        }
    }

    pub fn input(&self) -> Shape {
        match self {
            Stage::Embed(_) => Shape::Series,
            Stage::Distances(_) => Shape::PointCloud,
            Stage::Persistence { .. } => Shape::DistanceMatrix,
            Stage::Vectorize(_) => Shape::Diagrams,
        }
    }

    pub fn output(&self) -> Shape {
        match self {
            Stage::Embed(_) => Shape::PointCloud,
            Stage::Distances(_) => Shape::DistanceMatrix,
            Stage::Persistence { .. } => Shape::Diagrams,
            Stage::Vectorize(_) => Shape::FeatureVector,
        }
    }

    /// Parameter checks that do not depend on any item
    fn validate(&self) -> Result<()> {
        match self {
            Stage::Embed(embedding) => embedding.validate(),
            Stage::Distances(Metric::Precomputed) => Err(TdaError::config(
                "distances stage cannot use the precomputed metric",
            )),
            Stage::Distances(_) => Ok(()),
            Stage::Persistence {
                homology_dimensions,
                max_scale,
                ..
            } => {
                if homology_dimensions.is_empty() {
                    return Err(TdaError::config("persistence stage has no homology dimension"));
                }
                match max_scale {
                    Some(scale) if !(*scale > 0.0) => Err(TdaError::config(format!(
                        "max_scale must be positive, got {}",
                        scale
                    ))),
                    _ => Ok(()),
                }
            }
            Stage::Vectorize(config) => config.validate(),
        }
    }

    fn apply<'a>(&self, artifact: Artifact<'a>) -> Result<Artifact<'a>> {
        match (self, artifact) {
            (Stage::Embed(embedding), Artifact::Series(series)) => {
                Ok(Artifact::PointCloud(Cow::Owned(embedding.embed(series)?)))
            }
            (Stage::Distances(metric), Artifact::PointCloud(points)) => Ok(Artifact::Distances(
                DistanceMatrix::from_points(&points, *metric)?,
            )),
            (
                Stage::Persistence {
                    homology_dimensions,
                    max_scale,
                    collapse_edges,
                },
                Artifact::Distances(distances),
            ) => {
                let config = PersistenceConfig {
                    homology_dimensions: homology_dimensions.clone(),
                    max_scale: *max_scale,
                    collapse_edges: *collapse_edges,
                    ..PersistenceConfig::default()
                };
                Ok(Artifact::Diagrams(compute_persistence_from_distances(
                    &distances, &config,
                )?))
            }
            (Stage::Vectorize(config), Artifact::Diagrams(diagrams)) => {
                Ok(Artifact::Features(vectorize(&diagrams, config)?))
            }
            (stage, artifact) => Err(TdaError::invalid_input(format!(
                "stage '{}' expects {}, got {}",
                stage.name(),
                stage.input(),
                artifact.shape()
            ))),
        }
    }
}

/// One item of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineInput {
    Series(Vec<f64>),
    PointCloud(Array2<f64>),
    DistanceMatrix(Array2<f64>),
}

impl PipelineInput {
    pub fn shape(&self) -> Shape {
        match self {
            PipelineInput::Series(_) => Shape::Series,
            PipelineInput::PointCloud(_) => Shape::PointCloud,
            PipelineInput::DistanceMatrix(_) => Shape::DistanceMatrix,
        }
    }
}

/// Intermediate value of one item
enum Artifact<'a> {
    Series(&'a [f64]),
    PointCloud(Cow<'a, Array2<f64>>),
    Distances(DistanceMatrix),
    Diagrams(PersistenceDiagrams),
    Features(Vec<f64>),
}

impl<'a> Artifact<'a> {
    fn from_input(input: &'a PipelineInput) -> Result<Self> {
        Ok(match input {
            PipelineInput::Series(series) => Artifact::Series(series),
            PipelineInput::PointCloud(points) => Artifact::PointCloud(Cow::Borrowed(points)),
            PipelineInput::DistanceMatrix(matrix) => {
                Artifact::Distances(DistanceMatrix::from_matrix(matrix.clone())?)
            }
        })
    }

    fn shape(&self) -> Shape {
        match self {
            Artifact::Series(_) => Shape::Series,
            Artifact::PointCloud(_) => Shape::PointCloud,
            Artifact::Distances(_) => Shape::DistanceMatrix,
            Artifact::Diagrams(_) => Shape::Diagrams,
            Artifact::Features(_) => Shape::FeatureVector,
        }
    }
}

/// Serializable error record of a failed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TdaError> for ItemError {
    fn from(err: &TdaError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one item, tagged with its position in the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult<T> {
    pub index: usize,
    pub outcome: std::result::Result<T, ItemError>,
}

/// Per-item outcomes, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    pub items: Vec<ItemResult<T>>,
}

impl<T> BatchResult<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Successful items with their indices
    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().ok().map(|v| (item.index, v)))
    }

    /// Failed items with their indices
    pub fn failed(&self) -> impl Iterator<Item = (usize, &ItemError)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().err().map(|e| (item.index, e)))
    }

    pub fn is_complete_success(&self) -> bool {
        self.items.iter().all(|item| item.outcome.is_ok())
    }
}

/// Composed chain of stages plus its worker pool
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Stage>,
    pool: rayon::ThreadPool,
    n_workers: usize,
}

impl Pipeline {
    /// Compose stages, checking that adjacent shapes agree
    pub fn compose(stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            return Err(TdaError::config("pipeline needs at least one stage"));
        }

        for stage in &stages {
            stage.validate().map_err(|e| match e {
                TdaError::InvalidInput(msg) => {
                    TdaError::config(format!("stage '{}': {}", stage.name(), msg))
                }
                other => other,
            })?;
        }

        for pair in stages.windows(2) {
            if pair[0].output() != pair[1].input() {
                return Err(TdaError::config(format!(
                    "stage '{}' produces {} but stage '{}' expects {}",
                    pair[0].name(),
                    pair[0].output(),
                    pair[1].name(),
                    pair[1].input()
                )));
            }
        }

        Ok(Self {
            stages,
            pool: build_pool(1)?,
            n_workers: 1,
        })
    }

    /// Default chain for a configuration
    ///
    /// `[Embed →] Distances → Persistence → Vectorize`, without the
    /// distances stage when the metric is `precomputed`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let persistence = config.persistence_config()?;
        let metric = persistence.metric;

        let mut stages = Vec::with_capacity(4);
        if let Some(embedding) = config.embedding {
            if metric == Metric::Precomputed {
                return Err(TdaError::config(
                    "an embedding cannot feed the precomputed metric",
                ));
            }
            stages.push(Stage::Embed(embedding));
        }
        if metric != Metric::Precomputed {
            stages.push(Stage::Distances(metric));
        }
        stages.push(Stage::Persistence {
            homology_dimensions: persistence.homology_dimensions,
            max_scale: persistence.max_scale,
            collapse_edges: persistence.collapse_edges,
        });
        stages.push(Stage::Vectorize(config.vectorizer_config()?));

        info!(
            "Pipeline: {} ({} workers)",
            stages.iter().map(Stage::name).collect::<Vec<_>>().join(" → "),
            config.n_parallel_workers
        );

        Self::compose(stages)?.with_workers(config.n_parallel_workers)
    }

    /// Replace the worker pool
    pub fn with_workers(mut self, n_workers: usize) -> Result<Self> {
        if n_workers == 0 {
            return Err(TdaError::config("n_parallel_workers must be at least 1"));
        }
        self.pool = build_pool(n_workers)?;
        self.n_workers = n_workers;
        Ok(self)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Shape produced by the last stage
    pub fn output(&self) -> Shape {
        self.stages[self.stages.len() - 1].output()
    }

    /// Feature vector of every item
    pub fn run_batch(&self, inputs: &[PipelineInput]) -> Result<BatchResult<Vec<f64>>> {
        if self.output() != Shape::FeatureVector {
            return Err(TdaError::config(format!(
                "pipeline produces {}, not feature vectors",
                self.output()
            )));
        }

        Ok(self.execute(inputs, &self.stages, |artifact| match artifact {
            Artifact::Features(features) => Some(features),
            _ => None,
        }))
    }

    /// Persistence diagrams of every item
    pub fn diagrams_batch(&self, inputs: &[PipelineInput]) -> Result<BatchResult<PersistenceDiagrams>> {
        let end = self
            .stages
            .iter()
            .position(|stage| stage.output() == Shape::Diagrams)
            .ok_or_else(|| TdaError::config("pipeline has no persistence stage"))?;

        Ok(self.execute(inputs, &self.stages[..=end], |artifact| match artifact {
            Artifact::Diagrams(diagrams) => Some(diagrams),
            _ => None,
        }))
    }

    fn execute<T, F>(&self, inputs: &[PipelineInput], stages: &[Stage], extract: F) -> BatchResult<T>
    where
        T: Send,
        F: Fn(Artifact<'_>) -> Option<T> + Sync,
    {
        info!("Batch: {} items on {} workers", inputs.len(), self.n_workers);

        let mismatches = dimension_mismatches(inputs);

        let outcomes: Vec<Result<T>> = self.pool.install(|| {
            inputs
                .par_iter()
                .zip(mismatches.into_par_iter())
                .map(|(input, mismatch)| match mismatch {
                    Some(err) => Err(err),
                    None => {
                        let last = run_item(input, stages)?;
                        let shape = last.shape();
                        extract(last).ok_or_else(|| {
                            TdaError::invalid_input(format!(
                                "{} input ended the pipeline as {}",
                                input.shape(),
                                shape
                            ))
                        })
                    }
                })
                .collect()
        });

        let items: Vec<ItemResult<T>> = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| ItemResult {
                index,
                outcome: outcome.map_err(|err| {
                    warn!("Item {} failed: {}", index, err);
                    ItemError::from(&err)
                }),
            })
            .collect();

        let batch = BatchResult { items };
        info!(
            "Batch done: {} succeeded, {} failed",
            batch.succeeded().count(),
            batch.failed().count()
        );
        batch
    }
}

fn build_pool(n_workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .build()
        .map_err(|e| TdaError::WorkerPool(e.to_string()))
}

/// Point clouds must share the column count of the first point cloud
fn dimension_mismatches(inputs: &[PipelineInput]) -> Vec<Option<TdaError>> {
    let reference = inputs.iter().find_map(|input| match input {
        PipelineInput::PointCloud(points) => Some(points.ncols()),
        _ => None,
    });

    inputs
        .iter()
        .map(|input| match (input, reference) {
            (PipelineInput::PointCloud(points), Some(expected)) if points.ncols() != expected => {
                Some(TdaError::DimensionMismatch {
                    expected,
                    found: points.ncols(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Push one item through the stages, entering at the first stage that
/// accepts its shape
fn run_item<'a>(input: &'a PipelineInput, stages: &[Stage]) -> Result<Artifact<'a>> {
    let entry = stages
        .iter()
        .position(|stage| stage.input() == input.shape())
        .ok_or_else(|| {
            TdaError::invalid_input(format!("no stage of the pipeline accepts a {}", input.shape()))
        })?;

    let mut artifact = Artifact::from_input(input)?;
    for stage in &stages[entry..] {
        debug!("Stage '{}' on {}", stage.name(), artifact.shape());
        artifact = stage.apply(artifact)?;
    }
    Ok(artifact)
}
