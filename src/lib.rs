//! # TDA-Rips-Features
//!
//! Persistent Homology of Point Clouds: Vietoris-Rips Filtrations,
//! Persistence Diagrams and Fixed-Length Topological Features
//!
//! ## Theoretical Framework
//!
//! A finite metric space X grows a nested family of simplicial complexes
//!
//!   VR_ε(X) = { σ ⊆ X : diam(σ) ≤ ε },   ε ≥ 0
//!
//! Homology classes are born and die as ε increases. Each class in
//! dimension k yields a point (birth, death) of the k-th persistence
//! diagram: β₀ tracks connected components, β₁ loops, β₂ voids.
//!
//! ### Methodology
//!
//! 1. **Distances**: pairwise metric of a point cloud, or a validated
//!    precomputed matrix
//!
//! 2. **Filtration**: all simplices up to dimension d+1, ordered by
//!    (value, dimension, vertices), optionally after edge collapse
//!
//! 3. **Persistence**: union-find (elder rule) for H₀ and Z/2 boundary
//!    reduction with clearing for H₁, H₂, ...
//!
//! 4. **Vectorization**: persistent entropy, point counts and amplitudes
//!    (bottleneck, Wasserstein, landscapes, Betti curves, silhouettes,
//!    persistence images)
//!
//! 5. **Batches**: independent items on a worker pool, results in input
//!    order, failures reported per item
//!
//! ## Example
//!
//! ```no_run
//! use ndarray::array;
//! use tda_rips_features::{Pipeline, PipelineConfig, PipelineInput};
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default()).unwrap();
//! let square = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
//! let batch = pipeline.run_batch(&[PipelineInput::PointCloud(square)]).unwrap();
//! assert!(batch.is_complete_success());
//! ```
//!
//! ## References
//!
//! - Edelsbrunner & Harer, "Computational Topology" (2010)
//! - Bauer, "Ripser: efficient computation of Vietoris-Rips persistence
//!   barcodes" (2021)
//! - Boissonnat & Pritam, "Edge collapse and persistence of flag
//!   complexes" (2020)
//! - Atienza et al., "Persistent entropy for separating topological
//!   features from noise" (2020)

pub mod config;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod topology;
pub mod vectorize;

pub use error::{ErrorKind, Result, TdaError};

// Re-exports from topology
pub use topology::{
    collapse_edges,
    compute_persistence,
    compute_persistence_from_distances,
    compute_persistence_from_points,
    BettiCurve,
    BettiNumbers,
    DistanceMatrix,
    Filtration,
    Metric,
    PersistenceConfig,
    PersistenceDiagram,
    PersistenceDiagrams,
    PersistencePair,
    Simplex,
    VietorisRips,
};

// Re-exports from vectorize
pub use vectorize::{
    amplitude,
    persistence_entropy,
    vectorize,
    AmplitudeMetric,
    EntropyOptions,
    PersistenceLandscape,
    Vectorization,
    VectorizerConfig,
};

pub use config::{PipelineConfig, VectorizerSettings};
pub use embedding::{SlidingWindow, TakensEmbedding};
pub use pipeline::{
    BatchResult,
    ItemError,
    ItemResult,
    Pipeline,
    PipelineInput,
    Shape,
    Stage,
};
