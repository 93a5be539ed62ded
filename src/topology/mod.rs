//! Topology Module: Persistent Homology of Vietoris-Rips Filtrations
//!
//! Implements the mathematical structures for topological data analysis:
//! - Distance matrices under a choice of metric
//! - Vietoris-Rips filtration (with optional edge collapse)
//! - Exact persistent homology by boundary matrix reduction
//! - Betti numbers extraction
//!
//! ## Mathematical Background
//!
//! For a point cloud X we construct a filtration of simplicial complexes
//! VR_ε(X) indexed by the scale parameter ε. The persistent homology
//! tracks the birth and death of topological features (connected
//! components, loops, voids) across this filtration.
//!
//! Data flows strictly forward and every stage is a pure function:
//!
//! ```text
//! points ──► DistanceMatrix ──► Filtration ──► PersistenceDiagrams
//! ```

mod point_cloud;
mod vietoris_rips;
mod collapse;
mod persistence;
mod betti;

pub use point_cloud::{
    array_from_rows, validate_points, DistanceMatrix, Metric, DISTANCE_TOLERANCE,
};
pub use vietoris_rips::{Filtration, Simplex, VietorisRips};
pub use collapse::collapse_edges;
pub use persistence::{
    compute_persistence,
    compute_persistence_from_distances,
    compute_persistence_from_points,
    PersistenceConfig,
    PersistenceDiagram,
    PersistenceDiagrams,
    PersistencePair,
};
pub use betti::{BettiCurve, BettiNumbers};
