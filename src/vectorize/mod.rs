//! Vectorize Module: Fixed-Length Features from Persistence Diagrams
//!
//! Turns the diagrams of one input into a numeric feature vector that any
//! downstream classifier can consume.
//!
//! ## Methods
//!
//! - **Entropy**: persistent entropy H_P = -Σᵢ pᵢ log(pᵢ), pᵢ = lᵢ / L
//! - **Count**: number of finite off-diagonal points
//! - **Amplitude**: distance to the empty diagram under a chosen metric
//!
//! ## Layout
//!
//! For methods m₁..mₐ and homology dimensions d₁..dᵦ, in caller order:
//!
//! ```text
//! [ m₁(d₁), m₁(d₂), ..., m₁(dᵦ), m₂(d₁), ..., mₐ(dᵦ) ]
//! ```
//!
//! so the vector always has a × b entries.
//!
//! Essential classes never contribute: all methods read the finite part
//! of the diagram only.

mod amplitude;
mod entropy;
mod landscape;

pub use amplitude::{amplitude, persistence_image, AmplitudeMetric};
pub use entropy::{persistence_entropy, EntropyOptions};
pub use landscape::{silhouette, PersistenceLandscape};

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TdaError};
use crate::topology::{PersistenceDiagram, PersistenceDiagrams};

/// A single scalar feature per diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vectorization {
    Entropy,
    Count,
    Amplitude(AmplitudeMetric),
}

impl FromStr for Vectorization {
    type Err = TdaError;

    /// `"entropy"`, `"count"` or `"amplitude:<metric>[:p]"`
    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        match spec.to_ascii_lowercase().as_str() {
            "entropy" => Ok(Vectorization::Entropy),
            "count" | "number_of_points" => Ok(Vectorization::Count),
            _ => match spec.split_once(':') {
                Some((kind, metric)) if kind.eq_ignore_ascii_case("amplitude") => {
                    Ok(Vectorization::Amplitude(metric.parse()?))
                }
                _ => Err(TdaError::unknown_metric(spec)),
            },
        }
    }
}

impl fmt::Display for Vectorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vectorization::Entropy => write!(f, "entropy"),
            Vectorization::Count => write!(f, "count"),
            Vectorization::Amplitude(metric) => write!(f, "amplitude:{}", metric),
        }
    }
}

/// Vectorizer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    /// Methods, in output order
    pub methods: Vec<Vectorization>,
    /// Homology dimensions, in output order
    pub homology_dimensions: Vec<usize>,
    pub entropy: EntropyOptions,
    /// Fixed sampling range for sampled amplitudes
    pub filtration_range: Option<(f64, f64)>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            methods: vec![
                Vectorization::Entropy,
                Vectorization::Count,
                Vectorization::Amplitude(AmplitudeMetric::Wasserstein { p: 2.0 }),
            ],
            homology_dimensions: vec![0, 1],
            entropy: EntropyOptions::default(),
            filtration_range: None,
        }
    }
}

impl VectorizerConfig {
    /// Length of every produced vector
    pub fn output_len(&self) -> usize {
        self.methods.len() * self.homology_dimensions.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(TdaError::config("no vectorization method configured"));
        }
        if self.homology_dimensions.is_empty() {
            return Err(TdaError::config("no homology dimension configured"));
        }
        for method in &self.methods {
            if let Vectorization::Amplitude(metric) = method {
                metric.validate()?;
            }
        }
        if let Some((lo, hi)) = self.filtration_range {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(TdaError::config(format!(
                    "filtration_range must be a finite interval with lo < hi, got ({}, {})",
                    lo, hi
                )));
            }
        }
        Ok(())
    }
}

/// Number of finite off-diagonal points
pub fn number_of_points(diagram: &PersistenceDiagram) -> usize {
    diagram.finite_pairs().count()
}

/// Apply one method to one diagram
pub fn vectorize_diagram(
    diagram: &PersistenceDiagram,
    method: &Vectorization,
    config: &VectorizerConfig,
) -> Result<f64> {
    match method {
        Vectorization::Entropy => persistence_entropy(diagram, &config.entropy),
        Vectorization::Count => Ok(number_of_points(diagram) as f64),
        Vectorization::Amplitude(metric) => amplitude(diagram, metric, config.filtration_range),
    }
}

/// Concatenate all configured features of one input's diagrams
pub fn vectorize(diagrams: &PersistenceDiagrams, config: &VectorizerConfig) -> Result<Vec<f64>> {
    config.validate()?;

    let selected: Vec<&PersistenceDiagram> = config
        .homology_dimensions
        .iter()
        .map(|&d| {
            diagrams.get(d).ok_or_else(|| {
                TdaError::invalid_input(format!("no diagram computed for dimension {}", d))
            })
        })
        .collect::<Result<_>>()?;

    let mut features = Vec::with_capacity(config.output_len());
    for method in &config.methods {
        for diagram in &selected {
            features.push(vectorize_diagram(diagram, method, config)?);
        }
    }

    Ok(features)
}

/// Uniform grid of `n_bins` points over `range`, endpoints included
pub(crate) fn sampling_grid(range: (f64, f64), n_bins: usize) -> Vec<f64> {
    let (lo, hi) = range;
    if n_bins < 2 {
        return vec![lo; n_bins];
    }
    let step = (hi - lo) / (n_bins - 1) as f64;
    (0..n_bins).map(|i| lo + i as f64 * step).collect()
}

/// Lᵖ norm of a sampled function (trapezoidal rule)
pub fn lp_norm(samples: &[(f64, f64)], p: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let mut integral = 0.0;
    for i in 1..samples.len() {
        let dt = samples[i].0 - samples[i - 1].0;
        let avg = (samples[i].1.abs().powf(p) + samples[i - 1].1.abs().powf(p)) / 2.0;
        integral += dt * avg;
    }

    integral.powf(1.0 / p)
}
