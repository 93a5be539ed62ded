//! Persistent Entropy: Information Content of Persistence Diagrams
//!
//! H_P = -Σᵢ pᵢ log(pᵢ)
//!
//! where pᵢ = lᵢ / L is the normalized lifetime of the i-th finite
//! off-diagonal point and L = Σⱼ lⱼ.
//!
//! With n points, H_P ≤ log(n), with equality iff all lifetimes agree.
//! The normalized variant divides by log(n) and lives in [0, 1].
//!
//! An empty diagram has no distribution to measure, so the caller must
//! say what value to report (`fill_value`). Without one the computation
//! fails instead of producing NaN.

use crate::error::{Result, TdaError};
use crate::topology::PersistenceDiagram;

/// Entropy options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntropyOptions {
    /// Value reported for diagrams without finite off-diagonal points
    pub fill_value: Option<f64>,
    /// Divide by log(n)
    pub normalize: bool,
}

impl Default for EntropyOptions {
    fn default() -> Self {
        Self {
            fill_value: Some(0.0),
            normalize: false,
        }
    }
}

/// Compute persistent (Shannon) entropy of the finite part of a diagram
pub fn persistence_entropy(diagram: &PersistenceDiagram, options: &EntropyOptions) -> Result<f64> {
    let lifetimes = diagram.lifetimes();

    if lifetimes.is_empty() {
        return options.fill_value.ok_or(TdaError::EmptyDiagram {
            dimension: diagram.dimension,
        });
    }

    let total: f64 = lifetimes.iter().sum();

    let mut entropy = 0.0;
    for l in &lifetimes {
        let p = l / total;
        if p > 0.0 {
            entropy -= p * p.ln();
        }
    }

    if options.normalize {
        let n = lifetimes.len();
        entropy = if n > 1 { entropy / (n as f64).ln() } else { 0.0 };
    }

    Ok(entropy)
}
