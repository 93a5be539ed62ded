//! Betti Numbers: Topological Invariants
//!
//! The k-th Betti number βₖ counts the number of k-dimensional
//! "holes" in a topological space:
//!
//! - β₀: Number of connected components
//! - β₁: Number of 1-dimensional loops/cycles
//! - β₂: Number of 2-dimensional voids/cavities
//!
//! Read off a persistence diagram, βₖ(ε) is the number of pairs with
//! b ≤ ε < d. Sampling that count over a grid gives the Betti curve.

use super::{PersistenceDiagram, PersistenceDiagrams};

/// Betti numbers at a specific filtration value
#[derive(Debug, Clone, PartialEq)]
pub struct BettiNumbers {
    /// βₖ indexed by homology dimension (dimensions without a diagram are 0)
    pub betti: Vec<usize>,
    /// Filtration scale
    pub epsilon: f64,
}

impl BettiNumbers {
    /// Betti numbers of VR_ε, essential classes included
    pub fn at_scale(diagrams: &PersistenceDiagrams, epsilon: f64) -> Self {
        let top = diagrams.dimensions().max().map_or(0, |d| d + 1);
        let mut betti = vec![0; top];
        for diagram in diagrams.iter() {
            betti[diagram.dimension] = diagram
                .pairs
                .iter()
                .filter(|p| p.birth <= epsilon && epsilon < p.death)
                .count();
        }
        Self { betti, epsilon }
    }

    pub fn get(&self, d: usize) -> usize {
        self.betti.get(d).copied().unwrap_or(0)
    }

    /// Euler characteristic χ = β₀ - β₁ + β₂ - ...
    pub fn euler_characteristic(&self) -> i64 {
        self.betti
            .iter()
            .enumerate()
            .map(|(d, &b)| if d % 2 == 0 { b as i64 } else { -(b as i64) })
            .sum()
    }
}

/// Betti curve: sampled βₖ(t) over a uniform grid
#[derive(Debug, Clone)]
pub struct BettiCurve {
    /// (t, βₖ(t)) samples
    pub values: Vec<(f64, usize)>,
}

impl BettiCurve {
    /// Sample the finite off-diagonal pairs of `diagram` at `n_bins`
    /// evenly spaced points of `range`.
    pub fn from_diagram(diagram: &PersistenceDiagram, range: (f64, f64), n_bins: usize) -> Self {
        let (lo, hi) = range;
        let step = if n_bins > 1 {
            (hi - lo) / (n_bins - 1) as f64
        } else {
            0.0
        };

        let values = (0..n_bins)
            .map(|i| {
                let t = lo + i as f64 * step;
                let beta = diagram
                    .finite_pairs()
                    .filter(|p| p.birth <= t && t < p.death)
                    .count();
                (t, beta)
            })
            .collect();

        Self { values }
    }

    /// Lᵖ norm of the curve (trapezoidal rule)
    pub fn lp_norm(&self, p: f64) -> f64 {
        let samples: Vec<(f64, f64)> = self.values.iter().map(|&(t, b)| (t, b as f64)).collect();
        crate::vectorize::lp_norm(&samples, p)
    }
}
