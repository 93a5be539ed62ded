//! Persistence Landscapes and Silhouettes: Functional Summaries
//!
//! Each finite point (b, d) contributes a tent function
//!
//!   Λ(t) = max(0, min(t - b, d - t))
//!
//! The k-th landscape layer λₖ(t) is the k-th largest tent value at t.
//! The silhouette is the weighted mean of the tents with weights
//! wᵢ = (dᵢ - bᵢ)^q.
//!
//! Both are sampled on a uniform grid over a sampling range, giving
//! stable, vectorizable representations of the diagram.

use crate::topology::PersistenceDiagram;

use super::{lp_norm, sampling_grid};

/// Persistence landscape representation
#[derive(Debug, Clone)]
pub struct PersistenceLandscape {
    /// Landscape functions λₖ(t) for k = 1, 2, ...
    pub functions: Vec<Vec<(f64, f64)>>,
    /// Number of landscape functions
    pub n_layers: usize,
    /// Grid resolution
    pub n_bins: usize,
}

impl PersistenceLandscape {
    /// Compute persistence landscape of the finite pairs
    ///
    /// Without a `range`, the grid spans [min birth, max death].
    pub fn from_diagram(
        pd: &PersistenceDiagram,
        n_layers: usize,
        n_bins: usize,
        range: Option<(f64, f64)>,
    ) -> Self {
        let intervals: Vec<(f64, f64)> = pd.finite_pairs().map(|p| (p.birth, p.death)).collect();

        let grid = match range.or_else(|| pd.finite_range()) {
            Some(range) => sampling_grid(range, n_bins),
            None => {
                return Self {
                    functions: vec![vec![(0.0, 0.0)]; n_layers],
                    n_layers,
                    n_bins,
                }
            }
        };

        let mut functions = vec![Vec::with_capacity(grid.len()); n_layers];

        for &t in &grid {
            // Tent function values for all intervals, sorted descending
            let mut values: Vec<f64> = intervals
                .iter()
                .map(|&(b, d)| tent_function(t, b, d))
                .collect();
            values.sort_by(|a, b| b.total_cmp(a));

            for (k, func) in functions.iter_mut().enumerate() {
                let lambda_k = values.get(k).copied().unwrap_or(0.0);
                func.push((t, lambda_k));
            }
        }

        Self {
            functions,
            n_layers,
            n_bins,
        }
    }

    /// Lᵖ norm of the k-th landscape function
    pub fn lp_norm(&self, k: usize, p: f64) -> f64 {
        self.functions.get(k).map_or(0.0, |func| lp_norm(func, p))
    }

    /// (Σₖ ‖λₖ‖ₚᵖ)^(1/p)
    pub fn norm(&self, p: f64) -> f64 {
        let total: f64 = (0..self.n_layers).map(|k| self.lp_norm(k, p).powf(p)).sum();
        total.powf(1.0 / p)
    }
}

/// Power-weighted silhouette sampled on a grid
pub fn silhouette(
    pd: &PersistenceDiagram,
    power: f64,
    n_bins: usize,
    range: Option<(f64, f64)>,
) -> Vec<(f64, f64)> {
    // Weights relative to the longest lifetime stay in [0, 1] for any power ≥ 0
    let l_max = pd.max_persistence();
    let intervals: Vec<(f64, f64, f64)> = pd
        .finite_pairs()
        .filter(|p| p.persistence() > 0.0)
        .map(|p| (p.birth, p.death, (p.persistence() / l_max).powf(power)))
        .collect();

    let range = match range.or_else(|| pd.finite_range()) {
        Some(range) if !intervals.is_empty() => range,
        _ => return vec![(0.0, 0.0)],
    };
    let total_weight: f64 = intervals.iter().map(|&(_, _, w)| w).sum();

    sampling_grid(range, n_bins)
        .into_iter()
        .map(|t| {
            let weighted: f64 = intervals
                .iter()
                .map(|&(b, d, w)| w * tent_function(t, b, d))
                .sum();
            (t, weighted / total_weight)
        })
        .collect()
}

/// Tent function for persistence interval
fn tent_function(t: f64, birth: f64, death: f64) -> f64 {
    let mid = (birth + death) / 2.0;

    if t < birth || t > death {
        0.0
    } else if t <= mid {
        t - birth
    } else {
        death - t
    }
}
