//! Amplitudes: Distance of a Diagram to the Empty Diagram
//!
//! The empty diagram has all its mass on the diagonal Δ. The amplitude of
//! a diagram D under a metric is its distance to Δ:
//!
//! - **Bottleneck**: max over points of the L∞ distance to Δ,
//!   i.e. maxᵢ (dᵢ - bᵢ) / 2
//! - **Wasserstein**: (Σᵢ ((dᵢ - bᵢ) / 2)ᵖ)^(1/p); each point is matched
//!   to its diagonal projection, which is the optimal matching to Δ
//! - **Landscape**: (Σₖ ‖λₖ‖ₚᵖ)^(1/p) over sampled landscape layers
//! - **Betti**: ‖β(t)‖ₚ of the sampled Betti curve
//! - **Silhouette**: ‖φ(t)‖ₚ of the power-weighted silhouette
//! - **Persistence image**: ‖I‖ₚ of the persistence image in
//!   (birth, persistence) coordinates, Gaussian kernel of width σ and
//!   linear persistence weight
//!
//! Only finite off-diagonal points contribute. The empty diagram has
//! amplitude 0 under every metric.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TdaError};
use crate::topology::{BettiCurve, PersistenceDiagram};

use super::landscape::{silhouette, PersistenceLandscape};
use super::{lp_norm, sampling_grid};

/// Default exponent for Lᵖ-type amplitudes
pub const DEFAULT_P: f64 = 2.0;
/// Default grid resolution for sampled amplitudes
pub const DEFAULT_N_BINS: usize = 100;
/// Default number of landscape layers
pub const DEFAULT_N_LAYERS: usize = 1;
/// Default Gaussian width for persistence images
pub const DEFAULT_SIGMA: f64 = 0.1;

/// Amplitude metric and its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmplitudeMetric {
    Bottleneck,
    Wasserstein { p: f64 },
    Landscape { p: f64, n_layers: usize, n_bins: usize },
    Betti { p: f64, n_bins: usize },
    Silhouette { p: f64, power: f64, n_bins: usize },
    PersistenceImage { p: f64, sigma: f64, n_bins: usize },
}

impl AmplitudeMetric {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        let (p, n_bins) = match *self {
            AmplitudeMetric::Bottleneck => return Ok(()),
            AmplitudeMetric::Wasserstein { p } => (p, 2),
            AmplitudeMetric::Landscape { p, n_layers, n_bins } => {
                if n_layers == 0 {
                    return Err(TdaError::invalid_input("landscape needs at least one layer"));
                }
                (p, n_bins)
            }
            AmplitudeMetric::Betti { p, n_bins } => (p, n_bins),
            AmplitudeMetric::Silhouette { p, power, n_bins } => {
                if !(power >= 0.0 && power.is_finite()) {
                    return Err(TdaError::invalid_input(format!(
                        "silhouette power must be finite and non-negative, got {}",
                        power
                    )));
                }
                (p, n_bins)
            }
            AmplitudeMetric::PersistenceImage { p, sigma, n_bins } => {
                if !(sigma > 0.0 && sigma.is_finite()) {
                    return Err(TdaError::invalid_input(format!(
                        "persistence image sigma must be positive, got {}",
                        sigma
                    )));
                }
                (p, n_bins)
            }
        };

        if !(p >= 1.0 && p.is_finite()) {
            return Err(TdaError::invalid_input(format!(
                "amplitude exponent must be a finite value >= 1, got {}",
                p
            )));
        }
        if n_bins < 2 {
            return Err(TdaError::invalid_input(format!(
                "sampled amplitudes need at least 2 bins, got {}",
                n_bins
            )));
        }
        Ok(())
    }
}

impl FromStr for AmplitudeMetric {
    type Err = TdaError;

    /// `name` or `name:p`, e.g. `"wasserstein:1"`
    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (name, p) = match spec.split_once(':') {
            Some((name, p)) => {
                let p = p.parse::<f64>().map_err(|_| {
                    TdaError::invalid_input(format!("invalid exponent in amplitude '{}'", spec))
                })?;
                (name, p)
            }
            None => (spec, DEFAULT_P),
        };

        let metric = match name.to_ascii_lowercase().as_str() {
            "bottleneck" => AmplitudeMetric::Bottleneck,
            "wasserstein" => AmplitudeMetric::Wasserstein { p },
            "landscape" => AmplitudeMetric::Landscape {
                p,
                n_layers: DEFAULT_N_LAYERS,
                n_bins: DEFAULT_N_BINS,
            },
            "betti" => AmplitudeMetric::Betti {
                p,
                n_bins: DEFAULT_N_BINS,
            },
            "silhouette" => AmplitudeMetric::Silhouette {
                p,
                power: 1.0,
                n_bins: DEFAULT_N_BINS,
            },
            "persistence_image" | "heat" => AmplitudeMetric::PersistenceImage {
                p,
                sigma: DEFAULT_SIGMA,
                n_bins: DEFAULT_N_BINS,
            },
            _ => return Err(TdaError::unknown_metric(spec)),
        };

        metric.validate()?;
        Ok(metric)
    }
}

impl fmt::Display for AmplitudeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmplitudeMetric::Bottleneck => write!(f, "bottleneck"),
            AmplitudeMetric::Wasserstein { p } => write!(f, "wasserstein:{}", p),
            AmplitudeMetric::Landscape { p, .. } => write!(f, "landscape:{}", p),
            AmplitudeMetric::Betti { p, .. } => write!(f, "betti:{}", p),
            AmplitudeMetric::Silhouette { p, .. } => write!(f, "silhouette:{}", p),
            AmplitudeMetric::PersistenceImage { p, .. } => write!(f, "persistence_image:{}", p),
        }
    }
}

/// Amplitude of the finite part of `diagram`.
///
/// Sampled metrics use `range` as sampling range when given, otherwise
/// the diagram's own [min birth, max death].
pub fn amplitude(
    diagram: &PersistenceDiagram,
    metric: &AmplitudeMetric,
    range: Option<(f64, f64)>,
) -> Result<f64> {
    metric.validate()?;

    let lifetimes = diagram.lifetimes();
    if lifetimes.is_empty() {
        return Ok(0.0);
    }

    let value = match *metric {
        AmplitudeMetric::Bottleneck => lifetimes.iter().cloned().fold(0.0, f64::max) / 2.0,
        AmplitudeMetric::Wasserstein { p } => lifetimes
            .iter()
            .map(|l| (l / 2.0).powf(p))
            .sum::<f64>()
            .powf(1.0 / p),
        AmplitudeMetric::Landscape { p, n_layers, n_bins } => {
            PersistenceLandscape::from_diagram(diagram, n_layers, n_bins, range).norm(p)
        }
        AmplitudeMetric::Betti { p, n_bins } => {
            let range = range.or_else(|| diagram.finite_range()).unwrap_or((0.0, 0.0));
            BettiCurve::from_diagram(diagram, range, n_bins).lp_norm(p)
        }
        AmplitudeMetric::Silhouette { p, power, n_bins } => {
            lp_norm(&silhouette(diagram, power, n_bins, range), p)
        }
        AmplitudeMetric::PersistenceImage { p, sigma, n_bins } => {
            persistence_image_norm(diagram, sigma, n_bins, p, range)
        }
    };

    Ok(value)
}

/// Persistence image on an n_bins × n_bins grid over
/// [lo, hi] × [0, hi - lo], as (pixel values, cell area)
pub fn persistence_image(
    diagram: &PersistenceDiagram,
    sigma: f64,
    n_bins: usize,
    range: Option<(f64, f64)>,
) -> (Vec<Vec<f64>>, f64) {
    let (lo, hi) = match range.or_else(|| diagram.finite_range()) {
        Some(range) => range,
        None => return (vec![vec![0.0; n_bins]; n_bins], 0.0),
    };

    let births = sampling_grid((lo, hi), n_bins);
    let persistences = sampling_grid((0.0, hi - lo), n_bins);
    let cell = if n_bins > 1 {
        let step = (hi - lo) / (n_bins - 1) as f64;
        step * step
    } else {
        0.0
    };

    let points: Vec<(f64, f64)> = diagram
        .finite_pairs()
        .map(|p| (p.birth, p.persistence()))
        .collect();
    let norm = 1.0 / (2.0 * PI * sigma * sigma);

    let image: Vec<Vec<f64>> = persistences
        .iter()
        .map(|&y| {
            births
                .iter()
                .map(|&x| {
                    points
                        .iter()
                        .map(|&(b, l)| {
                            let r2 = (x - b).powi(2) + (y - l).powi(2);
                            l * norm * (-r2 / (2.0 * sigma * sigma)).exp()
                        })
                        .sum::<f64>()
                })
                .collect()
        })
        .collect();

    (image, cell)
}

fn persistence_image_norm(
    diagram: &PersistenceDiagram,
    sigma: f64,
    n_bins: usize,
    p: f64,
    range: Option<(f64, f64)>,
) -> f64 {
    let (image, cell) = persistence_image(diagram, sigma, n_bins, range);
    let total: f64 = image
        .iter()
        .flatten()
        .map(|v| v.abs().powf(p) * cell)
        .sum();
    total.powf(1.0 / p)
}
