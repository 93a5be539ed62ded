//! Point Clouds and Distance Matrices
//!
//! A point cloud X = {x₀, ..., xₙ₋₁} ⊂ ℝᵈ is stored row-wise in an
//! `Array2<f64>`. The only geometry the Vietoris-Rips construction needs
//! is the pairwise distance matrix D, with Dᵢⱼ = d(xᵢ, xⱼ).
//!
//! ## Invariants
//!
//! A [`DistanceMatrix`] is square, symmetric, finite, non-negative and has
//! a zero diagonal. The triangle inequality is not checked: it is not
//! needed for the persistence computation to be well defined, only for
//! the resulting topology to be meaningful.

use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TdaError};

/// Absolute tolerance for the symmetry and zero-diagonal checks on
/// precomputed matrices.
pub const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Distance function between points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metric {
    /// L² distance
    #[default]
    Euclidean,
    /// L¹ distance
    Manhattan,
    /// L∞ distance
    Chebyshev,
    /// Lᵖ distance, p ≥ 1
    Minkowski(f64),
    /// 1 - cos(xᵢ, xⱼ)
    Cosine,
    /// Input already is a distance matrix
    Precomputed,
}

impl Metric {
    /// Check metric parameters: a Minkowski exponent must be finite and ≥ 1.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Metric::Minkowski(p) if !(p >= 1.0 && p.is_finite()) => {
                Err(TdaError::invalid_input(format!(
                    "Minkowski exponent must be a finite value >= 1, got {}",
                    p
                )))
            }
            _ => Ok(()),
        }
    }

    /// Distance between two coordinate rows.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
        match *self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
            Metric::Chebyshev => diffs.fold(0.0, f64::max),
            Metric::Minkowski(p) => diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p),
            Metric::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let nb: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                (1.0 - dot / (na * nb)).max(0.0)
            }
            Metric::Precomputed => 0.0,
        }
    }
}

impl FromStr for Metric {
    type Err = TdaError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
            "chebyshev" | "linf" => Ok(Metric::Chebyshev),
            "cosine" => Ok(Metric::Cosine),
            "precomputed" => Ok(Metric::Precomputed),
            other => {
                let p = other
                    .strip_prefix("minkowski:")
                    .and_then(|p| p.parse::<f64>().ok())
                    .ok_or_else(|| TdaError::unknown_metric(name))?;
                let metric = Metric::Minkowski(p);
                metric.validate()?;
                Ok(metric)
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Euclidean => write!(f, "euclidean"),
            Metric::Manhattan => write!(f, "manhattan"),
            Metric::Chebyshev => write!(f, "chebyshev"),
            Metric::Minkowski(p) => write!(f, "minkowski:{}", p),
            Metric::Cosine => write!(f, "cosine"),
            Metric::Precomputed => write!(f, "precomputed"),
        }
    }
}

/// Check that a point cloud is non-empty and finite.
pub fn validate_points(points: &Array2<f64>) -> Result<()> {
    if points.nrows() == 0 {
        return Err(TdaError::invalid_input("point cloud is empty"));
    }
    if points.ncols() == 0 {
        return Err(TdaError::invalid_input("points have zero coordinates"));
    }
    if let Some(((row, col), value)) = points.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(TdaError::invalid_input(format!(
            "non-finite coordinate {} at point {}, axis {}",
            value, row, col
        )));
    }
    Ok(())
}

/// Stack equal-length rows into an `Array2`
pub fn array_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let ncols = rows.first().map_or(0, |r| r.len());
    if let Some(i) = rows.iter().position(|r| r.len() != ncols) {
        return Err(TdaError::invalid_input(format!(
            "row {} has {} entries, expected {}",
            i,
            rows[i].len(),
            ncols
        )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|e| TdaError::invalid_input(e.to_string()))
}

/// Validated pairwise distance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    distances: Array2<f64>,
}

impl DistanceMatrix {
    /// Compute the distance matrix of a point cloud under `metric`
    pub fn from_points(points: &Array2<f64>, metric: Metric) -> Result<Self> {
        validate_points(points)?;
        metric.validate()?;
        if metric == Metric::Precomputed {
            return Err(TdaError::invalid_input(
                "metric 'precomputed' expects a distance matrix, not points",
            ));
        }

        let n = points.nrows();
        let rows: Vec<Vec<f64>> = points.outer_iter().map(|r| r.to_vec()).collect();

        if metric == Metric::Cosine {
            if let Some(i) = rows.iter().position(|r| r.iter().all(|&x| x == 0.0)) {
                return Err(TdaError::invalid_input(format!(
                    "cosine distance undefined for zero vector at point {}",
                    i
                )));
            }
        }

        let mut dm = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i + 1..n {
                let dist = metric.distance(&rows[i], &rows[j]);
                dm[[i, j]] = dist;
                dm[[j, i]] = dist;
            }
        }

        Ok(Self { distances: dm })
    }

    /// Validate a precomputed matrix
    pub fn from_matrix(matrix: Array2<f64>) -> Result<Self> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(TdaError::invalid_input("distance matrix is empty"));
        }
        if matrix.ncols() != n {
            return Err(TdaError::invalid_input(format!(
                "distance matrix must be square, got {}x{}",
                n,
                matrix.ncols()
            )));
        }

        let mut distances = matrix;
        for i in 0..n {
            if !distances[[i, i]].is_finite() || distances[[i, i]].abs() > DISTANCE_TOLERANCE {
                return Err(TdaError::invalid_input(format!(
                    "diagonal entry {} is {}, expected 0",
                    i,
                    distances[[i, i]]
                )));
            }
            distances[[i, i]] = 0.0;

            for j in i + 1..n {
                let (dij, dji) = (distances[[i, j]], distances[[j, i]]);
                if !dij.is_finite() || !dji.is_finite() {
                    return Err(TdaError::invalid_input(format!(
                        "non-finite distance between {} and {}",
                        i, j
                    )));
                }
                if dij < 0.0 || dji < 0.0 {
                    return Err(TdaError::invalid_input(format!(
                        "negative distance between {} and {}",
                        i, j
                    )));
                }
                if (dij - dji).abs() > DISTANCE_TOLERANCE {
                    return Err(TdaError::invalid_input(format!(
                        "distance matrix not symmetric at ({}, {}): {} vs {}",
                        i, j, dij, dji
                    )));
                }
                let d = dij.max(dji);
                distances[[i, j]] = d;
                distances[[j, i]] = d;
            }
        }

        Ok(Self { distances })
    }

    /// Number of points
    pub fn n_points(&self) -> usize {
        self.distances.nrows()
    }

    /// Distance between points `i` and `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[[i, j]]
    }

    /// Largest pairwise distance (diameter of the cloud)
    pub fn diameter(&self) -> f64 {
        self.distances.iter().cloned().fold(0.0, f64::max)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_euclidean_matrix() {
        let points = array![[0.0, 0.0], [3.0, 4.0], [0.0, 4.0]];
        let dm = DistanceMatrix::from_points(&points, Metric::Euclidean).unwrap();

        assert!((dm.get(0, 1) - 5.0).abs() < 1e-12);
        assert!((dm.get(1, 2) - 3.0).abs() < 1e-12);
        assert_eq!(dm.get(2, 2), 0.0);
        assert_eq!(dm.get(0, 1), dm.get(1, 0));
        assert!((dm.diameter() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_other_metrics() {
        let points = array![[0.0, 0.0], [3.0, 4.0]];
        let l1 = DistanceMatrix::from_points(&points, Metric::Manhattan).unwrap();
        let linf = DistanceMatrix::from_points(&points, Metric::Chebyshev).unwrap();
        let l2 = DistanceMatrix::from_points(&points, Metric::Minkowski(2.0)).unwrap();

        assert!((l1.get(0, 1) - 7.0).abs() < 1e-12);
        assert!((linf.get(0, 1) - 4.0).abs() < 1e-12);
        assert!((l2.get(0, 1) - 5.0).abs() < 1e-12);

        let orthogonal = array![[1.0, 0.0], [0.0, 2.0]];
        let cos = DistanceMatrix::from_points(&orthogonal, Metric::Cosine).unwrap();
        assert!((cos.get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_minkowski_exponent() {
        let points = array![[0.0, 0.0], [3.0, 4.0]];
        for p in [0.0, 0.5, -2.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    DistanceMatrix::from_points(&points, Metric::Minkowski(p)),
                    Err(TdaError::InvalidInput(_))
                ),
                "p = {}",
                p
            );
        }
        assert!(Metric::Minkowski(1.0).validate().is_ok());
    }

    #[test]
    fn test_metric_names() {
        assert_eq!("euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert_eq!("Cityblock".parse::<Metric>().unwrap(), Metric::Manhattan);
        assert_eq!("minkowski:3".parse::<Metric>().unwrap(), Metric::Minkowski(3.0));
        assert!(matches!(
            "hamming".parse::<Metric>(),
            Err(TdaError::UnknownMetric(_))
        ));
        assert!(matches!(
            "minkowski:0.5".parse::<Metric>(),
            Err(TdaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_points() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            DistanceMatrix::from_points(&empty, Metric::Euclidean),
            Err(TdaError::InvalidInput(_))
        ));

        let nan = array![[0.0, f64::NAN], [1.0, 1.0]];
        assert!(matches!(
            DistanceMatrix::from_points(&nan, Metric::Euclidean),
            Err(TdaError::InvalidInput(_))
        ));

        let inf = array![[0.0, 0.0], [f64::INFINITY, 1.0]];
        assert!(DistanceMatrix::from_points(&inf, Metric::Euclidean).is_err());
    }

    #[test]
    fn test_rows_to_array() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(array_from_rows(&rows).unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);

        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(array_from_rows(&ragged).is_err());
    }

    #[test]
    fn test_precomputed_validation() {
        let ok = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(DistanceMatrix::from_matrix(ok).is_ok());

        let asymmetric = array![[0.0, 1.0], [2.0, 0.0]];
        assert!(DistanceMatrix::from_matrix(asymmetric).is_err());

        let diagonal = array![[1.0, 1.0], [1.0, 0.0]];
        assert!(DistanceMatrix::from_matrix(diagonal).is_err());

        let negative = array![[0.0, -1.0], [-1.0, 0.0]];
        assert!(DistanceMatrix::from_matrix(negative).is_err());

        let rectangular = Array2::<f64>::zeros((2, 3));
        assert!(DistanceMatrix::from_matrix(rectangular).is_err());
    }
}
