//! Time-Delay Embedding: Series → Point Clouds
//!
//! Takens' theorem: for a scalar observable x(t) of a dynamical system,
//! the delay vectors
//!
//!   Φ(t) = [x(t), x(t + τ), x(t + 2τ), ..., x(t + (m-1)τ)]
//!
//! reconstruct the attractor up to diffeomorphism for m large enough.
//! Periodic signals become loops, which persistent homology detects as
//! long-lived H₁ features.
//!
//! A sliding window cuts a long series into overlapping segments, each of
//! which becomes one point cloud of a batch.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TdaError};

/// Delay embedding parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakensEmbedding {
    /// Embedding dimension m
    pub dimension: usize,
    /// Delay τ (in samples)
    pub time_delay: usize,
    /// Step between consecutive delay vectors
    #[serde(default = "default_stride")]
    pub stride: usize,
}

fn default_stride() -> usize {
    1
}

impl Default for TakensEmbedding {
    fn default() -> Self {
        Self {
            dimension: 2,
            time_delay: 1,
            stride: default_stride(),
        }
    }
}

impl TakensEmbedding {
    pub fn new(dimension: usize, time_delay: usize) -> Self {
        Self {
            dimension,
            time_delay,
            stride: 1,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 || self.time_delay == 0 || self.stride == 0 {
            return Err(TdaError::invalid_input(format!(
                "embedding dimension, time delay and stride must be positive, got {}, {}, {}",
                self.dimension, self.time_delay, self.stride
            )));
        }
        Ok(())
    }

    /// Samples spanned by one delay vector: (m-1)τ + 1
    pub fn window_span(&self) -> usize {
        self.dimension.saturating_sub(1) * self.time_delay + 1
    }

    /// Embed a series as a point cloud of delay vectors (one per row)
    pub fn embed(&self, series: &[f64]) -> Result<Array2<f64>> {
        self.validate()?;
        if let Some(i) = series.iter().position(|x| !x.is_finite()) {
            return Err(TdaError::invalid_input(format!(
                "non-finite sample {} at index {}",
                series[i], i
            )));
        }

        let span = self.window_span();
        if series.len() < span {
            return Err(TdaError::invalid_input(format!(
                "series of length {} is shorter than the embedding span {}",
                series.len(),
                span
            )));
        }

        let n_points = (series.len() - span) / self.stride + 1;
        let mut points = Array2::<f64>::zeros((n_points, self.dimension));
        for i in 0..n_points {
            let start = i * self.stride;
            for k in 0..self.dimension {
                points[[i, k]] = series[start + k * self.time_delay];
            }
        }

        Ok(points)
    }
}

/// Overlapping windows over a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingWindow {
    /// Samples (or points) per window
    pub size: usize,
    /// Offset between consecutive windows
    pub stride: usize,
}

impl SlidingWindow {
    pub fn new(size: usize, stride: usize) -> Self {
        Self { size, stride }
    }

    fn n_windows(&self, len: usize) -> Result<usize> {
        if self.size == 0 || self.stride == 0 {
            return Err(TdaError::invalid_input(
                "window size and stride must be positive",
            ));
        }
        if len < self.size {
            return Err(TdaError::invalid_input(format!(
                "sequence of length {} is shorter than the window size {}",
                len, self.size
            )));
        }
        Ok((len - self.size) / self.stride + 1)
    }

    /// Split a scalar series into windows
    pub fn windows(&self, series: &[f64]) -> Result<Vec<Vec<f64>>> {
        let n = self.n_windows(series.len())?;
        Ok((0..n)
            .map(|i| series[i * self.stride..i * self.stride + self.size].to_vec())
            .collect())
    }

    /// Split a point cloud (e.g. an embedded series) into windows of rows
    pub fn point_clouds(&self, points: &Array2<f64>) -> Result<Vec<Array2<f64>>> {
        let n = self.n_windows(points.nrows())?;
        Ok((0..n)
            .map(|i| {
                let start = i * self.stride;
                points.slice(s![start..start + self.size, ..]).to_owned()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_embed_shape_and_values() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let points = TakensEmbedding::new(3, 2).embed(&series).unwrap();

        // span = 5, so 6 delay vectors
        assert_eq!(points.dim(), (6, 3));
        assert_eq!(points.row(0).to_vec(), vec![0.0, 2.0, 4.0]);
        assert_eq!(points.row(5).to_vec(), vec![5.0, 7.0, 9.0]);

        let strided = TakensEmbedding::new(3, 2).with_stride(2).embed(&series).unwrap();
        assert_eq!(strided.dim(), (3, 3));
        assert_eq!(strided.row(2).to_vec(), vec![4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_embed_errors() {
        let series = vec![1.0, 2.0, 3.0];
        assert!(TakensEmbedding::new(3, 2).embed(&series).is_err());
        assert!(TakensEmbedding::new(0, 1).embed(&series).is_err());
        assert!(TakensEmbedding::new(2, 1).embed(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_window_span() {
        assert_eq!(TakensEmbedding::new(3, 2).window_span(), 5);
        assert_eq!(TakensEmbedding::new(0, 4).window_span(), 1);
    }

    #[test]
    fn test_periodic_signal_forms_loop() {
        // sin embedded with a quarter-period delay traces the unit circle
        let period = 40;
        let series: Vec<f64> = (0..200)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect();
        let points = TakensEmbedding::new(2, period / 4).embed(&series).unwrap();

        for row in points.outer_iter() {
            let r = (row[0] * row[0] + row[1] * row[1]).sqrt();
            assert!((r - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sliding_window() {
        let series: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let windows = SlidingWindow::new(3, 2).windows(&series).unwrap();
        assert_eq!(
            windows,
            vec![vec![0.0, 1.0, 2.0], vec![2.0, 3.0, 4.0], vec![4.0, 5.0, 6.0]]
        );

        let points = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let clouds = SlidingWindow::new(2, 1).point_clouds(&points).unwrap();
        assert_eq!(clouds.len(), 3);
        assert_eq!(clouds[2], array![[2.0, 2.0], [3.0, 3.0]]);

        assert!(SlidingWindow::new(10, 1).windows(&series).is_err());
    }
}
