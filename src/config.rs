//! Pipeline Configuration
//!
//! Serde-based JSON configuration for the batch pipeline. Every field has
//! a default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "homology_dimensions": [0, 1],
//!   "max_scale": null,
//!   "metric": "euclidean",
//!   "collapse_edges": false,
//!   "n_parallel_workers": 1,
//!   "vectorizer": {
//!     "methods": ["entropy", "count", "amplitude:wasserstein"],
//!     "entropy_fill_value": 0.0,
//!     "normalize_entropy": false,
//!     "filtration_range": null
//!   },
//!   "embedding": null
//! }
//! ```
//!
//! Validation happens once, before any item of a batch runs.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embedding::TakensEmbedding;
use crate::error::{Result, TdaError};
use crate::topology::{Metric, PersistenceConfig};
use crate::vectorize::{EntropyOptions, Vectorization, VectorizerConfig};

/// Root configuration for the persistence pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Homology dimensions to compute, in output order
    #[serde(default = "default_homology_dimensions")]
    pub homology_dimensions: Vec<usize>,

    /// Filtration cap; `None` means unbounded
    #[serde(default)]
    pub max_scale: Option<f64>,

    /// Distance metric name (see [`Metric`])
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Apply edge collapse before expansion
    #[serde(default)]
    pub collapse_edges: bool,

    /// Worker threads for batch execution
    #[serde(default = "default_n_parallel_workers")]
    pub n_parallel_workers: usize,

    #[serde(default)]
    pub vectorizer: VectorizerSettings,

    /// Delay embedding for scalar series inputs
    #[serde(default)]
    pub embedding: Option<TakensEmbedding>,
}

/// Vectorizer section of [`PipelineConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSettings {
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    #[serde(default = "default_entropy_fill_value")]
    pub entropy_fill_value: Option<f64>,

    #[serde(default)]
    pub normalize_entropy: bool,

    #[serde(default)]
    pub filtration_range: Option<(f64, f64)>,
}

fn default_homology_dimensions() -> Vec<usize> {
    vec![0, 1]
}

fn default_metric() -> String {
    "euclidean".to_string()
}

fn default_n_parallel_workers() -> usize {
    1
}

fn default_methods() -> Vec<String> {
    vec![
        "entropy".to_string(),
        "count".to_string(),
        "amplitude:wasserstein".to_string(),
    ]
}

fn default_entropy_fill_value() -> Option<f64> {
    Some(0.0)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            homology_dimensions: default_homology_dimensions(),
            max_scale: None,
            metric: default_metric(),
            collapse_edges: false,
            n_parallel_workers: default_n_parallel_workers(),
            vectorizer: VectorizerSettings::default(),
            embedding: None,
        }
    }
}

impl Default for VectorizerSettings {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            entropy_fill_value: default_entropy_fill_value(),
            normalize_entropy: false,
            filtration_range: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.homology_dimensions.is_empty() {
            return Err(TdaError::config("homology_dimensions must not be empty"));
        }
        let unique: BTreeSet<usize> = self.homology_dimensions.iter().copied().collect();
        if unique.len() != self.homology_dimensions.len() {
            return Err(TdaError::config(format!(
                "duplicate entries in homology_dimensions {:?}",
                self.homology_dimensions
            )));
        }

        if self.n_parallel_workers == 0 {
            return Err(TdaError::config("n_parallel_workers must be at least 1"));
        }

        if let Some(scale) = self.max_scale {
            if !(scale > 0.0) {
                return Err(TdaError::config(format!(
                    "max_scale must be positive, got {}",
                    scale
                )));
            }
        }

        self.metric()?;
        self.vectorizer_config()?.validate()?;

        if let Some(embedding) = &self.embedding {
            embedding
                .validate()
                .map_err(|e| TdaError::config(format!("embedding: {}", e)))?;
        }

        Ok(())
    }

    /// Parsed distance metric
    pub fn metric(&self) -> Result<Metric> {
        self.metric.parse()
    }

    /// Options for the persistence engine
    pub fn persistence_config(&self) -> Result<PersistenceConfig> {
        Ok(PersistenceConfig {
            homology_dimensions: self.homology_dimensions.clone(),
            max_scale: self.max_scale,
            metric: self.metric()?,
            collapse_edges: self.collapse_edges,
        })
    }

    /// Options for the diagram vectorizer
    pub fn vectorizer_config(&self) -> Result<VectorizerConfig> {
        let methods = self
            .vectorizer
            .methods
            .iter()
            .map(|m| m.parse::<Vectorization>())
            .collect::<Result<Vec<_>>>()?;

        Ok(VectorizerConfig {
            methods,
            homology_dimensions: self.homology_dimensions.clone(),
            entropy: EntropyOptions {
                fill_value: self.vectorizer.entropy_fill_value,
                normalize: self.vectorizer.normalize_entropy,
            },
            filtration_range: self.vectorizer.filtration_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::AmplitudeMetric;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.homology_dimensions, vec![0, 1]);
        assert_eq!(config.n_parallel_workers, 1);
        assert_eq!(config.vectorizer.entropy_fill_value, Some(0.0));
        assert!(config.validate().is_ok());

        let vectorizer = config.vectorizer_config().unwrap();
        assert_eq!(
            vectorizer.methods,
            vec![
                Vectorization::Entropy,
                Vectorization::Count,
                Vectorization::Amplitude(AmplitudeMetric::Wasserstein { p: 2.0 }),
            ]
        );
        assert_eq!(vectorizer.output_len(), 6);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig {
            max_scale: Some(1.5),
            collapse_edges: true,
            embedding: Some(TakensEmbedding::new(3, 4).with_stride(2)),
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json() {
        let config = PipelineConfig::from_json(
            r#"{
                "homology_dimensions": [1],
                "max_scale": 2.5,
                "metric": "manhattan",
                "vectorizer": { "methods": ["amplitude:bottleneck"], "entropy_fill_value": null },
                "embedding": { "dimension": 3, "time_delay": 2 }
            }"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.metric().unwrap(), Metric::Manhattan);
        assert_eq!(config.vectorizer.entropy_fill_value, None);
        assert_eq!(config.embedding, Some(TakensEmbedding::new(3, 2)));

        let persistence = config.persistence_config().unwrap();
        assert_eq!(persistence.max_scale, Some(2.5));
        assert_eq!(persistence.homology_dimensions, vec![1]);
    }

    #[test]
    fn test_validation_errors() {
        let invalid = [
            r#"{ "homology_dimensions": [] }"#,
            r#"{ "homology_dimensions": [0, 1, 0] }"#,
            r#"{ "n_parallel_workers": 0 }"#,
            r#"{ "max_scale": 0.0 }"#,
            r#"{ "max_scale": -1.0 }"#,
            r#"{ "vectorizer": { "methods": [] } }"#,
            r#"{ "embedding": { "dimension": 0, "time_delay": 1 } }"#,
        ];
        for json in invalid {
            let config = PipelineConfig::from_json(json).unwrap();
            assert!(
                matches!(config.validate(), Err(TdaError::InvalidConfig(_))),
                "{} should be rejected",
                json
            );
        }

        let config = PipelineConfig::from_json(r#"{ "metric": "hamming" }"#).unwrap();
        assert!(matches!(config.validate(), Err(TdaError::UnknownMetric(_))));

        let config =
            PipelineConfig::from_json(r#"{ "vectorizer": { "methods": ["kurtosis"] } }"#).unwrap();
        assert!(matches!(config.validate(), Err(TdaError::UnknownMetric(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "collapse_edges": true, "n_parallel_workers": 4 }}"#).unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert!(config.collapse_edges);
        assert_eq!(config.n_parallel_workers, 4);

        assert!(matches!(
            PipelineConfig::from_file(file.path().with_extension("missing")),
            Err(TdaError::Io(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json("{ not json"),
            Err(TdaError::Serialization(_))
        ));
    }
}
