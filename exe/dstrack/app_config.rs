use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file format. Every field can be omitted; command-line flags override it.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
  /// Seed for splitting and data generation
  pub seed: Option<u64>,
  /// Share of rows held out for evaluation
  pub test_ratio: Option<f64>,
  /// Rows of the synthetic spam dataset
  pub samples: Option<usize>,
  pub logistic_regression: LogisticSection,
  pub random_forest: ForestSection,
  /// Directory charts are written to
  pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogisticSection {
  pub max_iterations: Option<u64>,
  pub alpha: Option<f64>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestSection {
  pub n_estimators: Option<usize>,
  pub max_depth: Option<usize>,
  pub feature_fraction: Option<f64>,
}

impl AppConfig {
  pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
      .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    Ok(serde_yaml::from_str(&text)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      seed: other.seed.or(self.seed),
      test_ratio: other.test_ratio.or(self.test_ratio),
      samples: other.samples.or(self.samples),
      logistic_regression: LogisticSection {
        max_iterations: other
          .logistic_regression
          .max_iterations
          .or(self.logistic_regression.max_iterations),
        alpha: other.logistic_regression.alpha.or(self.logistic_regression.alpha),
      },
      random_forest: ForestSection {
        n_estimators: other
          .random_forest
          .n_estimators
          .or(self.random_forest.n_estimators),
        max_depth: other.random_forest.max_depth.or(self.random_forest.max_depth),
        feature_fraction: other
          .random_forest
          .feature_fraction
          .or(self.random_forest.feature_fraction),
      },
      output_dir: other.output_dir.or(self.output_dir),
    }
  }
}
