use linfa::traits::{Fit, Predict};
use linfa_ensemble::{EnsembleLearner, EnsembleLearnerParams};
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{check_feature_count, check_training_data, Classifier};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
  pub n_estimators: usize,
  /// Unlimited when `None`.
  pub max_depth: Option<usize>,
  /// Share of feature columns each tree sees. Defaults to sqrt(n_features) columns.
  pub feature_fraction: Option<f64>,
  pub seed: u64,
}

impl Default for ForestConfig {
  fn default() -> Self {
    Self {
      n_estimators: 100,
      max_depth: None,
      feature_fraction: None,
      seed: 42,
    }
  }
}

impl ForestConfig {
  fn features_per_tree(&self, n_features: usize) -> Result<usize> {
    let wanted = match self.feature_fraction {
      Some(f) if f > 0.0 && f <= 1.0 => (f * n_features as f64).round(),
      Some(f) => {
        return Err(Error::Config(format!(
          "feature_fraction must lie in (0, 1], got {}",
          f
        )))
      }
      None => (n_features as f64).sqrt().round(),
    };
    Ok((wanted as usize).clamp(1, n_features))
  }
}

/// Bagged decision trees from `linfa-ensemble`: every tree sees a bootstrap sample of the
/// rows and a random subset of the columns, and prediction is the majority vote.
pub struct RandomForest {
  config: ForestConfig,
  fitted: Option<Fitted>,
}

struct Fitted {
  n_features: usize,
  model: EnsembleLearner<DecisionTree<f64, usize>>,
}

impl RandomForest {
  pub fn new(config: ForestConfig) -> Self {
    Self {
      config,
      fitted: None,
    }
  }
}

impl Classifier for RandomForest {
  fn name(&self) -> &'static str {
    "random forest"
  }

  fn fit(&mut self, records: &Array2<f64>, targets: &Array1<usize>) -> Result<()> {
    check_training_data(records, targets)?;
    if self.config.n_estimators == 0 {
      return Err(Error::Config("n_estimators must be positive".into()));
    }
    let (n_rows, n_features) = records.dim();
    let per_tree = self.config.features_per_tree(n_features)?;
    debug!(config = ?self.config, per_tree, rows = n_rows, "fitting random forest");

    let dataset = linfa::Dataset::new(records.clone(), targets.clone());
    let model = EnsembleLearnerParams::new_fixed_rng(
      DecisionTree::<f64, usize>::params().max_depth(self.config.max_depth),
      StdRng::seed_from_u64(self.config.seed),
    )
    .ensemble_size(self.config.n_estimators)
    .bootstrap_proportion(1.0)
    .feature_proportion(per_tree as f64 / n_features as f64)
    .fit(&dataset)
    .map_err(|e| Error::Fit(format!("random forest: {}", e)))?;

    info!("random forest fitted: {} trees", self.config.n_estimators);
    self.fitted = Some(Fitted { n_features, model });
    Ok(())
  }

  fn predict(&self, records: &Array2<f64>) -> Result<Array1<usize>> {
    let fitted = self.fitted.as_ref().ok_or(Error::NotFitted)?;
    check_feature_count(fitted.n_features, records)?;
    Ok(fitted.model.predict(records))
  }

  fn is_fitted(&self) -> bool {
    self.fitted.is_some()
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  fn blobs() -> (Array2<f64>, Array1<usize>) {
    let x = array![
      [0.0, 0.0, 1.0],
      [0.5, 0.2, 0.0],
      [0.1, 0.4, 1.0],
      [0.3, 0.1, 0.0],
      [9.0, 9.5, 1.0],
      [9.4, 9.1, 0.0],
      [8.8, 9.9, 1.0],
      [9.9, 8.7, 0.0]
    ];
    (x, array![0, 0, 0, 0, 1, 1, 1, 1])
  }

  #[test]
  fn all_features_per_tree_separates_blobs() {
    let (x, y) = blobs();
    let mut forest = RandomForest::new(ForestConfig {
      n_estimators: 15,
      feature_fraction: Some(1.0),
      ..Default::default()
    });
    forest.fit(&x, &y).unwrap();
    let predicted = forest.predict(&array![[0.2, 0.2, 0.0], [9.2, 9.2, 1.0]]).unwrap();
    assert_eq!(predicted, array![0, 1]);
  }

  #[test]
  fn same_seed_same_predictions() {
    let (x, y) = blobs();
    let config = ForestConfig {
      n_estimators: 10,
      max_depth: Some(2),
      ..Default::default()
    };
    let mut a = RandomForest::new(config.clone());
    let mut b = RandomForest::new(config);
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();
    assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
  }

  #[test]
  fn features_per_tree_defaults_to_sqrt() {
    let config = ForestConfig::default();
    assert_eq!(config.features_per_tree(4).unwrap(), 2);
    assert_eq!(config.features_per_tree(1).unwrap(), 1);
    let bad = ForestConfig {
      feature_fraction: Some(1.5),
      ..Default::default()
    };
    assert!(matches!(bad.features_per_tree(4), Err(Error::Config(_))));
  }

  #[test]
  fn predict_before_fit_is_rejected() {
    let forest = RandomForest::new(ForestConfig::default());
    assert!(!forest.is_fitted());
    assert!(matches!(forest.predict(&array![[1.0, 2.0, 3.0]]), Err(Error::NotFitted)));
  }

  #[test]
  fn feature_count_must_match_training() {
    let (x, y) = blobs();
    let mut forest = RandomForest::new(ForestConfig {
      n_estimators: 5,
      ..Default::default()
    });
    forest.fit(&x, &y).unwrap();
    assert!(matches!(forest.predict(&array![[1.0, 2.0]]), Err(Error::Shape(_))));
  }

  #[test]
  fn zero_trees_is_a_config_error() {
    let (x, y) = blobs();
    let mut forest = RandomForest::new(ForestConfig {
      n_estimators: 0,
      ..Default::default()
    });
    assert!(matches!(forest.fit(&x, &y), Err(Error::Config(_))));
  }
}
