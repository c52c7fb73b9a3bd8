use linfa::traits::{Fit, Predict};
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{check_training_data, Classifier, Standardizer};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
  pub max_iterations: u64,
  /// L2 penalty strength.
  pub alpha: f64,
}

impl Default for LogisticConfig {
  fn default() -> Self {
    Self {
      max_iterations: 100,
      alpha: 1.0,
    }
  }
}

struct Fitted {
  scaler: Standardizer,
  model: MultiFittedLogisticRegression<f64, usize>,
}

/// Multinomial logistic regression on standardized features.
pub struct LogisticRegression {
  config: LogisticConfig,
  fitted: Option<Fitted>,
}

impl LogisticRegression {
  pub fn new(config: LogisticConfig) -> Self {
    Self {
      config,
      fitted: None,
    }
  }
}

impl Classifier for LogisticRegression {
  fn name(&self) -> &'static str {
    "logistic regression"
  }

  fn fit(&mut self, records: &Array2<f64>, targets: &Array1<usize>) -> Result<()> {
    check_training_data(records, targets)?;
    if self.config.max_iterations == 0 {
      return Err(Error::Config("max_iterations must be positive".into()));
    }
    if !(self.config.alpha >= 0.0) {
      return Err(Error::Config(format!(
        "alpha must be non-negative, got {}",
        self.config.alpha
      )));
    }
    debug!(config = ?self.config, rows = records.nrows(), "fitting logistic regression");

    let scaler = Standardizer::fit(records)?;
    let dataset = linfa::Dataset::new(scaler.transform(records)?, targets.clone());
    let model = MultiLogisticRegression::<f64>::new()
      .max_iterations(self.config.max_iterations)
      .alpha(self.config.alpha)
      .fit(&dataset)
      .map_err(|e| Error::Fit(format!("logistic regression: {}", e)))?;

    info!("logistic regression fitted on {} rows", records.nrows());
    self.fitted = Some(Fitted { scaler, model });
    Ok(())
  }

  fn predict(&self, records: &Array2<f64>) -> Result<Array1<usize>> {
    let fitted = self.fitted.as_ref().ok_or(Error::NotFitted)?;
    let scaled = fitted.scaler.transform(records)?;
    Ok(fitted.model.predict(&scaled))
  }

  fn is_fitted(&self) -> bool {
    self.fitted.is_some()
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  #[test]
  fn separates_two_clusters() {
    let x = array![
      [0.0, 0.1],
      [0.2, 0.0],
      [0.1, 0.3],
      [5.0, 5.2],
      [5.3, 4.9],
      [4.8, 5.1]
    ];
    let y = array![0, 0, 0, 1, 1, 1];
    let mut model = LogisticRegression::new(LogisticConfig::default());
    model.fit(&x, &y).unwrap();
    assert!(model.is_fitted());
    let predicted = model.predict(&array![[0.1, 0.1], [5.1, 5.0]]).unwrap();
    assert_eq!(predicted, array![0, 1]);
  }

  #[test]
  fn feature_count_must_match_training() {
    let mut model = LogisticRegression::new(LogisticConfig::default());
    model
      .fit(&array![[0.0, 1.0], [1.0, 0.0]], &array![0, 1])
      .unwrap();
    assert!(matches!(
      model.predict(&array![[1.0, 2.0, 3.0]]),
      Err(Error::Shape(_))
    ));
  }

  #[test]
  fn negative_alpha_is_a_config_error() {
    let mut model = LogisticRegression::new(LogisticConfig {
      alpha: -1.0,
      ..Default::default()
    });
    let err = model
      .fit(&array![[0.0], [1.0]], &array![0, 1])
      .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
  }
}
