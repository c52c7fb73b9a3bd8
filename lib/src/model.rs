//! Classifiers behind one fit/predict interface.
//!
//! Each classifier starts unfitted; [`Classifier::predict`] on an unfitted model is a
//! sequencing error, not a panic.

pub mod forest;
pub mod logistic;
pub mod scaler;

use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub use forest::{ForestConfig, RandomForest};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use scaler::Standardizer;

use crate::{Error, Result};

pub trait Classifier {
  fn name(&self) -> &'static str;

  fn fit(&mut self, records: &Array2<f64>, targets: &Array1<usize>) -> Result<()>;

  fn predict(&self, records: &Array2<f64>) -> Result<Array1<usize>>;

  fn is_fitted(&self) -> bool;
}

/// Algorithm choice plus its hyperparameters, as read from a config file or flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
  LogisticRegression(LogisticConfig),
  RandomForest(ForestConfig),
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    ClassifierConfig::LogisticRegression(LogisticConfig::default())
  }
}

impl ClassifierConfig {
  pub fn build(&self) -> Box<dyn Classifier> {
    match self {
      ClassifierConfig::LogisticRegression(c) => Box::new(LogisticRegression::new(c.clone())),
      ClassifierConfig::RandomForest(c) => Box::new(RandomForest::new(c.clone())),
    }
  }
}

/// Checks shared by every `fit`: matching row counts, no empty input, at least two classes.
pub(crate) fn check_training_data(records: &Array2<f64>, targets: &Array1<usize>) -> Result<()> {
  if records.nrows() != targets.len() {
    return Err(Error::Shape(format!(
      "{} feature rows but {} labels",
      records.nrows(),
      targets.len()
    )));
  }
  if records.nrows() == 0 || records.ncols() == 0 {
    return Err(Error::Shape(format!(
      "cannot fit on a {}x{} feature matrix",
      records.nrows(),
      records.ncols()
    )));
  }
  let classes: BTreeSet<_> = targets.iter().collect();
  if classes.len() < 2 {
    return Err(Error::Fit(format!(
      "training labels contain a single class ({:?})",
      classes.into_iter().next()
    )));
  }
  Ok(())
}

pub(crate) fn check_feature_count(expected: usize, records: &Array2<f64>) -> Result<()> {
  if records.ncols() != expected {
    return Err(Error::Shape(format!(
      "model was fitted on {} features, got {}",
      expected,
      records.ncols()
    )));
  }
  Ok(())
}
