//! Partition, split, fit, predict, evaluate. One shot, no retries.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::{
  dataset::Dataset,
  metrics::{accuracy, ClassificationReport, ConfusionMatrix},
  model::ClassifierConfig,
  split::train_test_split,
  Result,
};

#[derive(Debug, Clone)]
pub struct ClassificationTask {
  /// Empty means every column except the target.
  pub features: Vec<String>,
  pub target: String,
  pub test_ratio: f64,
  pub seed: u64,
  pub classifier: ClassifierConfig,
}

impl ClassificationTask {
  pub fn new(target: impl Into<String>) -> Self {
    Self {
      features: Vec::new(),
      target: target.into(),
      test_ratio: 0.2,
      seed: 42,
      classifier: ClassifierConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
  pub model: String,
  pub features: Vec<String>,
  pub target: String,
  pub train_rows: usize,
  pub test_rows: usize,
  pub truth: Vec<usize>,
  pub predicted: Vec<usize>,
  pub accuracy: f64,
  pub confusion_matrix: ConfusionMatrix,
  pub report: ClassificationReport,
}

impl fmt::Display for Evaluation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Accuracy: {:.2}", self.accuracy)?;
    writeln!(f, "Confusion Matrix:")?;
    writeln!(f, "{}", self.confusion_matrix)?;
    writeln!(f, "Classification Report:")?;
    write!(f, "{}", self.report)
  }
}

#[tracing::instrument(level = "info", skip(dataset, task), fields(target = %task.target))]
pub fn run_classification(dataset: &Dataset, task: &ClassificationTask) -> Result<Evaluation> {
  let partition = dataset.partition(&task.features, &task.target)?;
  let split = train_test_split(partition.records.nrows(), task.test_ratio, task.seed)?;
  let data = split.apply(&partition)?;
  info!(
    train = split.train.len(),
    test = split.test.len(),
    features = ?partition.feature_names,
    "data prepared"
  );

  let mut classifier = task.classifier.build();
  classifier.fit(&data.train_records, &data.train_targets)?;
  let predicted = classifier.predict(&data.test_records)?;

  let truth = data.test_targets.to_vec();
  let predicted = predicted.to_vec();
  let confusion_matrix = ConfusionMatrix::new(&truth, &predicted)?;
  let report = ClassificationReport::from_confusion(&confusion_matrix);
  let accuracy = accuracy(&truth, &predicted)?;
  info!(accuracy, model = classifier.name(), "evaluated");

  Ok(Evaluation {
    model: classifier.name().to_string(),
    features: partition.feature_names,
    target: partition.target_name,
    train_rows: split.train.len(),
    test_rows: split.test.len(),
    truth,
    predicted,
    accuracy,
    confusion_matrix,
    report,
  })
}
