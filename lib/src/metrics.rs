use std::{collections::BTreeSet, fmt};

use itertools::Itertools;
use serde::Serialize;

use crate::{Error, Result};

fn check_lengths(truth: &[usize], predicted: &[usize]) -> Result<()> {
  if truth.len() != predicted.len() {
    return Err(Error::Shape(format!(
      "{} true labels but {} predictions",
      truth.len(),
      predicted.len()
    )));
  }
  if truth.is_empty() {
    return Err(Error::Shape("no labels to evaluate".into()));
  }
  Ok(())
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> Result<f64> {
  check_lengths(truth, predicted)?;
  let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
  Ok(hits as f64 / truth.len() as f64)
}

fn ratio(num: usize, den: usize) -> f64 {
  if den == 0 {
    0.0
  } else {
    num as f64 / den as f64
  }
}

/// Counts of (true label, predicted label) pairs.
///
/// Rows are true labels, columns predicted labels, both ordered as [`Self::labels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
  labels: Vec<usize>,
  counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
  pub fn new(truth: &[usize], predicted: &[usize]) -> Result<Self> {
    check_lengths(truth, predicted)?;
    let labels: Vec<usize> = truth
      .iter()
      .chain(predicted)
      .copied()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect();
    let mut counts = vec![vec![0; labels.len()]; labels.len()];
    for (t, p) in truth.iter().zip(predicted) {
      // both are present by construction
      let i = labels.binary_search(t).unwrap_or_default();
      let j = labels.binary_search(p).unwrap_or_default();
      counts[i][j] += 1;
    }
    Ok(Self { labels, counts })
  }

  pub fn labels(&self) -> &[usize] {
    &self.labels
  }

  pub fn counts(&self) -> &[Vec<usize>] {
    &self.counts
  }

  pub fn total(&self) -> usize {
    self.counts.iter().flatten().sum()
  }

  /// Row sums: how often each label was the truth.
  pub fn true_counts(&self) -> Vec<usize> {
    self.counts.iter().map(|row| row.iter().sum()).collect()
  }

  /// Column sums: how often each label was predicted.
  pub fn predicted_counts(&self) -> Vec<usize> {
    (0..self.labels.len())
      .map(|j| self.counts.iter().map(|row| row[j]).sum())
      .collect()
  }

  pub fn correct(&self) -> usize {
    (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
  }

  pub fn accuracy(&self) -> f64 {
    ratio(self.correct(), self.total())
  }
}

impl fmt::Display for ConfusionMatrix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let width = self
      .counts
      .iter()
      .flatten()
      .map(|c| c.to_string().len())
      .max()
      .unwrap_or(1);
    let rows = self
      .counts
      .iter()
      .map(|row| {
        format!(
          "[{}]",
          row.iter().map(|c| format!("{:>width$}", c)).join(" ")
        )
      })
      .join("\n ");
    write!(f, "[{}]", rows)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
  pub label: usize,
  pub precision: f64,
  pub recall: f64,
  pub f1: f64,
  pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Averages {
  pub precision: f64,
  pub recall: f64,
  pub f1: f64,
}

/// Per-class precision, recall and F1, with macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
  pub classes: Vec<ClassMetrics>,
  pub accuracy: f64,
  pub macro_avg: Averages,
  pub weighted_avg: Averages,
  pub support: usize,
}

impl ClassificationReport {
  pub fn new(truth: &[usize], predicted: &[usize]) -> Result<Self> {
    Ok(Self::from_confusion(&ConfusionMatrix::new(truth, predicted)?))
  }

  pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
    let true_counts = matrix.true_counts();
    let predicted_counts = matrix.predicted_counts();
    let classes: Vec<ClassMetrics> = matrix
      .labels()
      .iter()
      .enumerate()
      .map(|(i, &label)| {
        let hits = matrix.counts()[i][i];
        let precision = ratio(hits, predicted_counts[i]);
        let recall = ratio(hits, true_counts[i]);
        let f1 = if precision + recall == 0.0 {
          0.0
        } else {
          2.0 * precision * recall / (precision + recall)
        };
        ClassMetrics {
          label,
          precision,
          recall,
          f1,
          support: true_counts[i],
        }
      })
      .collect();

    let support = matrix.total();
    let n = classes.len().max(1) as f64;
    let macro_avg = Averages {
      precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
      recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
      f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
    };
    let weighted = |metric: fn(&ClassMetrics) -> f64| {
      classes
        .iter()
        .map(|c| metric(c) * c.support as f64)
        .sum::<f64>()
        / support.max(1) as f64
    };
    let weighted_avg = Averages {
      precision: weighted(|c| c.precision),
      recall: weighted(|c| c.recall),
      f1: weighted(|c| c.f1),
    };

    Self {
      accuracy: matrix.accuracy(),
      classes,
      macro_avg,
      weighted_avg,
      support,
    }
  }
}

impl fmt::Display for ClassificationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let width = self
      .classes
      .iter()
      .map(|c| c.label.to_string().len())
      .chain(std::iter::once("weighted avg".len()))
      .max()
      .unwrap_or_default();
    writeln!(
      f,
      "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
      "", "precision", "recall", "f1-score", "support"
    )?;
    writeln!(f)?;
    for c in &self.classes {
      writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        c.label, c.precision, c.recall, c.f1, c.support
      )?;
    }
    writeln!(f)?;
    writeln!(
      f,
      "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
      "accuracy", "", "", self.accuracy, self.support
    )?;
    for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
      writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, avg.precision, avg.recall, avg.f1, self.support
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use proptest::{collection::vec, prelude::*};

  use super::*;

  #[test]
  fn accuracy_counts_exact_matches() {
    assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap(), 0.75);
    assert!(matches!(accuracy(&[0, 1], &[0]), Err(Error::Shape(_))));
    assert!(accuracy(&[], &[]).is_err());
  }

  #[test]
  fn confusion_matrix_layout() {
    let m = ConfusionMatrix::new(&[0, 0, 1, 1, 1], &[0, 1, 1, 1, 0]).unwrap();
    assert_eq!(m.labels(), &[0, 1]);
    assert_eq!(m.counts(), &[vec![1, 1], vec![1, 2]]);
    assert_eq!(m.to_string(), "[[1 1]\n [1 2]]");
  }

  #[test]
  fn labels_only_predicted_still_get_a_row() {
    let m = ConfusionMatrix::new(&[1, 1], &[1, 2]).unwrap();
    assert_eq!(m.labels(), &[1, 2]);
    assert_eq!(m.true_counts(), vec![2, 0]);
    assert_eq!(m.predicted_counts(), vec![1, 1]);
  }

  #[test]
  fn report_matches_hand_computation() {
    let r = ClassificationReport::new(&[0, 0, 1, 1, 1], &[0, 1, 1, 1, 0]).unwrap();
    let zero = &r.classes[0];
    assert_eq!(zero.precision, 0.5);
    assert_eq!(zero.recall, 0.5);
    assert_eq!(zero.support, 2);
    let one = &r.classes[1];
    assert!((one.precision - 2.0 / 3.0).abs() < 1e-12);
    assert!((one.f1 - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(r.accuracy, 0.6);
    assert!((r.macro_avg.recall - (0.5 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
    assert!((r.weighted_avg.recall - 0.6).abs() < 1e-12);
  }

  #[test]
  fn never_predicted_class_scores_zero_instead_of_nan() {
    let r = ClassificationReport::new(&[0, 1], &[1, 1]).unwrap();
    assert_eq!(r.classes[0].precision, 0.0);
    assert_eq!(r.classes[0].f1, 0.0);
  }

  #[test]
  fn report_text_has_a_row_per_class_and_summaries() {
    let text = ClassificationReport::new(&[0, 1, 1], &[0, 1, 0])
      .unwrap()
      .to_string();
    assert!(text.lines().next().unwrap().ends_with("support"));
    assert!(text.contains("    accuracy"));
    assert!(text.contains("   macro avg"));
    assert!(text.contains("weighted avg"));
    assert_eq!(text.lines().filter(|l| l.trim_start().starts_with('1')).count(), 1);
  }

  fn label_pairs() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    (1usize..60).prop_flat_map(|n| (vec(0usize..4, n), vec(0usize..4, n)))
  }

  proptest! {
    #[test]
    fn accuracy_is_matches_over_total((truth, predicted) in label_pairs()) {
      let hits = truth.iter().zip(&predicted).filter(|(a, b)| a == b).count();
      let expected = hits as f64 / truth.len() as f64;
      prop_assert_eq!(accuracy(&truth, &predicted).unwrap(), expected);
      prop_assert_eq!(ConfusionMatrix::new(&truth, &predicted).unwrap().accuracy(), expected);
    }

    #[test]
    fn confusion_sums_match_label_counts((truth, predicted) in label_pairs()) {
      let m = ConfusionMatrix::new(&truth, &predicted).unwrap();
      for (i, label) in m.labels().iter().enumerate() {
        prop_assert_eq!(m.true_counts()[i], truth.iter().filter(|&t| t == label).count());
        prop_assert_eq!(m.predicted_counts()[i], predicted.iter().filter(|&p| p == label).count());
      }
      prop_assert_eq!(m.total(), truth.len());
    }
  }
}
