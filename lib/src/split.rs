use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::{dataset::Partition, Error, Result};

/// Row indices of the two halves of a dataset. Disjoint, and together they cover every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
  pub train: Vec<usize>,
  pub test: Vec<usize>,
}

/// Rows of a [`Partition`] after splitting.
#[derive(Debug, Clone)]
pub struct SplitData {
  pub train_records: Array2<f64>,
  pub train_targets: Array1<usize>,
  pub test_records: Array2<f64>,
  pub test_targets: Array1<usize>,
}

/// Number of test rows for a ratio: rounded up, as the usual convention has it.
pub fn test_size(n_rows: usize, test_ratio: f64) -> usize {
  // guard against 0.1 * 30 landing a hair above 3
  (test_ratio * n_rows as f64 - 1e-9).ceil().max(0.0) as usize
}

/// Shuffles `0..n_rows` with a seeded RNG and cuts the permutation in two.
pub fn train_test_split(n_rows: usize, test_ratio: f64, seed: u64) -> Result<Split> {
  if !(test_ratio > 0.0 && test_ratio < 1.0) {
    return Err(Error::Config(format!(
      "test ratio must lie strictly between 0 and 1, got {}",
      test_ratio
    )));
  }
  let n_test = test_size(n_rows, test_ratio);
  if n_test == 0 || n_test >= n_rows {
    return Err(Error::Config(format!(
      "test ratio {} leaves an empty subset for {} rows",
      test_ratio, n_rows
    )));
  }

  let mut rng = StdRng::seed_from_u64(seed);
  let mut permutation: Vec<usize> = (0..n_rows).collect();
  permutation.shuffle(&mut rng);
  let train = permutation.split_off(n_test);
  debug!(train = train.len(), test = permutation.len(), seed, "split rows");

  Ok(Split {
    train,
    test: permutation,
  })
}

impl Split {
  pub fn apply(&self, partition: &Partition) -> Result<SplitData> {
    let n_rows = partition.records.nrows();
    if partition.targets.len() != n_rows {
      return Err(Error::Shape(format!(
        "{} feature rows but {} labels",
        n_rows,
        partition.targets.len()
      )));
    }
    if let Some(&bad) = self.train.iter().chain(&self.test).find(|&&i| i >= n_rows) {
      return Err(Error::Shape(format!(
        "split refers to row {} of a {}-row dataset",
        bad, n_rows
      )));
    }
    Ok(SplitData {
      train_records: partition.records.select(Axis(0), &self.train),
      train_targets: partition.targets.select(Axis(0), &self.train),
      test_records: partition.records.select(Axis(0), &self.test),
      test_targets: partition.targets.select(Axis(0), &self.test),
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use proptest::prelude::*;

  use super::*;
  use crate::dataset::purchases;

  #[test]
  fn ten_rows_at_one_fifth_leaves_two_for_testing() {
    let split = train_test_split(10, 0.2, 42).unwrap();
    assert_eq!(split.train.len(), 8);
    assert_eq!(split.test.len(), 2);
  }

  #[test]
  fn test_size_rounds_up() {
    assert_eq!(test_size(10, 0.25), 3);
    assert_eq!(test_size(1000, 0.3), 300);
    assert_eq!(test_size(30, 0.1), 3);
  }

  #[test]
  fn bad_ratios_are_rejected() {
    for ratio in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
      assert!(matches!(train_test_split(10, ratio, 0), Err(Error::Config(_))));
    }
    // a single row can't be split
    assert!(train_test_split(1, 0.5, 0).is_err());
  }

  #[test]
  fn apply_selects_matching_rows_and_labels() {
    let partition = purchases().unwrap().partition(&[], "Purchased").unwrap();
    let split = train_test_split(partition.records.nrows(), 0.2, 42).unwrap();
    let data = split.apply(&partition).unwrap();
    assert_eq!(data.train_records.nrows(), 8);
    assert_eq!(data.test_targets.len(), 2);
    for (k, &row) in split.test.iter().enumerate() {
      assert_eq!(data.test_records.row(k), partition.records.row(row));
      assert_eq!(data.test_targets[k], partition.targets[row]);
    }
  }

  proptest! {
    #[test]
    fn split_is_a_deterministic_partition(n in 2usize..500, ratio in 0.01f64..0.99, seed in any::<u64>()) {
      let first = train_test_split(n, ratio, seed);
      let second = train_test_split(n, ratio, seed);
      match (first, second) {
        (Ok(a), Ok(b)) => {
          prop_assert_eq!(&a, &b);
          let train: HashSet<_> = a.train.iter().copied().collect();
          let test: HashSet<_> = a.test.iter().copied().collect();
          prop_assert!(train.is_disjoint(&test));
          prop_assert_eq!(train.len() + test.len(), n);
          prop_assert!(train.union(&test).all(|&i| i < n));
          prop_assert_eq!(a.test.len(), test_size(n, ratio));
        }
        (Err(_), Err(_)) => {}
        _ => prop_assert!(false, "same inputs gave different outcomes"),
      }
    }
  }
}
