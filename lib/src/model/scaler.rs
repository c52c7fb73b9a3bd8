use ndarray::{Array1, Array2, Axis};

use crate::{Error, Result};

/// Per-column z-score scaling, learned on the training rows only.
#[derive(Debug, Clone)]
pub struct Standardizer {
  mean: Array1<f64>,
  scale: Array1<f64>,
}

impl Standardizer {
  pub fn fit(records: &Array2<f64>) -> Result<Self> {
    let mean = records
      .mean_axis(Axis(0))
      .ok_or_else(|| Error::Shape("cannot standardize an empty matrix".into()))?;
    // constant columns are only centred
    let scale = records
      .std_axis(Axis(0), 0.0)
      .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
    Ok(Self { mean, scale })
  }

  pub fn transform(&self, records: &Array2<f64>) -> Result<Array2<f64>> {
    super::check_feature_count(self.mean.len(), records)?;
    Ok((records - &self.mean) / &self.scale)
  }
}
