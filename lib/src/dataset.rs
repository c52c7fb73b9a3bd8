//! Tabular datasets with a validated schema.
//!
//! Column names are checked once, when a [`Dataset`] is built. Every later lookup goes
//! through the [`Schema`] and fails with [`Error::UnknownColumn`] instead of producing
//! a silently wrong result.

use std::{collections::HashSet, fmt, path::Path};

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
  /// Any finite number.
  Continuous,
  /// Integral values only. The only kind usable as a classification target.
  Discrete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
  pub name: String,
  pub kind: ColumnKind,
}

impl Column {
  pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
    Self {
      name: name.into(),
      kind,
    }
  }
}

/// Ordered, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
  columns: Vec<Column>,
}

impl Schema {
  pub fn new(columns: Vec<Column>) -> Result<Self> {
    if columns.is_empty() {
      return Err(Error::Config("a schema needs at least one column".into()));
    }
    let mut seen = HashSet::new();
    for column in &columns {
      if column.name.trim().is_empty() {
        return Err(Error::Config("column names must not be blank".into()));
      }
      if !seen.insert(column.name.as_str()) {
        return Err(Error::Config(format!(
          "duplicate column name {:?}",
          column.name
        )));
      }
    }
    Ok(Self { columns })
  }

  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  pub fn len(&self) -> usize {
    self.columns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.columns.is_empty()
  }

  pub fn names(&self) -> Vec<String> {
    self.columns.iter().map(|c| c.name.clone()).collect()
  }

  pub fn index_of(&self, name: &str) -> Result<usize> {
    self
      .columns
      .iter()
      .position(|c| c.name == name)
      .ok_or_else(|| Error::UnknownColumn {
        column: name.to_string(),
        available: self.names(),
      })
  }

  pub fn column(&self, name: &str) -> Result<&Column> {
    self.index_of(name).map(|i| &self.columns[i])
  }
}

/// Rows x columns of numbers, described by a [`Schema`].
#[derive(Debug, Clone)]
pub struct Dataset {
  schema: Schema,
  records: Array2<f64>,
}

/// Features and labels taken out of a [`Dataset`], ready for a classifier.
#[derive(Debug, Clone)]
pub struct Partition {
  pub feature_names: Vec<String>,
  pub target_name: String,
  pub records: Array2<f64>,
  pub targets: Array1<usize>,
}

impl Dataset {
  pub fn new(schema: Schema, records: Array2<f64>) -> Result<Self> {
    if records.ncols() != schema.len() {
      return Err(Error::Shape(format!(
        "schema declares {} columns but rows have {}",
        schema.len(),
        records.ncols()
      )));
    }
    for (column, values) in schema.columns().iter().zip(records.axis_iter(Axis(1))) {
      if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(Error::Shape(format!(
          "column {:?} holds a non-finite value ({})",
          column.name, bad
        )));
      }
      if column.kind == ColumnKind::Discrete {
        if let Some(bad) = values.iter().find(|v| v.fract() != 0.0) {
          return Err(Error::Shape(format!(
            "discrete column {:?} holds a fractional value ({})",
            column.name, bad
          )));
        }
      }
    }
    Ok(Self { schema, records })
  }

  /// Builds a dataset from literal columns, the way one writes a dict of lists.
  pub fn from_columns<S: Into<String>>(columns: Vec<(S, ColumnKind, Vec<f64>)>) -> Result<Self> {
    let mut schema = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    for (name, kind, column) in columns {
      schema.push(Column::new(name, kind));
      values.push(column);
    }
    let schema = Schema::new(schema)?;
    let n_rows = values[0].len();
    if let Some((column, other)) = schema
      .columns()
      .iter()
      .zip(&values)
      .find(|(_, v)| v.len() != n_rows)
    {
      return Err(Error::Shape(format!(
        "column {:?} has {} values, expected {}",
        column.name,
        other.len(),
        n_rows
      )));
    }
    let records = Array2::from_shape_fn((n_rows, values.len()), |(i, j)| values[j][i]);
    Self::new(schema, records)
  }

  pub fn schema(&self) -> &Schema {
    &self.schema
  }

  pub fn records(&self) -> &Array2<f64> {
    &self.records
  }

  pub fn n_rows(&self) -> usize {
    self.records.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.n_rows() == 0
  }

  pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
    let index = self.schema.index_of(name)?;
    Ok(self.records.column(index))
  }

  /// First `n` rows.
  pub fn head(&self, n: usize) -> Dataset {
    let n = n.min(self.n_rows());
    Dataset {
      schema: self.schema.clone(),
      records: self.records.slice(ndarray::s![..n, ..]).to_owned(),
    }
  }

  /// Splits the columns into a feature matrix and a label vector.
  ///
  /// An empty `features` selects every column except `target`.
  pub fn partition(&self, features: &[String], target: &str) -> Result<Partition> {
    let target_index = self.schema.index_of(target)?;
    let target_column = &self.schema.columns()[target_index];
    if target_column.kind != ColumnKind::Discrete {
      return Err(Error::Config(format!(
        "target column {:?} is continuous; class labels must be discrete",
        target
      )));
    }

    let feature_indices: Vec<usize> = if features.is_empty() {
      (0..self.schema.len()).filter(|&i| i != target_index).collect()
    } else {
      let mut indices = Vec::with_capacity(features.len());
      for name in features {
        let index = self.schema.index_of(name)?;
        if index == target_index {
          return Err(Error::Config(format!(
            "target column {:?} cannot also be a feature",
            target
          )));
        }
        if indices.contains(&index) {
          return Err(Error::Config(format!("feature {:?} selected twice", name)));
        }
        indices.push(index);
      }
      indices
    };
    if feature_indices.is_empty() {
      return Err(Error::Config(format!(
        "no feature columns left besides target {:?}",
        target
      )));
    }
    if self.is_empty() {
      return Err(Error::Shape("dataset has no rows".into()));
    }

    let labels = self.records.column(target_index);
    if let Some(bad) = labels.iter().find(|v| **v < 0.0) {
      return Err(Error::Config(format!(
        "target column {:?} holds a negative label ({})",
        target, bad
      )));
    }
    let targets = labels.mapv(|v| v as usize);
    let records = self.records.select(Axis(1), &feature_indices);
    let feature_names = feature_indices
      .iter()
      .map(|&i| self.schema.columns()[i].name.clone())
      .collect();
    debug!(
      rows = records.nrows(),
      features = records.ncols(),
      target,
      "partitioned dataset"
    );

    Ok(Partition {
      feature_names,
      target_name: target.to_string(),
      records,
      targets,
    })
  }
}

impl fmt::Display for Dataset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let widths: Vec<usize> = self
      .schema
      .columns()
      .iter()
      .map(|c| c.name.len().max(6))
      .collect();
    let index_width = self.n_rows().saturating_sub(1).to_string().len();
    write!(f, "{:index_width$}", "")?;
    for (column, width) in self.schema.columns().iter().zip(&widths) {
      write!(f, "  {:>width$}", column.name, width = *width)?;
    }
    for (i, row) in self.records.rows().into_iter().enumerate() {
      writeln!(f)?;
      write!(f, "{:<index_width$}", i)?;
      for ((column, value), width) in self.schema.columns().iter().zip(row).zip(&widths) {
        match column.kind {
          ColumnKind::Discrete => write!(f, "  {:>width$}", *value as i64, width = *width)?,
          ColumnKind::Continuous => write!(f, "  {:>width$.2}", value, width = *width)?,
        }
      }
    }
    Ok(())
  }
}

pub const PURCHASES_TARGET: &str = "Purchased";

/// The ten-customer table used by the logistic-regression exercise.
pub fn purchases() -> Result<Dataset> {
  let age = vec![22., 25., 47., 52., 46., 56., 55., 60., 62., 61.];
  let income = vec![15., 20., 35., 55., 40., 60., 45., 80., 90., 85.];
  let purchased = vec![0., 0., 1., 1., 1., 1., 0., 1., 1., 1.];
  Dataset::from_columns(vec![
    ("Age", ColumnKind::Discrete, age),
    ("Income", ColumnKind::Discrete, income),
    (PURCHASES_TARGET, ColumnKind::Discrete, purchased),
  ])
}

pub const SPAM_TARGET: &str = "is_spam";

/// Simulated e-mail features with a coin-flip spam label. Columns are drawn
/// independently, so no classifier should do much better than chance on it.
pub fn synthetic_spam(n_samples: usize, seed: u64) -> Result<Dataset> {
  if n_samples == 0 {
    return Err(Error::Config("synthetic dataset needs at least one sample".into()));
  }
  let mut rng = StdRng::seed_from_u64(seed);
  let mut draw = |low: i64, high: i64| -> Vec<f64> {
    (0..n_samples)
      .map(|_| rng.gen_range(low..high) as f64)
      .collect()
  };
  let keyword_free = draw(0, 2);
  let num_links = draw(0, 10);
  let subject_length = draw(10, 50);
  let num_special_chars = draw(0, 10);
  let is_spam = draw(0, 2);
  Dataset::from_columns(vec![
    ("keyword_free", ColumnKind::Discrete, keyword_free),
    ("num_links", ColumnKind::Discrete, num_links),
    ("subject_length", ColumnKind::Discrete, subject_length),
    ("num_special_chars", ColumnKind::Discrete, num_special_chars),
    (SPAM_TARGET, ColumnKind::Discrete, is_spam),
  ])
}

/// Parses a header line of column names followed by one row per line.
///
/// Comma separated if the header contains a comma, whitespace separated otherwise.
/// A column is [`ColumnKind::Discrete`] when every value in it is integral.
pub fn parse_dataset(content: &str) -> Result<Dataset> {
  let mut lines = content
    .lines()
    .enumerate()
    .map(|(i, line)| (i + 1, line.trim()))
    .filter(|(_, line)| !line.is_empty());

  let (header_line, header) = lines.next().ok_or(Error::Parse {
    line: 1,
    message: "missing header row".into(),
  })?;
  let comma = header.contains(',');
  let fields = |line: &str| -> Vec<String> {
    if comma {
      line.split(',').map(|s| s.trim().to_string()).collect()
    } else {
      line.split_whitespace().map(str::to_string).collect()
    }
  };

  let names = fields(header);
  if names.iter().any(|n| n.is_empty()) {
    return Err(Error::Parse {
      line: header_line,
      message: "blank column name in header".into(),
    });
  }

  let mut rows: Vec<f64> = Vec::new();
  let mut n_rows = 0;
  for (line_no, line) in lines {
    let parts = fields(line);
    if parts.len() != names.len() {
      return Err(Error::Parse {
        line: line_no,
        message: format!("expected {} values, found {}", names.len(), parts.len()),
      });
    }
    for (name, part) in names.iter().zip(&parts) {
      let value: f64 = part.parse().map_err(|_| Error::Parse {
        line: line_no,
        message: format!("value {:?} in column {:?} is not a number", part, name),
      })?;
      if !value.is_finite() {
        return Err(Error::Parse {
          line: line_no,
          message: format!("value {:?} in column {:?} is not finite", part, name),
        });
      }
      rows.push(value);
    }
    n_rows += 1;
  }

  let records = Array2::from_shape_vec((n_rows, names.len()), rows)
    .map_err(|e| Error::Shape(e.to_string()))?;
  let columns = names
    .into_iter()
    .zip(records.axis_iter(Axis(1)))
    .map(|(name, values)| {
      let kind = if values.iter().all(|v| v.fract() == 0.0) {
        ColumnKind::Discrete
      } else {
        ColumnKind::Continuous
      };
      Column::new(name, kind)
    })
    .collect_vec();
  let schema = Schema::new(columns).map_err(|e| Error::Parse {
    line: header_line,
    message: e.to_string(),
  })?;
  Dataset::new(schema, records)
}

pub fn read_dataset(path: &Path) -> Result<Dataset> {
  let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
  parse_dataset(&content)
}
