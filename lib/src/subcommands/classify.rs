use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
  dataset::{purchases, read_dataset, synthetic_spam, Dataset, PURCHASES_TARGET, SPAM_TARGET},
  pipeline::{run_classification, ClassificationTask},
  Error, Result,
};

/// Where the rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
  Purchases,
  Spam { samples: usize, seed: u64 },
  File(PathBuf),
}

impl DatasetSource {
  /// `purchases` and `spam` name the built-in datasets; anything else is a path.
  pub fn parse(name: &str, samples: usize, seed: u64) -> Self {
    match name {
      "purchases" => DatasetSource::Purchases,
      "spam" => DatasetSource::Spam { samples, seed },
      path => DatasetSource::File(PathBuf::from(path)),
    }
  }

  pub fn default_target(&self) -> Option<&'static str> {
    match self {
      DatasetSource::Purchases => Some(PURCHASES_TARGET),
      DatasetSource::Spam { .. } => Some(SPAM_TARGET),
      DatasetSource::File(_) => None,
    }
  }

  pub fn load(&self) -> Result<Dataset> {
    match self {
      DatasetSource::Purchases => purchases(),
      DatasetSource::Spam { samples, seed } => synthetic_spam(*samples, *seed),
      DatasetSource::File(path) => read_dataset(path),
    }
  }
}

pub struct Classify {
  source: DatasetSource,
  task: ClassificationTask,
  json: bool,
}

impl Classify {
  /// Without an explicit target the built-in datasets fall back to their label column.
  pub fn new(
    source: DatasetSource,
    target: Option<String>,
    build: impl FnOnce(String) -> ClassificationTask,
    json: bool,
  ) -> Result<Self> {
    let target = match target.or_else(|| source.default_target().map(str::to_string)) {
      Some(target) => target,
      None => {
        return Err(Error::Config(
          "--target is required for datasets read from a file".into(),
        ))
      }
    };
    Ok(Self {
      task: build(target),
      source,
      json,
    })
  }

  pub fn run(self) -> Result<()> {
    let dataset = self.source.load()?;
    info!(
      rows = dataset.n_rows(),
      columns = ?dataset.schema().names(),
      "dataset loaded"
    );
    debug!("\n{}", dataset.head(5));

    let evaluation = run_classification(&dataset, &self.task)?;
    if self.json {
      let json = serde_json::to_string_pretty(&evaluation).map_err(|e| Error::Render(e.to_string()))?;
      println!("{}", json);
    } else {
      println!("{}", evaluation);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn names_select_builtin_sources() {
    assert_eq!(DatasetSource::parse("purchases", 5, 1), DatasetSource::Purchases);
    assert_eq!(
      DatasetSource::parse("spam", 5, 1),
      DatasetSource::Spam { samples: 5, seed: 1 }
    );
    assert_eq!(
      DatasetSource::parse("data/rows.csv", 5, 1),
      DatasetSource::File(PathBuf::from("data/rows.csv"))
    );
  }

  #[test]
  fn file_sources_need_a_target() {
    let source = DatasetSource::File(PathBuf::from("rows.csv"));
    let err = Classify::new(source, None, ClassificationTask::new, false).err();
    assert!(matches!(err, Some(Error::Config(_))));
  }

  #[test]
  fn purchases_runs_with_its_default_target() {
    Classify::new(DatasetSource::Purchases, None, ClassificationTask::new, false)
      .unwrap()
      .run()
      .unwrap();
  }

  #[test]
  fn classifies_rows_read_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    let mut text = String::from("x,y,label\n");
    for i in 0..20 {
      let label = usize::from(i >= 10);
      text.push_str(&format!("{},{},{}\n", i, 20 - i, label));
    }
    fs::write(&path, text).unwrap();

    let classify = Classify::new(
      DatasetSource::File(path),
      Some("label".into()),
      ClassificationTask::new,
      true,
    )
    .unwrap();
    classify.run().unwrap();
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let classify = Classify::new(
      DatasetSource::File(PathBuf::from("/nonexistent/rows.csv")),
      Some("label".into()),
      ClassificationTask::new,
      false,
    )
    .unwrap();
    assert!(matches!(classify.run(), Err(Error::Io { .. })));
  }
}
