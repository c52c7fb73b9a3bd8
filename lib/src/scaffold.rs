use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_BASE: &str = "data-science-track";

/// Directories to ensure and files to (over)write. No rollback: a failure halfway leaves
/// whatever was already created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
  pub folders: Vec<PathBuf>,
  pub files: BTreeMap<PathBuf, String>,
}

const SECTIONS: [(&str, &[&str], &str); 5] = [
  (
    "01-mathematical-foundations",
    &["notebooks", "code", "resources"],
    "# Mathematical Foundations\n\nLinear Algebra, Calculus, Probability & Statistics.",
  ),
  (
    "02-programming",
    &["notebooks", "code", "resources"],
    "# Programming\n\nPython, SQL, and programming essentials.",
  ),
  (
    "03-machine-learning",
    &["notebooks", "code", "resources"],
    "# Machine Learning\n\nCore ML concepts, models, and techniques.",
  ),
  (
    "04-data-visualization",
    &["notebooks", "code", "resources"],
    "# Data Visualization\n\nCharts, graphs, and storytelling with data.",
  ),
  (
    "05-applications",
    &["projects", "resources"],
    "# Applications\n\nReal-world projects and case studies.",
  ),
];

const TRACK_README: &str = "# Data Science Track 🚀\n\nA structured learning path for Data Science.";

impl Layout {
  /// The curriculum tree: five numbered sections and a README for each plus one at the root.
  pub fn data_science_track(base: impl AsRef<Path>) -> Self {
    let base = base.as_ref();
    let mut layout = Layout::default();
    layout
      .files
      .insert(base.join("README.md"), TRACK_README.to_string());
    for (section, subfolders, readme) in SECTIONS {
      for sub in subfolders {
        layout.folders.push(base.join(section).join(sub));
      }
      layout
        .files
        .insert(base.join(section).join("README.md"), readme.to_string());
    }
    layout
  }

  /// Creating a folder that already exists is fine.
  pub fn create_folders(&self) -> Result<()> {
    for folder in &self.folders {
      fs::create_dir_all(folder).map_err(|e| Error::io(folder, e))?;
      debug!(folder = %folder.display(), "folder ready");
    }
    Ok(())
  }

  /// Writes every file, replacing what was there. Missing parents are created.
  pub fn create_files(&self) -> Result<()> {
    for (path, content) in &self.files {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
      }
      fs::write(path, content).map_err(|e| Error::io(path, e))?;
      debug!(file = %path.display(), bytes = content.len(), "file written");
    }
    Ok(())
  }
}
