use std::path::{Path, PathBuf};

use tracing::info;

use crate::{scaffold::Layout, Result};

pub struct Scaffold {
  base: PathBuf,
}

impl Scaffold {
  pub fn new(base: &Path) -> Self {
    Self {
      base: PathBuf::from(base),
    }
  }

  pub fn run(self) -> Result<()> {
    println!("🚀 Setting up Data Science Track repository...");
    let layout = Layout::data_science_track(&self.base);
    layout.create_folders()?;
    println!("✅ Folder structure created successfully.");
    layout.create_files()?;
    println!("📝 README.md files created.");
    info!(
      base = %self.base.display(),
      folders = layout.folders.len(),
      files = layout.files.len(),
      "scaffold complete"
    );
    println!("🎯 Setup complete! Your folder structure is ready.");
    Ok(())
  }
}
