use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{
  chart::{random_series, LineChart, VennDiagram},
  Result,
};

pub struct Venn {
  diagram: VennDiagram,
  output: PathBuf,
}

impl Venn {
  pub fn new(diagram: VennDiagram, output: &Path) -> Self {
    Self {
      diagram,
      output: PathBuf::from(output),
    }
  }

  pub fn run(self) -> Result<()> {
    self.diagram.render_svg(&self.output)?;
    println!("Venn diagram saved to {}", self.output.display());
    Ok(())
  }
}

/// Parameters of the generated series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesParams {
  pub start: NaiveDate,
  pub days: usize,
  pub low: i64,
  pub high: i64,
  pub seed: u64,
}

impl Default for SeriesParams {
  fn default() -> Self {
    Self {
      start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
      days: 30,
      low: 10,
      high: 100,
      seed: 42,
    }
  }
}

pub struct Timeseries {
  params: SeriesParams,
  chart: LineChart,
  output: PathBuf,
}

impl Timeseries {
  pub fn new(params: SeriesParams, chart: LineChart, output: &Path) -> Self {
    Self {
      params,
      chart,
      output: PathBuf::from(output),
    }
  }

  pub fn run(self) -> Result<()> {
    let p = self.params;
    let series = random_series(p.start, p.days, p.low, p.high, p.seed)?;
    println!("Sample Data:\n{}", series.head(5));
    self.chart.render_svg(&series, &self.output)?;
    println!("Chart saved to {}", self.output.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn both_charts_land_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let venn = dir.path().join("venn.svg");
    let line = dir.path().join("series.svg");
    Venn::new(VennDiagram::highlighted_complement(), &venn)
      .run()
      .unwrap();
    Timeseries::new(SeriesParams::default(), LineChart::default(), &line)
      .run()
      .unwrap();
    assert!(std::fs::read_to_string(venn).unwrap().contains("<svg"));
    assert!(std::fs::read_to_string(line).unwrap().contains("<svg"));
  }

  #[test]
  fn zero_days_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("series.svg");
    let params = SeriesParams {
      days: 0,
      ..Default::default()
    };
    let err = Timeseries::new(params, LineChart::default(), &out)
      .run()
      .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!out.exists());
  }
}
