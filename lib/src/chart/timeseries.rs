use std::{fmt, path::Path};

use chrono::{Days, NaiveDate};
use plotters::{coord::Shift, prelude::*};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use super::render_err;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Observation {
  pub date: NaiveDate,
  pub value: i64,
}

/// Daily observations, consecutive dates in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
  points: Vec<Observation>,
}

impl TimeSeries {
  pub fn new(points: Vec<Observation>) -> Result<Self> {
    if points.is_empty() {
      return Err(Error::Shape("a time series needs at least one point".into()));
    }
    if points.windows(2).any(|w| w[0].date >= w[1].date) {
      return Err(Error::Shape("dates must be strictly increasing".into()));
    }
    Ok(Self { points })
  }

  pub fn points(&self) -> &[Observation] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn start(&self) -> Option<NaiveDate> {
    self.points.first().map(|p| p.date)
  }

  /// The first `n` points; empty for `n == 0`.
  pub fn head(&self, n: usize) -> TimeSeries {
    TimeSeries {
      points: self.points.iter().take(n).copied().collect(),
    }
  }

  /// Smallest and largest value, `None` when empty.
  pub fn value_range(&self) -> Option<(i64, i64)> {
    let lo = self.points.iter().map(|p| p.value).min()?;
    let hi = self.points.iter().map(|p| p.value).max()?;
    Some((lo, hi))
  }
}

impl fmt::Display for TimeSeries {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let index = self.points.len().saturating_sub(1).to_string().len();
    let value = self
      .points
      .iter()
      .map(|p| p.value.to_string().len())
      .chain(std::iter::once("Value".len()))
      .max()
      .unwrap_or_default();
    write!(f, "{:index$} {:>10}  {:>value$}", "", "Date", "Value")?;
    for (i, p) in self.points.iter().enumerate() {
      write!(f, "\n{:<index$} {}  {:>value$}", i, p.date, p.value)?;
    }
    Ok(())
  }
}

/// `days` consecutive dates from `start`, each with a value drawn uniformly from
/// `low..high`.
pub fn random_series(start: NaiveDate, days: usize, low: i64, high: i64, seed: u64) -> Result<TimeSeries> {
  if days == 0 {
    return Err(Error::Config("days must be positive".into()));
  }
  if low >= high {
    return Err(Error::Config(format!("empty value range {}..{}", low, high)));
  }
  let mut rng = StdRng::seed_from_u64(seed);
  let points = (0..days)
    .map(|i| {
      let date = start
        .checked_add_days(Days::new(i as u64))
        .ok_or_else(|| Error::Config(format!("{} plus {} days is out of range", start, i)))?;
      Ok(Observation {
        date,
        value: rng.gen_range(low..high),
      })
    })
    .collect::<Result<Vec<_>>>()?;
  debug!(days, low, high, seed, "random series generated");
  TimeSeries::new(points)
}

/// Line plot with markers over a [`TimeSeries`].
#[derive(Debug, Clone)]
pub struct LineChart {
  pub title: String,
  pub x_desc: String,
  pub y_desc: String,
  pub series_label: String,
  pub size: (u32, u32),
}

impl Default for LineChart {
  fn default() -> Self {
    Self {
      title: "Random Data Visualization".to_string(),
      x_desc: "Date".to_string(),
      y_desc: "Value".to_string(),
      series_label: "Random Values".to_string(),
      size: (1000, 500),
    }
  }
}

impl LineChart {
  pub fn render_svg(&self, series: &TimeSeries, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, self.size).into_drawing_area();
    self.draw(series, root)?;
    info!(path = %path.display(), points = series.len(), "line chart written");
    Ok(())
  }

  pub fn render_svg_string(&self, series: &TimeSeries) -> Result<String> {
    let mut svg = String::new();
    {
      let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
      self.draw(series, root)?;
    }
    Ok(svg)
  }

  fn draw<DB: DrawingBackend>(&self, series: &TimeSeries, root: DrawingArea<DB, Shift>) -> Result<()> {
    let (start, (lo, hi)) = match (series.start(), series.value_range()) {
      (Some(start), Some(range)) => (start, range),
      _ => return Err(Error::Shape("cannot chart an empty time series".into())),
    };
    // y runs in f64 so that ranges spanning all of i64 don't overflow
    let (lo, hi) = (lo as f64, hi as f64);
    let pad = ((hi - lo) / 10.0).max(1.0);
    // x is the day offset from `start`
    let last = series.len() as i64 - 1;
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
      .caption(&self.title, ("sans-serif", 24))
      .margin(15)
      .x_label_area_size(40)
      .y_label_area_size(50)
      .build_cartesian_2d(0i64..last.max(1), (lo - pad)..(hi + pad))
      .map_err(render_err)?;

    let date_label = |offset: &i64| {
      start
        .checked_add_days(Days::new((*offset).max(0) as u64))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
    };
    chart
      .configure_mesh()
      .x_desc(self.x_desc.as_str())
      .y_desc(self.y_desc.as_str())
      .x_labels(8)
      .x_label_formatter(&date_label)
      .draw()
      .map_err(render_err)?;

    let xy: Vec<(i64, f64)> = series
      .points()
      .iter()
      .enumerate()
      .map(|(i, p)| (i as i64, p.value as f64))
      .collect();
    chart
      .draw_series(LineSeries::new(xy.iter().copied(), BLUE.stroke_width(2)))
      .map_err(render_err)?
      .label(self.series_label.as_str())
      .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart
      .draw_series(xy.iter().map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())))
      .map_err(render_err)?;

    chart
      .configure_series_labels()
      .background_style(&WHITE.mix(0.8))
      .border_style(&BLACK)
      .draw()
      .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::chart::svg_texts;

  fn jan_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
  }

  #[test]
  fn consecutive_days_across_month_end() {
    let series = random_series(jan_first(), 40, 10, 100, 42).unwrap();
    assert_eq!(series.len(), 40);
    assert_eq!(series.points()[31].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert!(series.points().iter().all(|p| (10..100).contains(&p.value)));
  }

  #[test]
  fn bad_ranges_are_config_errors() {
    assert!(matches!(random_series(jan_first(), 0, 1, 2, 0), Err(Error::Config(_))));
    assert!(matches!(random_series(jan_first(), 5, 7, 7, 0), Err(Error::Config(_))));
  }

  #[test]
  fn head_prints_like_a_table() {
    let series = random_series(jan_first(), 30, 10, 100, 42).unwrap();
    let head = series.head(5);
    assert_eq!(head.len(), 5);
    let text = head.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains("Date"));
    assert!(lines[0].ends_with("Value"));
    assert!(lines[1].starts_with("0 2024-01-01"));
  }

  #[test]
  fn chart_has_title_axes_and_legend() {
    let series = random_series(jan_first(), 30, 10, 100, 42).unwrap();
    let svg = LineChart::default().render_svg_string(&series).unwrap();
    let texts = svg_texts(&svg);
    for expected in ["Random Data Visualization", "Date", "Value", "Random Values", "2024-01-01"] {
      assert!(texts.iter().any(|t| t == expected), "missing {}", expected);
    }
  }

  #[test]
  fn head_of_zero_is_empty_and_cannot_be_charted() {
    let series = random_series(jan_first(), 10, 0, 5, 3).unwrap();
    let head = series.head(0);
    assert!(head.is_empty());
    assert_eq!(head.start(), None);
    assert_eq!(head.value_range(), None);
    assert!(matches!(
      LineChart::default().render_svg_string(&head),
      Err(Error::Shape(_))
    ));
  }

  #[test]
  fn full_i64_value_range_renders() {
    let series = random_series(jan_first(), 3, i64::MIN, i64::MAX, 0).unwrap();
    assert!(LineChart::default().render_svg_string(&series).is_ok());
  }

  #[test]
  fn single_point_still_renders() {
    let series = random_series(jan_first(), 1, 0, 5, 1).unwrap();
    assert!(LineChart::default().render_svg_string(&series).is_ok());
  }

  #[test]
  fn missing_directory_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let series = random_series(jan_first(), 3, 0, 5, 1).unwrap();
    let path = dir.path().join("missing").join("chart.svg");
    let err = LineChart::default().render_svg(&series, &path).unwrap_err();
    assert!(matches!(err, Error::Render(_)));
  }

  proptest! {
    #[test]
    fn same_seed_same_series(seed in any::<u64>(), days in 1usize..60) {
      let a = random_series(jan_first(), days, -5, 5, seed).unwrap();
      let b = random_series(jan_first(), days, -5, 5, seed).unwrap();
      prop_assert_eq!(a, b);
    }
  }
}
