//! Static charts rendered to SVG. There is no window to show them in, so they go to a file
//! (or a string, for tests).

pub mod timeseries;
pub mod venn;

pub use timeseries::{random_series, LineChart, Observation, TimeSeries};
pub use venn::{lens_area, solve_distance, Region, RegionStyle, VennDiagram, VennSizes};

use crate::Error;

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> Error {
  Error::Render(e.to_string())
}

/// Contents of every `<text>` element, trimmed.
#[cfg(test)]
pub(crate) fn svg_texts(svg: &str) -> Vec<String> {
  svg
    .split("<text")
    .skip(1)
    .filter_map(|s| {
      let body = &s[s.find('>')? + 1..];
      Some(body[..body.find("</text>")?].trim().to_string())
    })
    .collect()
}
