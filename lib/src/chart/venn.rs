use std::{f64::consts::PI, path::Path};

use plotters::{
  coord::Shift,
  prelude::*,
  style::text_anchor::{HPos, Pos, VPos},
};
use tracing::info;

use super::render_err;
use crate::{Error, Result};

/// Area of the intersection of two circles with radii `r1`, `r2` whose centres are `d` apart.
pub fn lens_area(r1: f64, r2: f64, d: f64) -> f64 {
  if d >= r1 + r2 {
    return 0.0;
  }
  if d <= (r1 - r2).abs() {
    let r = r1.min(r2);
    return PI * r * r;
  }
  let a1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1))
    .clamp(-1.0, 1.0)
    .acos();
  let a2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2))
    .clamp(-1.0, 1.0)
    .acos();
  let k = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);
  r1 * r1 * a1 + r2 * r2 * a2 - 0.5 * k.max(0.0).sqrt()
}

/// Centre distance at which the lens of two circles has area `overlap`. Bisection; the lens
/// shrinks monotonically as the circles move apart.
pub fn solve_distance(r1: f64, r2: f64, overlap: f64) -> f64 {
  let (mut lo, mut hi) = ((r1 - r2).abs(), r1 + r2);
  if overlap <= 0.0 {
    return hi;
  }
  if overlap >= lens_area(r1, r2, lo) {
    return lo;
  }
  for _ in 0..100 {
    let mid = 0.5 * (lo + hi);
    if lens_area(r1, r2, mid) > overlap {
      lo = mid;
    } else {
      hi = mid;
    }
  }
  0.5 * (lo + hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
  OnlyA,
  OnlyB,
  Both,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VennSizes {
  pub only_a: f64,
  pub only_b: f64,
  pub both: f64,
}

impl VennSizes {
  pub fn get(&self, region: Region) -> f64 {
    match region {
      Region::OnlyA => self.only_a,
      Region::OnlyB => self.only_b,
      Region::Both => self.both,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
  pub color: RGBColor,
  pub show_label: bool,
}

pub const GREY: RGBColor = RGBColor(128, 128, 128);
pub const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);
pub const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

/// Two overlapping circles, areas proportional to the set sizes.
#[derive(Debug, Clone)]
pub struct VennDiagram {
  pub set_labels: [String; 2],
  pub sizes: VennSizes,
  pub only_a: RegionStyle,
  pub only_b: RegionStyle,
  pub both: RegionStyle,
  pub background: RGBColor,
  pub title: String,
  pub size: (u32, u32),
}

/// Circle centres and radii in pixels.
#[derive(Debug, Clone, Copy)]
struct Placement {
  a: (f64, f64, f64),
  b: (f64, f64, f64),
}

impl VennDiagram {
  pub fn new(set_labels: [&str; 2], sizes: VennSizes) -> Result<Self> {
    let all = [sizes.only_a, sizes.only_b, sizes.both];
    if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
      return Err(Error::Config(format!(
        "region sizes must be finite and non-negative: {:?}",
        sizes
      )));
    }
    if sizes.only_a + sizes.both == 0.0 || sizes.only_b + sizes.both == 0.0 {
      return Err(Error::Config("both sets must be non-empty".into()));
    }
    Ok(Self {
      set_labels: set_labels.map(str::to_string),
      sizes,
      only_a: RegionStyle {
        color: RGBColor(255, 153, 153),
        show_label: true,
      },
      only_b: RegionStyle {
        color: RGBColor(153, 204, 255),
        show_label: true,
      },
      both: RegionStyle {
        color: RGBColor(204, 153, 204),
        show_label: true,
      },
      background: WHITE,
      title: String::new(),
      size: (600, 400),
    })
  }

  /// A∩B kept visible in light grey, the one-set-only regions greyed out without labels,
  /// and the complement union shown as a green background.
  pub fn highlighted_complement() -> Self {
    let grey_out = RegionStyle {
      color: GREY,
      show_label: false,
    };
    Self {
      set_labels: ["A".to_string(), "B".to_string()],
      sizes: VennSizes {
        only_a: 2.0,
        only_b: 2.0,
        both: 1.0,
      },
      only_a: grey_out,
      only_b: grey_out,
      both: RegionStyle {
        color: LIGHT_GREY,
        show_label: true,
      },
      background: LIGHT_GREEN,
      title: "Highlighted: A∩B (gray) and A^c ∪ B^c (green background)".to_string(),
      size: (600, 400),
    }
  }

  pub fn style(&self, region: Region) -> &RegionStyle {
    match region {
      Region::OnlyA => &self.only_a,
      Region::OnlyB => &self.only_b,
      Region::Both => &self.both,
    }
  }

  pub fn style_mut(&mut self, region: Region) -> &mut RegionStyle {
    match region {
      Region::OnlyA => &mut self.only_a,
      Region::OnlyB => &mut self.only_b,
      Region::Both => &mut self.both,
    }
  }

  /// Radii (of A and B) and centre distance in data units.
  pub fn geometry(&self) -> (f64, f64, f64) {
    let ra = ((self.sizes.only_a + self.sizes.both) / PI).sqrt();
    let rb = ((self.sizes.only_b + self.sizes.both) / PI).sqrt();
    (ra, rb, solve_distance(ra, rb, self.sizes.both))
  }

  fn place(&self, width: f64, height: f64) -> Placement {
    const MARGIN: f64 = 40.0;
    let (ra, rb, d) = self.geometry();
    let left = (-ra).min(d - rb);
    let right = ra.max(d + rb);
    let tall = 2.0 * ra.max(rb);
    let scale = ((width - 2.0 * MARGIN) / (right - left))
      .min((height - 2.0 * MARGIN) / tall)
      .max(1.0);
    let origin = (width - (right - left) * scale) / 2.0 - left * scale;
    let cy = height / 2.0;
    Placement {
      a: (origin, cy, ra * scale),
      b: (origin + d * scale, cy, rb * scale),
    }
  }

  pub fn render_svg(&self, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, self.size).into_drawing_area();
    self.draw(root)?;
    info!(path = %path.display(), "venn diagram written");
    Ok(())
  }

  pub fn render_svg_string(&self) -> Result<String> {
    let mut svg = String::new();
    {
      let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
      self.draw(root)?;
    }
    Ok(svg)
  }

  fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&self.background).map_err(render_err)?;
    let area = if self.title.is_empty() {
      root.clone()
    } else {
      root
        .titled(&self.title, ("sans-serif", 20))
        .map_err(render_err)?
    };
    let (w, h) = area.dim_in_pixel();
    let p = self.place(w as f64, h as f64);
    let centre = |(x, y, _): (f64, f64, f64)| (x.round() as i32, y.round() as i32);
    let radius = |(_, _, r): (f64, f64, f64)| r.round() as i32;

    area
      .draw(&Circle::new(centre(p.a), radius(p.a), self.only_a.color.filled()))
      .map_err(render_err)?;
    area
      .draw(&Circle::new(centre(p.b), radius(p.b), self.only_b.color.filled()))
      .map_err(render_err)?;
    if self.sizes.both > 0.0 {
      area
        .draw(&Polygon::new(lens_outline(&p), self.both.color.filled()))
        .map_err(render_err)?;
    }
    for c in [p.a, p.b] {
      area
        .draw(&Circle::new(centre(c), radius(c), BLACK.stroke_width(1)))
        .map_err(render_err)?;
    }

    let text = TextStyle::from(("sans-serif", 18).into_font())
      .color(&BLACK)
      .pos(Pos::new(HPos::Center, VPos::Center));
    let (ax, ay, ar) = p.a;
    let (bx, by, br) = p.b;
    let set_labels = [
      (&self.set_labels[0], ax, ay - ar - 14.0),
      (&self.set_labels[1], bx, by - br - 14.0),
    ];
    for (label, x, y) in set_labels {
      area
        .draw(&Text::new(label.clone(), (x as i32, y as i32), text.clone()))
        .map_err(render_err)?;
    }
    let regions = [
      (Region::OnlyA, 0.5 * ((ax - ar) + (bx - br))),
      (Region::Both, 0.5 * ((bx - br) + (ax + ar))),
      (Region::OnlyB, 0.5 * ((ax + ar) + (bx + br))),
    ];
    for (region, x) in regions {
      if !self.style(region).show_label {
        continue;
      }
      area
        .draw(&Text::new(
          format_size(self.sizes.get(region)),
          (x.round() as i32, ay.round() as i32),
          text.clone(),
        ))
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
  }
}

fn format_size(v: f64) -> String {
  if v.fract() == 0.0 {
    format!("{}", v as i64)
  } else {
    format!("{:.2}", v)
  }
}

/// Boundary of the intersection of the two circles. The lens is convex, so sorting the
/// boundary samples by angle around their centroid yields its outline.
fn lens_outline(p: &Placement) -> Vec<(i32, i32)> {
  const STEPS: usize = 720;
  let ring = |(cx, cy, r): (f64, f64, f64)| {
    (0..STEPS).map(move |i| {
      let t = 2.0 * PI * i as f64 / STEPS as f64;
      (cx + r * t.cos(), cy + r * t.sin())
    })
  };
  let inside = |(x, y): (f64, f64), (cx, cy, r): (f64, f64, f64)| {
    (x - cx).powi(2) + (y - cy).powi(2) <= r * r + 1e-6
  };
  let mut points: Vec<(f64, f64)> = ring(p.a)
    .filter(|&q| inside(q, p.b))
    .chain(ring(p.b).filter(|&q| inside(q, p.a)))
    .collect();
  if points.is_empty() {
    return Vec::new();
  }
  let n = points.len() as f64;
  let (mx, my) = points
    .iter()
    .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
  let (mx, my) = (mx / n, my / n);
  points.sort_by(|(x1, y1), (x2, y2)| {
    let a1 = (y1 - my).atan2(x1 - mx);
    let a2 = (y2 - my).atan2(x2 - mx);
    a1.total_cmp(&a2)
  });
  points
    .into_iter()
    .map(|(x, y)| (x.round() as i32, y.round() as i32))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chart::svg_texts;

  #[test]
  fn lens_area_limits() {
    assert_eq!(lens_area(1.0, 1.0, 2.0), 0.0);
    assert!((lens_area(1.0, 2.0, 0.5) - PI).abs() < 1e-12);
    // two unit circles one radius apart
    let expected = 2.0 * PI / 3.0 - 3f64.sqrt() / 2.0;
    assert!((lens_area(1.0, 1.0, 1.0) - expected).abs() < 1e-12);
  }

  #[test]
  fn lens_shrinks_as_circles_separate() {
    let mut last = f64::INFINITY;
    for i in 0..=20 {
      let area = lens_area(1.0, 1.5, 0.5 + 2.0 * i as f64 / 20.0);
      assert!(area <= last);
      last = area;
    }
  }

  #[test]
  fn solved_distance_reproduces_overlap() {
    for overlap in [0.1, 0.5, 1.0, 2.0] {
      let d = solve_distance(1.0, 1.2, overlap);
      assert!((lens_area(1.0, 1.2, d) - overlap).abs() < 1e-9, "overlap {}", overlap);
    }
    assert_eq!(solve_distance(1.0, 1.0, 0.0), 2.0);
    assert_eq!(solve_distance(1.0, 2.0, 100.0), 1.0);
  }

  #[test]
  fn highlighted_complement_geometry_matches_sizes() {
    let venn = VennDiagram::highlighted_complement();
    let (ra, rb, d) = venn.geometry();
    assert!((PI * ra * ra - 3.0).abs() < 1e-9);
    assert!((ra - rb).abs() < 1e-12);
    assert!((lens_area(ra, rb, d) - 1.0).abs() < 1e-9);
  }

  #[test]
  fn hidden_labels_are_not_drawn() {
    let svg = VennDiagram::highlighted_complement()
      .render_svg_string()
      .unwrap();
    assert!(svg.contains("<svg"));
    let texts = svg_texts(&svg);
    assert!(texts.iter().any(|t| t.starts_with("Highlighted")));
    assert!(texts.contains(&"1".to_string()));
    assert!(!texts.contains(&"2".to_string()));
  }

  #[test]
  fn rejects_empty_sets() {
    let sizes = VennSizes {
      only_a: 0.0,
      only_b: 3.0,
      both: 0.0,
    };
    assert!(matches!(VennDiagram::new(["A", "B"], sizes), Err(Error::Config(_))));
  }

  #[test]
  fn region_styles_are_editable() {
    let sizes = VennSizes {
      only_a: 3.0,
      only_b: 1.5,
      both: 0.5,
    };
    let mut venn = VennDiagram::new(["X", "Y"], sizes).unwrap();
    venn.style_mut(Region::OnlyB).show_label = false;
    let texts = svg_texts(&venn.render_svg_string().unwrap());
    assert!(texts.contains(&"3".to_string()));
    assert!(texts.contains(&"0.50".to_string()));
    assert!(!texts.contains(&"1.50".to_string()));
  }
}
