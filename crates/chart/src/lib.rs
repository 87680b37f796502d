//! SVG rendering of the daily word-count series.
//!
//! Output depends only on the series and the options: no clock, no
//! randomness, fixed numeric precision. Rendering the same input twice yields
//! the same bytes.

mod format;

use std::fmt::Write;

use progress_core::TimeSeries;
use serde::{Deserialize, Serialize};

pub use format::{escape_xml, signed_thousands, thousands};

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;
const HEADER: f64 = 30.0;
const PLOT_LEFT: f64 = PADDING;
const PLOT_RIGHT: f64 = WIDTH - PADDING;
const PLOT_TOP: f64 = PADDING + HEADER;
const PLOT_BOTTOM: f64 = HEIGHT - PADDING;

const GREEN: &str = "#2ea44f";
const RED: &str = "#cf222e";
const MUTED: &str = "#57606a";
const INK: &str = "#24292f";
const BORDER: &str = "#d0d7de";

pub const DEFAULT_TITLE: &str = "📝 LaTeX Writing Progress";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("chart geometry is not finite at point {index}")]
    Geometry { index: usize },
    #[error("format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

fn plot_points(words: &[u64]) -> Result<Vec<Point>> {
    let lo = words.iter().copied().min().unwrap_or(0);
    let hi = words.iter().copied().max().unwrap_or(0);
    let span = (hi - lo) as f64;
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let x = if last == 0 {
                (PLOT_LEFT + PLOT_RIGHT) / 2.0
            } else {
                PLOT_LEFT + (index as f64) * (PLOT_RIGHT - PLOT_LEFT) / (last as f64)
            };
            let y = if span == 0.0 {
                (PLOT_TOP + PLOT_BOTTOM) / 2.0
            } else {
                PLOT_BOTTOM - ((value - lo) as f64 / span) * (PLOT_BOTTOM - PLOT_TOP)
            };
            if x.is_finite() && y.is_finite() {
                Ok(Point { x, y })
            } else {
                Err(RenderError::Geometry { index })
            }
        })
        .collect()
}

fn change_caption(change: i64) -> (String, &'static str) {
    match change {
        0 => ("No change today".to_string(), MUTED),
        value if value > 0 => (format!("{} words today", signed_thousands(value)), GREEN),
        value => (format!("{} words today", signed_thousands(value)), RED),
    }
}

pub fn render_svg(series: &TimeSeries, options: &ChartOptions) -> Result<String> {
    if series.is_empty() {
        return render_empty(options);
    }

    let deltas = series.deltas();
    let words = deltas.iter().map(|delta| delta.total).collect::<Vec<_>>();
    let points = plot_points(&words)?;
    let first = deltas[0];
    let latest = deltas[deltas.len() - 1];
    let lo = words.iter().copied().min().unwrap_or(0);
    let hi = words.iter().copied().max().unwrap_or(0);
    let (caption, caption_color) = change_caption(latest.change);
    let title = escape_xml(&options.title);

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="{title}">"#,
        w = WIDTH,
        h = HEIGHT,
    )?;
    writeln!(svg, "  <style>")?;
    writeln!(svg, "    .title {{ font: bold 14px sans-serif; fill: {INK}; }}")?;
    writeln!(svg, "    .total {{ font: bold 18px sans-serif; fill: {INK}; }}")?;
    writeln!(
        svg,
        "    .change {{ font: bold 12px sans-serif; fill: {caption_color}; }}"
    )?;
    writeln!(svg, "    .label {{ font: 10px sans-serif; fill: {MUTED}; }}")?;
    writeln!(svg, "  </style>")?;
    writeln!(
        svg,
        r##"  <rect width="{WIDTH}" height="{HEIGHT}" fill="#ffffff" rx="6" stroke="{BORDER}"/>"##
    )?;
    writeln!(
        svg,
        r#"  <text x="{PADDING}" y="25" class="title">{title}</text>"#
    )?;
    writeln!(
        svg,
        r#"  <text x="{PLOT_RIGHT}" y="20" class="total" text-anchor="end">{} words</text>"#,
        thousands(latest.total)
    )?;
    writeln!(
        svg,
        r#"  <text x="{PLOT_RIGHT}" y="35" class="change" text-anchor="end">{caption}</text>"#
    )?;
    writeln!(
        svg,
        r#"  <line x1="{PLOT_LEFT}" y1="{PLOT_BOTTOM:.1}" x2="{PLOT_RIGHT}" y2="{PLOT_BOTTOM:.1}" stroke="{BORDER}" stroke-width="1"/>"#
    )?;
    writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" class="label" text-anchor="end">{}</text>"#,
        PLOT_LEFT - 4.0,
        PLOT_TOP + 3.0,
        thousands(hi)
    )?;
    if hi != lo {
        writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" class="label" text-anchor="end">{}</text>"#,
            PLOT_LEFT - 4.0,
            PLOT_BOTTOM + 3.0,
            thousands(lo)
        )?;
    }

    let mut polyline = String::new();
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            polyline.push(' ');
        }
        write!(polyline, "{:.1},{:.1}", point.x, point.y)?;
    }
    writeln!(
        svg,
        r#"  <polyline points="{polyline}" fill="none" stroke="{GREEN}" stroke-width="2" stroke-linejoin="round" stroke-linecap="round"/>"#
    )?;
    for (delta, point) in deltas.iter().zip(&points) {
        let color = if delta.change < 0 { RED } else { GREEN };
        writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="3" fill="{color}"><title>{}: {} words ({})</title></circle>"#,
            point.x,
            point.y,
            delta.date,
            thousands(delta.total),
            signed_thousands(delta.change)
        )?;
    }

    let days = if deltas.len() == 1 { "day" } else { "days" };
    writeln!(
        svg,
        r#"  <text x="{PADDING}" y="{:.1}" class="label">{} {days} since {}</text>"#,
        HEIGHT - 10.0,
        deltas.len(),
        first.date
    )?;
    writeln!(
        svg,
        r#"  <text x="{PLOT_RIGHT}" y="{:.1}" class="label" text-anchor="end">Updated: {}</text>"#,
        HEIGHT - 10.0,
        latest.date
    )?;
    writeln!(svg, "</svg>")?;
    Ok(svg)
}

fn render_empty(options: &ChartOptions) -> Result<String> {
    let title = escape_xml(&options.title);
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="120" viewBox="0 0 400 120" role="img" aria-label="{title}">"#
    )?;
    writeln!(svg, "  <style>")?;
    writeln!(svg, "    .title {{ font: bold 14px sans-serif; fill: {INK}; }}")?;
    writeln!(svg, "    .subtitle {{ font: 12px sans-serif; fill: {MUTED}; }}")?;
    writeln!(svg, "  </style>")?;
    writeln!(svg, r##"  <rect width="400" height="120" fill="#f6f8fa" rx="6"/>"##)?;
    writeln!(
        svg,
        r#"  <text x="200" y="50" class="title" text-anchor="middle">{title}</text>"#
    )?;
    writeln!(
        svg,
        r#"  <text x="200" y="75" class="subtitle" text-anchor="middle">No data yet. Start writing!</text>"#
    )?;
    writeln!(svg, "</svg>")?;
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_sits_mid_plot() {
        let points = plot_points(&[10, 10, 10]).expect("points");
        let mid = (PLOT_TOP + PLOT_BOTTOM) / 2.0;
        assert!(points.iter().all(|point| point.y == mid));
        assert_eq!(points[0].x, PLOT_LEFT);
        assert_eq!(points[2].x, PLOT_RIGHT);
    }

    #[test]
    fn single_point_is_centered() {
        let points = plot_points(&[42]).expect("points");
        assert_eq!(points[0].x, (PLOT_LEFT + PLOT_RIGHT) / 2.0);
    }

    #[test]
    fn extremes_touch_plot_bounds() {
        let points = plot_points(&[100, 300, 200]).expect("points");
        assert_eq!(points[0].y, PLOT_BOTTOM);
        assert_eq!(points[1].y, PLOT_TOP);
    }

    #[test]
    fn change_caption_colors() {
        assert_eq!(change_caption(0).1, MUTED);
        assert_eq!(change_caption(5).0, "+5 words today");
        assert_eq!(change_caption(-1200).0, "-1,200 words today");
        assert_eq!(change_caption(-1).1, RED);
    }
}
