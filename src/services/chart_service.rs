//! Chart renderer: dual-axis price/PBR figure with event markers.
//!
//! Output format follows the file extension: `.svg` and `.png` are static
//! plotters renders; `.html` wraps the SVG in a self-contained page whose
//! hover tooltip shows the exact date, USD close, PBR, and event labels of
//! the nearest plotted point. Purely presentational; values arrive already
//! normalized and aligned.

use std::fs;
use std::path::Path;

use chrono::{Days, NaiveDate, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::warn;

use crate::models::AlignedRow;
use crate::utils::errors::PipelineError;

// Layout constants shared by the plotters figure and the HTML hover script,
// which maps mouse X back to a date using the same plot-area bounds.
const MARGIN: u32 = 15;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 60;
const RIGHT_Y_LABEL_AREA: u32 = 60;

/// Presentation options for one render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Render the aligned rows to `output`. Zero rows produce an empty chart
/// frame; rows with nothing plottable are a data-gap error.
pub fn render(
    rows: &[AlignedRow],
    options: &RenderOptions,
    output: &Path,
) -> Result<(), PipelineError> {
    validate_rows(rows)?;

    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "svg" => write_output(output, render_svg_string(rows, options)?),
        "html" => write_output(output, render_html_string(rows, options)?),
        "png" => {
            let root =
                BitMapBackend::new(output, (options.width, options.height)).into_drawing_area();
            draw_chart(&root, rows, options)
        }
        other => Err(PipelineError::Render(format!(
            "unsupported output format '{}', use .html, .svg or .png",
            other
        ))),
    }
}

/// Render the figure to an SVG document in memory
pub fn render_svg_string(
    rows: &[AlignedRow],
    options: &RenderOptions,
) -> Result<String, PipelineError> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
        draw_chart(&root, rows, options)?;
    }
    Ok(svg)
}

/// Render the interactive page: the SVG figure plus the aligned rows as
/// JSON and a nearest-point hover tooltip
pub fn render_html_string(
    rows: &[AlignedRow],
    options: &RenderOptions,
) -> Result<String, PipelineError> {
    let svg = render_svg_string(rows, options)?;
    // A raw '<' in an event label could terminate the inline script block
    let rows_json = serde_json::to_string(rows)
        .map_err(|e| PipelineError::Render(format!("Failed to serialize rows: {}", e)))?
        .replace('<', "\\u003c");
    let (x_min, x_max) = date_bounds(rows);

    Ok(HTML_TEMPLATE
        .replace("__TITLE__", &escape_html(&options.title))
        .replace("__WIDTH__", &options.width.to_string())
        .replace("__SVG__", &svg)
        .replace("__ROWS__", &rows_json)
        .replace("__XMIN__", &x_min.to_string())
        .replace("__XMAX__", &x_max.to_string())
        .replace("__PLOT_LEFT__", &(MARGIN + Y_LABEL_AREA).to_string())
        .replace(
            "__PLOT_RIGHT__",
            &(options.width.saturating_sub(MARGIN + RIGHT_Y_LABEL_AREA)).to_string(),
        ))
}

fn validate_rows(rows: &[AlignedRow]) -> Result<(), PipelineError> {
    if rows.is_empty() {
        warn!("No data points in range, rendering an empty chart");
        return Ok(());
    }
    if rows.iter().all(|r| r.price.is_none() && r.pbr.is_none()) {
        return Err(PipelineError::DataGap(
            "fetched rows contain no price or PBR values".to_string(),
        ));
    }
    Ok(())
}

fn write_output(output: &Path, content: String) -> Result<(), PipelineError> {
    fs::write(output, content)
        .map_err(|e| PipelineError::Render(format!("Failed to write {}: {}", output.display(), e)))
}

fn render_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Render(e.to_string())
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: &[AlignedRow],
    options: &RenderOptions,
) -> Result<(), PipelineError>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(render_err)?;

    let (x_min, x_max) = date_bounds(rows);
    let (y_min, y_max) = value_bounds(rows, |r| r.price);
    let (pbr_min, pbr_max) = value_bounds(rows, |r| r.pbr);
    let has_price = rows.iter().any(|r| r.price.is_some());
    let has_pbr = rows.iter().any(|r| r.pbr.is_some());

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28.0).into_font())
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(RIGHT_Y_LABEL_AREA)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?
        .set_secondary_coord(x_min..x_max, pbr_min..pbr_max);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Close (USD)")
        .draw()
        .map_err(render_err)?;

    if has_pbr {
        chart
            .configure_secondary_axes()
            .y_desc("PBR")
            .draw()
            .map_err(render_err)?;
    }

    if has_price {
        let series: Vec<(NaiveDate, f64)> = rows
            .iter()
            .filter_map(|r| r.price.map(|p| (r.date, p)))
            .collect();
        chart
            .draw_series(LineSeries::new(series.iter().copied(), &BLUE))
            .map_err(render_err)?
            .label("Close (USD)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));
        chart
            .draw_series(
                series
                    .iter()
                    .map(|&(date, price)| Circle::new((date, price), 2, BLUE.filled())),
            )
            .map_err(render_err)?;
    }

    if has_pbr {
        let series = rows.iter().filter_map(|r| r.pbr.map(|v| (r.date, v)));
        chart
            .draw_secondary_series(LineSeries::new(series, &RED))
            .map_err(render_err)?
            .label("PBR")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));
    }

    for row in rows.iter().filter(|r| !r.events.is_empty()) {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(row.date, y_min), (row.date, y_max)],
                BLACK.mix(0.35),
            )))
            .map_err(render_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                row.events.join(", "),
                (row.date, y_max),
                ("sans-serif", 12).into_font().color(&BLACK.mix(0.7)),
            )))
            .map_err(render_err)?;
    }

    if has_price || has_pbr {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// X axis bounds; the upper bound always sits past the lower so plotters
/// never sees a zero-width range
fn date_bounds(rows: &[AlignedRow]) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let min = rows.first().map(|r| r.date).unwrap_or(today);
    let mut max = rows.last().map(|r| r.date).unwrap_or(today);
    if max <= min {
        max = min.checked_add_days(Days::new(1)).unwrap_or(min);
    }
    (min, max)
}

/// Y axis bounds with 10% padding around the observed values
fn value_bounds<F>(rows: &[AlignedRow], value: F) -> (f64, f64)
where
    F: Fn(&AlignedRow) -> Option<f64>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in rows {
        if let Some(v) = value(row) {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let range = (max - min).max(1e-8);
    let padding = range * 0.1;
    ((min - padding).max(0.0), max + padding)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
body { font-family: sans-serif; margin: 16px; }
#chart { width: __WIDTH__px; position: relative; }
#tooltip {
  display: none;
  position: absolute;
  background: rgba(255, 255, 255, 0.95);
  border: 1px solid gray;
  border-radius: 4px;
  padding: 6px 8px;
  font-size: 13px;
  pointer-events: none;
  white-space: nowrap;
}
</style>
</head>
<body>
<div id="chart">__SVG__</div>
<div id="tooltip"></div>
<script>
const ROWS = __ROWS__;
const X_MIN = Date.parse("__XMIN__");
const X_MAX = Date.parse("__XMAX__");
const PLOT_LEFT = __PLOT_LEFT__;
const PLOT_RIGHT = __PLOT_RIGHT__;

const chart = document.getElementById("chart");
const tooltip = document.getElementById("tooltip");
const times = ROWS.map(r => Date.parse(r.date));

function nearestRow(target) {
  let best = -1;
  let bestDist = Infinity;
  for (let i = 0; i < times.length; i++) {
    const dist = Math.abs(times[i] - target);
    if (dist < bestDist) { bestDist = dist; best = i; }
  }
  return best;
}

chart.addEventListener("mousemove", (ev) => {
  if (ROWS.length === 0 || X_MAX <= X_MIN || PLOT_RIGHT <= PLOT_LEFT) { return; }
  const rect = chart.getBoundingClientRect();
  const x = ev.clientX - rect.left;
  const frac = Math.min(1, Math.max(0, (x - PLOT_LEFT) / (PLOT_RIGHT - PLOT_LEFT)));
  const idx = nearestRow(X_MIN + frac * (X_MAX - X_MIN));
  if (idx < 0) { return; }
  const row = ROWS[idx];
  const lines = [];
  if (row.price !== null) { lines.push("Close: $" + row.price.toFixed(2)); }
  if (row.pbr !== null) { lines.push("PBR: " + row.pbr.toFixed(2)); }
  for (const label of row.events) { lines.push(label); }
  tooltip.replaceChildren();
  const head = document.createElement("b");
  head.textContent = row.date;
  tooltip.appendChild(head);
  for (const line of lines) {
    tooltip.appendChild(document.createElement("br"));
    // Text nodes keep markup in event labels inert
    tooltip.appendChild(document.createTextNode(line));
  }
  tooltip.style.display = "block";
  tooltip.style.left = (ev.pageX + 14) + "px";
  tooltip.style.top = (ev.pageY + 14) + "px";
});

chart.addEventListener("mouseleave", () => { tooltip.style.display = "none"; });
</script>
</body>
</html>
"#;
