//! SVG line-chart generation for averaged cumulative series.
//!
//! Hand-rolled SVG so chart styling stays dependency-free and explicit:
//! - Monochrome line styles (solid/dashed/dotted) distinguish series
//! - All styling flows from an explicit config object, no global state
//! - Upper-left legend block, axis ticks and labels

use crate::parser::schema::SeriesPoint;
use crate::utils::config::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use crate::utils::error::ChartError;
use log::info;

// Plot area margins, in pixels
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

const TICK_COUNT: usize = 5;

/// Chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Simulation Metrics".to_string(),
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            x_label: "rounds".to_string(),
            y_label: String::new(),
        }
    }
}

impl ChartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }
}

/// Stroke pattern of one chart line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// SVG stroke-dasharray for this style, if any
    fn dash_array(&self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("8,4"),
            LineStyle::Dotted => Some("2,4"),
        }
    }
}

/// One labeled series of ordered round -> value points
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub label: String,
    pub style: LineStyle,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, style: LineStyle, points: Vec<SeriesPoint>) -> Self {
        Self {
            label: label.into(),
            style,
            points,
        }
    }
}

/// Generate an SVG line chart from averaged series
///
/// **Public** - main entry point for chart generation
///
/// # Errors
/// * `ChartError::EmptySeries` - no series, or only empty series
pub fn generate_chart(
    series: &[ChartSeries],
    config: Option<&ChartConfig>,
) -> Result<String, ChartError> {
    if series.iter().all(|s| s.points.is_empty()) {
        return Err(ChartError::EmptySeries);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating chart '{}' with {} series", config.title, series.len());

    let bounds = DataBounds::from_series(series);
    let width = config.width as f64;
    let height = config.height as f64;
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;

    let x_pos = |round: f64| MARGIN_LEFT + (round - bounds.x_min) / bounds.x_span() * plot_width;
    let y_pos =
        |value: f64| height - MARGIN_BOTTOM - (value - bounds.y_min) / bounds.y_span() * plot_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        config.width, config.height, config.width, config.height
    ));
    svg.push_str(r#"<style>text { font: 12px sans-serif; }</style>"#);
    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="white"/>"#,
        config.width, config.height
    ));

    // Title
    svg.push_str(&format!(
        r#"<text x="{}" y="24" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2.0,
        escape_text(&config.title)
    ));

    render_axes(&mut svg, &config, &bounds, &x_pos, &y_pos);

    // One polyline per non-empty series
    for entry in series {
        if entry.points.is_empty() {
            continue;
        }
        let coordinates: Vec<String> = entry
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", x_pos(p.round as f64), y_pos(p.value)))
            .collect();
        let dash = match entry.style.dash_array() {
            Some(pattern) => format!(r#" stroke-dasharray="{}""#, pattern),
            None => String::new(),
        };
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="black" stroke-width="1.5"{} points="{}"/>"#,
            dash,
            coordinates.join(" ")
        ));
    }

    render_legend(&mut svg, series);

    svg.push_str("</svg>");
    Ok(svg)
}

/// Data extent across all series
#[derive(Debug, Clone, Copy)]
struct DataBounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl DataBounds {
    fn from_series(series: &[ChartSeries]) -> Self {
        let mut bounds = Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            // The zero line stays visible whatever sign the data has
            y_min: 0.0,
            y_max: 0.0,
        };
        for entry in series {
            for point in &entry.points {
                bounds.x_min = bounds.x_min.min(point.round as f64);
                bounds.x_max = bounds.x_max.max(point.round as f64);
                bounds.y_min = bounds.y_min.min(point.value);
                bounds.y_max = bounds.y_max.max(point.value);
            }
        }
        bounds
    }

    fn x_span(&self) -> f64 {
        (self.x_max - self.x_min).max(1.0)
    }

    fn y_span(&self) -> f64 {
        (self.y_max - self.y_min).max(f64::EPSILON)
    }
}

/// Render axis lines, ticks, tick labels and axis labels
///
/// **Private** - internal rendering helper
fn render_axes(
    svg: &mut String,
    config: &ChartConfig,
    bounds: &DataBounds,
    x_pos: &impl Fn(f64) -> f64,
    y_pos: &impl Fn(f64) -> f64,
) {
    let width = config.width as f64;
    let height = config.height as f64;
    let axis_y = height - MARGIN_BOTTOM;

    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
        MARGIN_LEFT,
        axis_y,
        width - MARGIN_RIGHT,
        axis_y
    ));
    svg.push_str(&format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
        MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, axis_y
    ));

    for i in 0..=TICK_COUNT {
        let fraction = i as f64 / TICK_COUNT as f64;

        let x_value = bounds.x_min + fraction * (bounds.x_max - bounds.x_min);
        let x = x_pos(x_value);
        svg.push_str(&format!(
            r#"<line x1="{:.1}" y1="{}" x2="{:.1}" y2="{}" stroke="black"/>"#,
            x,
            axis_y,
            x,
            axis_y + 4.0
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{}" text-anchor="middle">{}</text>"#,
            x,
            axis_y + 18.0,
            format_value(x_value)
        ));

        let y_value = bounds.y_min + fraction * (bounds.y_max - bounds.y_min).max(0.0);
        let y = y_pos(y_value);
        svg.push_str(&format!(
            r#"<line x1="{}" y1="{:.1}" x2="{}" y2="{:.1}" stroke="black"/>"#,
            MARGIN_LEFT - 4.0,
            y,
            MARGIN_LEFT,
            y
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{:.1}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            MARGIN_LEFT - 8.0,
            y,
            format_value(y_value)
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + (width - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
        height - 12.0,
        escape_text(&config.x_label)
    ));
    if !config.y_label.is_empty() {
        let label_y = MARGIN_TOP + (height - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
        svg.push_str(&format!(
            r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">{}</text>"#,
            label_y,
            label_y,
            escape_text(&config.y_label)
        ));
    }
}

/// Render the upper-left legend block
///
/// **Private** - internal rendering helper
fn render_legend(svg: &mut String, series: &[ChartSeries]) {
    let entries: Vec<&ChartSeries> = series.iter().filter(|s| !s.points.is_empty()).collect();
    if entries.is_empty() {
        return;
    }

    let row_height = 18.0;
    let longest = entries.iter().map(|s| s.label.len()).max().unwrap_or(0);
    let box_width = longest as f64 * 7.0 + 48.0;
    let box_height = entries.len() as f64 * row_height + 10.0;
    let box_x = MARGIN_LEFT + 10.0;
    let box_y = MARGIN_TOP + 6.0;

    svg.push_str(&format!(
        r#"<rect x="{}" y="{}" width="{:.1}" height="{:.1}" fill="white" stroke="black" stroke-width="0.5"/>"#,
        box_x, box_y, box_width, box_height
    ));

    for (i, entry) in entries.iter().enumerate() {
        let row_y = box_y + 14.0 + i as f64 * row_height;
        let dash = match entry.style.dash_array() {
            Some(pattern) => format!(r#" stroke-dasharray="{}""#, pattern),
            None => String::new(),
        };
        svg.push_str(&format!(
            r#"<line x1="{}" y1="{:.1}" x2="{}" y2="{:.1}" stroke="black" stroke-width="1.5"{}/>"#,
            box_x + 6.0,
            row_y - 4.0,
            box_x + 34.0,
            row_y - 4.0,
            dash
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{:.1}">{}</text>"#,
            box_x + 40.0,
            row_y,
            escape_text(&entry.label)
        ));
    }
}

/// Compact tick-label formatting
///
/// **Private** - internal utility
fn format_value(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else if value.abs() >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Minimal XML escaping for user-visible labels
///
/// **Private** - internal utility
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
