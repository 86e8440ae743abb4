//! Rendering of robustness curves as SVG line charts.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use tracing::instrument;

use crate::error::{Error, Result};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN: f64 = 60.0;
const COLOURS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// A named series plotted against the percentage of nodes removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    /// Legend text.
    pub label: String,
    /// Y values in removal order.
    pub values: Vec<f64>,
}

impl Curve {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Pairs each value with its x position, values being spread evenly over 0 to 100 percent.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let n = self.values.len();
        let step = if n > 1 { 100.0 / (n - 1) as f64 } else { 0.0 };

        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| (i as f64 * step, *value))
            .collect()
    }
}

/// Writes an SVG chart of `curves` with "Removed nodes, %" on the x axis.
pub fn render_svg(mut writer: impl Write, title: &str, curves: &[Curve]) -> io::Result<()> {
    let y_max = curves
        .iter()
        .flat_map(|curve| curve.values.iter().copied())
        .filter(|value| value.is_finite())
        .fold(1.0, f64::max);

    let plot_width = WIDTH - 2.0 * MARGIN;
    let plot_height = HEIGHT - 2.0 * MARGIN;
    let to_x = |percent: f64| MARGIN + percent / 100.0 * plot_width;
    let to_y = |value: f64| HEIGHT - MARGIN - value / y_max * plot_height;

    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" font-family="sans-serif" font-size="12">"#
    )?;
    writeln!(writer, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        writer,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
        WIDTH / 2.0,
        MARGIN / 2.0,
        escape(title)
    )?;

    // Axes and ticks.
    writeln!(
        writer,
        r#"<polyline points="{},{} {},{} {},{}" fill="none" stroke="black"/>"#,
        MARGIN,
        MARGIN,
        MARGIN,
        HEIGHT - MARGIN,
        WIDTH - MARGIN,
        HEIGHT - MARGIN
    )?;
    for tick in (0..=100).step_by(20) {
        let percent = f64::from(tick);
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{tick}</text>"#,
            to_x(percent),
            HEIGHT - MARGIN + 18.0
        )?;

        let value = y_max * percent / 100.0;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{value:.2}</text>"#,
            MARGIN - 6.0,
            to_y(value) + 4.0
        )?;
    }
    writeln!(
        writer,
        r#"<text x="{}" y="{}" text-anchor="middle">Removed nodes, %</text>"#,
        WIDTH / 2.0,
        HEIGHT - 15.0
    )?;
    writeln!(
        writer,
        r#"<text x="15" y="{}" text-anchor="middle" transform="rotate(-90 15 {})">Fraction of nodes</text>"#,
        HEIGHT / 2.0,
        HEIGHT / 2.0
    )?;

    for (i, curve) in curves.iter().enumerate() {
        let colour = COLOURS[i % COLOURS.len()];
        let points = curve
            .points()
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(percent, value)| format!("{:.2},{:.2}", to_x(percent), to_y(value)))
            .join(" ");

        writeln!(
            writer,
            r#"<polyline points="{points}" fill="none" stroke="{colour}" stroke-width="1.5"/>"#
        )?;

        // Legend entry.
        let legend_y = MARGIN + 16.0 * i as f64 + 10.0;
        writeln!(
            writer,
            r#"<line x1="{:.1}" y1="{legend_y:.1}" x2="{:.1}" y2="{legend_y:.1}" stroke="{colour}" stroke-width="2"/>"#,
            WIDTH - MARGIN - 150.0,
            WIDTH - MARGIN - 130.0
        )?;
        writeln!(
            writer,
            r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
            WIDTH - MARGIN - 125.0,
            legend_y + 4.0,
            escape(&curve.label)
        )?;
    }

    writeln!(writer, "</svg>")
}

/// Writes the chart to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be created or written.
#[instrument(name = "plot.write", err, skip_all, fields(path = %path.display(), curves = curves.len()))]
pub fn write_svg(path: &Path, title: &str, curves: &[Curve]) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::io(path, source))?;
    let mut writer = BufWriter::new(file);

    render_svg(&mut writer, title, curves)
        .and_then(|()| writer.flush())
        .map_err(|source| Error::io(path, source))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
