//! Grouped bar chart of pupils per section and school.
//!
//! The chart geometry is computed once by [`layout`] and then drawn by a
//! raster backend (PNG, JPEG) or a vector backend (PDF).

mod pdf;
mod raster;

use std::path::Path;
use tracing::info;

use crate::error::{GradebookError, Result};
use crate::grading::school::School;
use crate::summary::SectionSummary;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;

const PLOT_LEFT: f64 = 70.0;
const PLOT_RIGHT: f64 = 600.0;
const PLOT_TOP: f64 = 60.0;
const PLOT_BOTTOM: f64 = 440.0;
const GROUP_FILL: f64 = 0.8;

const TITLE: &str = "Performance of 4th grade";
const Y_LABEL: &str = "Number of pupils";

pub type Rgb = [u8; 3];

const AXIS: Rgb = [0, 0, 0];
const GRID: Rgb = [220, 220, 220];

/// Coordinates are in pixels with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Text placed with its baseline at `y`. Rotated labels read bottom to top
/// with their baseline running up through `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub anchor: Anchor,
    pub rotated: bool,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChartLayout {
    pub bars: Vec<Rect>,
    pub lines: Vec<Line>,
    pub labels: Vec<Label>,
}

/// File format of a chart, taken from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ChartFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "png" => Ok(ChartFormat::Png),
            "jpg" | "jpeg" => Ok(ChartFormat::Jpeg),
            "pdf" => Ok(ChartFormat::Pdf),
            _ => Err(GradebookError::UnsupportedChartFormat(extension)),
        }
    }
}

pub fn school_color(school: School) -> Rgb {
    match school {
        School::Gymnasium => [31, 119, 180],
        School::Realschule => [255, 127, 14],
        School::Orientierungsschule => [44, 160, 44],
        School::Mittelschule => [214, 39, 40],
    }
}

/// Renders `summary` to `path`; the format follows the extension.
#[tracing::instrument(skip(summary), fields(path = %path.display()))]
pub fn save_chart(summary: &SectionSummary, path: &Path) -> Result<()> {
    let format = ChartFormat::from_path(path)?;
    let layout = layout(summary);

    match format {
        ChartFormat::Png | ChartFormat::Jpeg => raster::render(&layout, path)?,
        ChartFormat::Pdf => {
            let bytes = pdf::render(&layout)?;
            std::fs::write(path, bytes).map_err(|e| GradebookError::io(path, e))?;
        }
    }

    info!(?format, sections = summary.sections.len(), "Chart saved");
    Ok(())
}

/// Step between y-axis ticks so that there are at most ten of them.
fn tick_step(max: usize) -> usize {
    max.div_ceil(10).max(1)
}

/// Computes bar, grid and label positions for a grouped bar chart with one
/// group per section and one bar per school.
pub fn layout(summary: &SectionSummary) -> ChartLayout {
    let mut chart = ChartLayout::default();

    let step = tick_step(summary.max_count());
    let axis_max = summary.max_count().div_ceil(step).max(1) * step;
    let scale = (PLOT_BOTTOM - PLOT_TOP) / axis_max as f64;

    for tick in (0..=axis_max).step_by(step) {
        let y = PLOT_BOTTOM - tick as f64 * scale;
        chart.lines.push(Line {
            x1: PLOT_LEFT,
            y1: y,
            x2: PLOT_RIGHT,
            y2: y,
            color: GRID,
        });
        chart.labels.push(Label {
            x: PLOT_LEFT - 8.0,
            y: y + 4.0,
            size: 10.0,
            anchor: Anchor::End,
            rotated: false,
            text: tick.to_string(),
        });
    }

    let groups = summary.sections.len().max(1) as f64;
    let group_width = (PLOT_RIGHT - PLOT_LEFT) / groups;
    let bar_width = group_width * GROUP_FILL / School::ALL.len() as f64;

    for (i, (section, schools)) in summary.sections.iter().enumerate() {
        let group_left = PLOT_LEFT + i as f64 * group_width;
        let first_bar = group_left + group_width * (1.0 - GROUP_FILL) / 2.0;

        for (j, school) in School::ALL.iter().enumerate() {
            let count = schools.get(school).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            let h = count as f64 * scale;
            chart.bars.push(Rect {
                x: first_bar + j as f64 * bar_width,
                y: PLOT_BOTTOM - h,
                w: bar_width,
                h,
                color: school_color(*school),
            });
        }

        chart.labels.push(Label {
            x: group_left + group_width / 2.0,
            y: PLOT_BOTTOM + 18.0,
            size: 11.0,
            anchor: Anchor::Middle,
            rotated: false,
            text: section.clone(),
        });
    }

    // Axes
    chart.lines.push(Line {
        x1: PLOT_LEFT,
        y1: PLOT_TOP,
        x2: PLOT_LEFT,
        y2: PLOT_BOTTOM,
        color: AXIS,
    });
    chart.lines.push(Line {
        x1: PLOT_LEFT,
        y1: PLOT_BOTTOM,
        x2: PLOT_RIGHT,
        y2: PLOT_BOTTOM,
        color: AXIS,
    });

    // Legend
    for (j, school) in School::ALL.iter().enumerate() {
        let y = PLOT_TOP + j as f64 * 22.0;
        chart.bars.push(Rect {
            x: PLOT_RIGHT + 20.0,
            y,
            w: 14.0,
            h: 14.0,
            color: school_color(*school),
        });
        chart.labels.push(Label {
            x: PLOT_RIGHT + 40.0,
            y: y + 11.0,
            size: 10.0,
            anchor: Anchor::Start,
            rotated: false,
            text: school.to_string(),
        });
    }

    chart.labels.push(Label {
        x: (PLOT_LEFT + PLOT_RIGHT) / 2.0,
        y: 32.0,
        size: 16.0,
        anchor: Anchor::Middle,
        rotated: false,
        text: TITLE.to_string(),
    });
    chart.labels.push(Label {
        x: PLOT_LEFT - 40.0,
        y: (PLOT_TOP + PLOT_BOTTOM) / 2.0,
        size: 11.0,
        anchor: Anchor::Middle,
        rotated: true,
        text: Y_LABEL.to_string(),
    });

    chart
}
