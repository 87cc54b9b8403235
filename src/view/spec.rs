use serde::Serialize;

use crate::color::ColorScale;
use crate::data::aggregate::{AggregatedGroup, DegenerateGroup};
use crate::data::model::{GroupAttribute, ProbabilityCategory, ValueRange};

// ---------------------------------------------------------------------------
// Chart specifications handed to the rendering layer
// ---------------------------------------------------------------------------

/// Kind of chart a slot of the dashboard holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartIntent {
    Map,
    Histogram,
    Violin,
    StackedBar,
}

/// A renderable chart, or the placeholder shown when there is nothing to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Map(MapSpec),
    Histogram(HistogramSpec),
    Violin(ViolinSpec),
    StackedBar(StackedBarSpec),
    NoData(NoDataSpec),
}

impl ChartSpec {
    pub fn no_data(intent: ChartIntent) -> Self {
        ChartSpec::NoData(NoDataSpec {
            intent,
            title: NO_DATA_TITLE.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Map(s) => &s.title,
            ChartSpec::Histogram(s) => &s.title,
            ChartSpec::Violin(s) => &s.title,
            ChartSpec::StackedBar(s) => &s.title,
            ChartSpec::NoData(s) => &s.title,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartSpec::NoData(_))
    }
}

pub const NO_DATA_TITLE: &str = "No data available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoDataSpec {
    pub intent: ChartIntent,
    pub title: String,
}

// -- Map --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverField {
    pub label: String,
    pub value: String,
}

/// One marker; `value` drives both size and color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    pub hover: Vec<HoverField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub title: String,
    pub points: Vec<MapPoint>,
    pub color_scale: ColorScale,
    /// Values mapped onto the ends of the color scale.
    pub color_range: ValueRange,
    /// Range of `value` over the plotted points, for marker sizing.
    pub size_range: ValueRange,
    pub colorbar_title: String,
    /// Mean position of the points.
    pub center: (f64, f64),
}

// -- Histogram --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    /// Share of rows falling in the bin, in percent.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<HistogramBin>,
}

// -- Violin --

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub max: f64,
}

/// Kernel density sample; `density` is scaled so the peak is 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPoint {
    pub value: f64,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinSpec {
    pub title: String,
    pub y_label: String,
    pub stats: BoxStats,
    pub points: Vec<f64>,
    pub density: Vec<DensityPoint>,
}

// -- Stacked bar --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub category: ProbabilityCategory,
    pub label: String,
    /// `#RRGGBB`.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarSpec {
    pub title: String,
    pub group_by: GroupAttribute,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<BarSeries>,
    pub groups: Vec<AggregatedGroup>,
    /// Groups left out because their category means could not be rescaled.
    pub excluded: Vec<DegenerateGroup>,
    pub footnote: Option<String>,
}
