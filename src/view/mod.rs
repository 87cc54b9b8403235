//! Chart assembly: turns filtered / aggregated tables into [`ChartSpec`]s.
//!
//! Nothing here draws; the egui shell and the JSON export both consume the
//! specifications as-is.
pub mod spec;
pub mod stats;

use crate::color::{category_color, ColorScale};
use crate::data::aggregate::Aggregation;
use crate::data::filter::FilterSelection;
use crate::data::model::{
    ForecastTable, GeoRecord, GroupAttribute, ProbabilityCategory, ProbabilityTable, ValueRange,
};

pub use spec::*;

pub const HISTOGRAM_BINS: usize = 20;
pub const PRECIPITATION_LABEL: &str = "Precipitation (mm)";
pub const PROBABILITY_LABEL: &str = "Probability (%)";

fn hover(label: &str, value: impl ToString) -> HoverField {
    HoverField {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn hover_opt(label: &str, value: Option<&str>) -> HoverField {
    hover(label, value.unwrap_or("-"))
}

fn center<R: GeoRecord>(rows: &[R]) -> (f64, f64) {
    let n = rows.len().max(1) as f64;
    let lat = rows.iter().map(|r| r.latitude()).sum::<f64>() / n;
    let lon = rows.iter().map(|r| r.longitude()).sum::<f64>() / n;
    (lat, lon)
}

// ---------------------------------------------------------------------------
// Forecast tab
// ---------------------------------------------------------------------------

/// Forecast markers colored on the RdBu scale. `global_range` keeps colors
/// comparable across filters; without it the subset's own range is used.
pub fn forecast_map(
    subset: &ForecastTable,
    selection: &FilterSelection,
    global_range: Option<ValueRange>,
) -> ChartSpec {
    let Some(size_range) = ValueRange::of(subset.iter().map(|r| r.forecast)) else {
        return ChartSpec::no_data(ChartIntent::Map);
    };

    let points = subset
        .iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            value: r.forecast,
            hover: vec![
                hover_opt("Department", r.location.department.as_deref()),
                hover_opt("Municipality", r.location.municipality.as_deref()),
                hover("Forecast", format!("{:.1}", r.forecast)),
            ],
        })
        .collect();

    ChartSpec::Map(MapSpec {
        title: format!("Precipitation forecast - {}", selection.value),
        points,
        color_scale: ColorScale::RdBu,
        color_range: global_range.unwrap_or(size_range),
        size_range,
        colorbar_title: PRECIPITATION_LABEL.to_string(),
        center: center(subset.rows()),
    })
}

/// Distribution of forecast values as a percent-normalized histogram.
pub fn forecast_histogram(subset: &ForecastTable) -> ChartSpec {
    let values: Vec<f64> = subset.iter().map(|r| r.forecast).collect();
    let bins = stats::histogram(&values, HISTOGRAM_BINS);
    if bins.is_empty() {
        return ChartSpec::no_data(ChartIntent::Histogram);
    }
    ChartSpec::Histogram(HistogramSpec {
        title: "Forecast precipitation distribution (%)".to_string(),
        x_label: PRECIPITATION_LABEL.to_string(),
        y_label: "Percent".to_string(),
        bins,
    })
}

/// Violin with embedded box and every point.
pub fn forecast_violin(subset: &ForecastTable) -> ChartSpec {
    let points: Vec<f64> = subset.iter().map(|r| r.forecast).collect();
    let Some(stats) = stats::box_stats(&points) else {
        return ChartSpec::no_data(ChartIntent::Violin);
    };
    ChartSpec::Violin(ViolinSpec {
        title: "Precipitation distribution".to_string(),
        y_label: PRECIPITATION_LABEL.to_string(),
        stats,
        density: stats::kernel_density(&points),
        points,
    })
}

// ---------------------------------------------------------------------------
// Probability tab
// ---------------------------------------------------------------------------

/// Probability markers sized and colored by percentage on `scale`.
pub fn probability_map(subset: &ProbabilityTable, scale: ColorScale) -> ChartSpec {
    let Some(range) = ValueRange::of(subset.iter().map(|r| r.percentage)) else {
        return ChartSpec::no_data(ChartIntent::Map);
    };

    let fmt_band = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    let points = subset
        .iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            value: r.percentage,
            hover: vec![
                hover("Latitude", format!("{:.3}", r.latitude)),
                hover("Longitude", format!("{:.3}", r.longitude)),
                hover_opt("Region", r.location.region.as_deref()),
                hover_opt("Department", r.location.department.as_deref()),
                hover_opt("Municipality", r.location.municipality.as_deref()),
                hover(
                    "Index",
                    r.category
                        .map_or_else(|| "-".to_string(), |c| format!("{} ({c})", c.index())),
                ),
                hover("Percentage", format!("{:.1}", r.percentage)),
                hover("Below", fmt_band(r.below)),
                hover("Normal", fmt_band(r.normal)),
                hover("Above", fmt_band(r.above)),
            ],
        })
        .collect();

    ChartSpec::Map(MapSpec {
        title: "Precipitation probability map".to_string(),
        points,
        color_scale: scale,
        color_range: range,
        size_range: range,
        colorbar_title: PROBABILITY_LABEL.to_string(),
        center: center(subset.rows()),
    })
}

/// Stacked Below / Normal / Above bars, one per aggregated group.
pub fn distribution_bars(aggregation: &Aggregation, selection: &FilterSelection) -> ChartSpec {
    if aggregation.groups.is_empty() {
        return ChartSpec::no_data(ChartIntent::StackedBar);
    }

    let series = ProbabilityCategory::ALL
        .iter()
        .map(|&category| BarSeries {
            category,
            label: category.label().to_string(),
            color: category_color(category).to_string(),
        })
        .collect();

    let footnote = (!aggregation.degenerate.is_empty()).then(|| {
        let keys: Vec<&str> = aggregation
            .degenerate
            .iter()
            .map(|d| d.key.as_str())
            .collect();
        format!(
            "{} without usable category data omitted: {}",
            plural(keys.len(), selection.attribute),
            keys.join(", ")
        )
    });

    ChartSpec::StackedBar(StackedBarSpec {
        title: format!(
            "Mean probability distribution by category in {}",
            selection.value
        ),
        group_by: selection.attribute,
        x_label: selection.attribute.label().to_string(),
        y_label: PROBABILITY_LABEL.to_string(),
        series,
        groups: aggregation.groups.clone(),
        excluded: aggregation.degenerate.clone(),
        footnote,
    })
}

fn plural(n: usize, attribute: GroupAttribute) -> String {
    let noun = match (attribute, n) {
        (GroupAttribute::Region, 1) => "region",
        (GroupAttribute::Region, _) => "regions",
        (GroupAttribute::Department, 1) => "department",
        (GroupAttribute::Department, _) => "departments",
        (GroupAttribute::Municipality, 1) => "municipality",
        (GroupAttribute::Municipality, _) => "municipalities",
    };
    format!("{n} {noun}")
}
