use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Sense, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};
use palette::Srgb;

use crate::color::parse_hex;
use crate::dashboard::TabView;
use crate::state::AppState;
use crate::ui::table;
use crate::view::{
    ChartIntent, ChartSpec, HistogramSpec, MapSpec, NoDataSpec, StackedBarSpec, ViolinSpec,
};

const MAP_HEIGHT: f32 = 600.0;
const CHART_HEIGHT: f32 = 360.0;
/// Map markers are grouped into this many color classes.
const COLOR_BUCKETS: usize = 16;
/// Marker radii come in this many steps.
const SIZE_CLASSES: usize = 8;

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Central panel: every chart of the active tab
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, state: &AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, chart) in state.view.content.charts().into_iter().enumerate() {
                chart_view(ui, &format!("chart_{i}"), chart);
                ui.add_space(16.0);
            }

            if let TabView::Probability { groups, .. } = &state.view.content {
                if !groups.is_empty() {
                    ui.strong("Category distribution by group");
                    table::groups_table(ui, state.view.attribute, groups);
                }
            }
        });
}

/// Render one chart specification.
pub fn chart_view(ui: &mut Ui, id: &str, chart: &ChartSpec) {
    ui.heading(chart.title());
    match chart {
        ChartSpec::Map(spec) => map(ui, id, spec),
        ChartSpec::Histogram(spec) => histogram(ui, id, spec),
        ChartSpec::Violin(spec) => violin(ui, id, spec),
        ChartSpec::StackedBar(spec) => stacked_bar(ui, id, spec),
        ChartSpec::NoData(spec) => no_data(ui, spec),
    }
}

fn no_data(ui: &mut Ui, spec: &NoDataSpec) {
    let height = match spec.intent {
        ChartIntent::Map => MAP_HEIGHT,
        _ => CHART_HEIGHT,
    };
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height * 0.3),
        Sense::hover(),
    );
    ui.painter()
        .rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Nothing matches the current filter",
        egui::FontId::proportional(16.0),
        ui.visuals().weak_text_color(),
    );
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Color class and size class of one marker, each from the point's own value
/// on the matching range.
fn marker_class(spec: &MapSpec, value: f64) -> (usize, usize) {
    let class = |t: f64, n: usize| ((t * n as f64) as usize).min(n - 1);
    (
        class(spec.color_range.normalize(value), COLOR_BUCKETS),
        class(spec.size_range.normalize(value), SIZE_CLASSES),
    )
}

fn marker_radius(size_class: usize) -> f32 {
    2.0 + 6.0 * (size_class as f32 + 0.5) / SIZE_CLASSES as f32
}

fn map(ui: &mut Ui, id: &str, spec: &MapSpec) {
    // egui_plot styles a whole series at once, so markers sharing a class pair
    // go into one series.
    let mut classes: BTreeMap<(usize, usize), Vec<[f64; 2]>> = BTreeMap::new();
    for p in &spec.points {
        classes
            .entry(marker_class(spec, p.value))
            .or_default()
            .push([p.longitude, p.latitude]);
    }

    Plot::new(id)
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for ((color_class, size_class), coords) in classes {
                let t = (color_class as f64 + 0.5) / COLOR_BUCKETS as f64;
                let value = spec.color_range.min + t * spec.color_range.span();
                let points: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(marker_radius(size_class))
                        .color(to_color32(spec.color_scale.evaluate(t)))
                        .name(format!("{value:.1}")),
                );
            }
        });

    colorbar(ui, spec);
}

fn colorbar(ui: &mut Ui, spec: &MapSpec) {
    const STEPS: usize = 48;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{}  {:.1}", spec.colorbar_title, spec.color_range.min));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(240.0, 12.0), Sense::hover());
        let step = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let x0 = rect.left() + step * i as f32;
            let segment = egui::Rect::from_min_max(
                egui::pos2(x0, rect.top()),
                egui::pos2(x0 + step, rect.bottom()),
            );
            let t = (i as f64 + 0.5) / STEPS as f64;
            ui.painter()
                .rect_filled(segment, 0.0, to_color32(spec.color_scale.evaluate(t)));
        }
        ui.label(format!("{:.1}  ({})", spec.color_range.max, spec.color_scale.name()));
    });
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, id: &str, spec: &HistogramSpec) {
    let bars: Vec<Bar> = spec
        .bins
        .iter()
        .map(|bin| {
            let width = (bin.end - bin.start).max(1.0);
            Bar::new((bin.start + bin.end) / 2.0, bin.percent)
                .width(width)
                .name(format!("{:.1} – {:.1}", bin.start, bin.end))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(99, 110, 250)));
        });
}

// ---------------------------------------------------------------------------
// Violin
// ---------------------------------------------------------------------------

fn violin(ui: &mut Ui, id: &str, spec: &ViolinSpec) {
    const HALF_WIDTH: f64 = 0.4;
    let fill = Color32::from_rgb(99, 110, 250);
    let s = spec.stats;

    let right: PlotPoints = spec
        .density
        .iter()
        .map(|p| [p.density * HALF_WIDTH, p.value])
        .collect();
    let left: PlotPoints = spec
        .density
        .iter()
        .map(|p| [-p.density * HALF_WIDTH, p.value])
        .collect();

    // Deterministic jitter beside the violin, one column of dots.
    let dots: PlotPoints = spec
        .points
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let jitter = ((i * 7919) % 97) as f64 / 97.0 * 0.15;
            [0.55 + jitter, v]
        })
        .collect();

    let boxed = BoxElem::new(
        0.0,
        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
    )
    .box_width(0.12)
    .fill(fill.gamma_multiply(0.5))
    .name("Box");

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(spec.y_label.as_str())
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(right).color(fill).width(1.5));
            plot_ui.line(Line::new(left).color(fill).width(1.5));
            plot_ui.box_plot(BoxPlot::new(vec![boxed]));
            plot_ui.points(Points::new(dots).radius(2.0).color(fill.gamma_multiply(0.7)));
        });

    ui.label(
        RichText::new(format!(
            "median {:.1}   IQR {:.1} – {:.1}   range {:.1} – {:.1}",
            s.median, s.q1, s.q3, s.min, s.max
        ))
        .weak(),
    );
}

// ---------------------------------------------------------------------------
// Stacked bars
// ---------------------------------------------------------------------------

fn stacked_bar(ui: &mut Ui, id: &str, spec: &StackedBarSpec) {
    let mut stacked: Vec<BarChart> = Vec::with_capacity(spec.series.len());
    for series in &spec.series {
        let color = parse_hex(&series.color)
            .map(to_color32)
            .unwrap_or(Color32::GRAY);
        let bars: Vec<Bar> = spec
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Bar::new(i as f64, g.percent(series.category))
                    .width(0.7)
                    .name(&g.key)
            })
            .collect();
        let below: Vec<&BarChart> = stacked.iter().collect();
        let chart = BarChart::new(bars)
            .name(&series.label)
            .color(color)
            .stack_on(&below);
        stacked.push(chart);
    }

    let labels: Vec<String> = spec.groups.iter().map(|g| g.key.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .include_y(0.0)
        .include_y(100.0)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && i >= 0.0 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for chart in stacked {
                plot_ui.bar_chart(chart);
            }
        });

    if let Some(note) = &spec.footnote {
        ui.label(RichText::new(note).italics().weak());
    }
}
