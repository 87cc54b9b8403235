//! Reactive wiring: tab → attribute → value → charts.
//!
//! Every output is a pure function of the base tables and the current
//! [`DashboardState`]. A state change produces a new state, and the whole view
//! is evaluated again from the base tables; no filtered subset survives
//! between interactions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::select_palette;
use crate::data::aggregate::{aggregate, AggregatedGroup};
use crate::data::catalog::filter_options;
use crate::data::filter::{apply, FilterSelection, FilterValue};
use crate::data::model::GroupAttribute;
use crate::data::store::DatasetStore;
use crate::view::{self, ChartIntent, ChartSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Tab {
    #[default]
    Forecast,
    Probability,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Forecast, Tab::Probability];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Forecast => "Precipitation forecast",
            Tab::Probability => "Precipitation probabilities",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forecast" => Ok(Tab::Forecast),
            "probability" | "probabilities" => Ok(Tab::Probability),
            other => Err(format!("unknown tab '{other}' (expected forecast or probability)")),
        }
    }
}

/// Everything the user can select. Transitions return a fresh state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub tab: Tab,
    pub selection: FilterSelection,
}

impl DashboardState {
    /// Switching tab rebuilds the tab's controls at their defaults.
    pub fn with_tab(&self, tab: Tab) -> Self {
        DashboardState {
            tab,
            selection: FilterSelection::default(),
        }
    }

    /// A new attribute has a different universe of values, so the value
    /// resets to `All`.
    pub fn with_attribute(&self, attribute: GroupAttribute) -> Self {
        DashboardState {
            tab: self.tab,
            selection: FilterSelection::all(attribute),
        }
    }

    pub fn with_value(&self, value: FilterValue) -> Self {
        DashboardState {
            tab: self.tab,
            selection: FilterSelection::new(self.selection.attribute, value),
        }
    }
}

/// Charts of one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum TabView {
    Forecast {
        map: ChartSpec,
        histogram: ChartSpec,
        violin: ChartSpec,
    },
    Probability {
        map: ChartSpec,
        distribution: ChartSpec,
        /// Rescaled groups, also listed as a table under the chart.
        groups: Vec<AggregatedGroup>,
    },
}

impl TabView {
    pub fn charts(&self) -> Vec<&ChartSpec> {
        match self {
            TabView::Forecast {
                map,
                histogram,
                violin,
            } => vec![map, histogram, violin],
            TabView::Probability {
                map, distribution, ..
            } => vec![map, distribution],
        }
    }
}

/// Everything the rendering layer needs for the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub attribute: GroupAttribute,
    pub value: FilterValue,
    /// Options for the value selector, `All` first.
    pub options: Vec<FilterValue>,
    /// Rows left after filtering.
    pub matching_rows: usize,
    pub content: TabView,
}

/// Evaluate the whole dashboard for `state`.
pub fn evaluate(store: &DatasetStore, state: &DashboardState) -> DashboardView {
    let selection = &state.selection;
    match state.tab {
        Tab::Forecast => {
            let options = filter_options(store.forecast(), selection.attribute);
            let subset = apply(store.forecast(), selection);
            let content = if subset.is_empty() {
                TabView::Forecast {
                    map: ChartSpec::no_data(ChartIntent::Map),
                    histogram: ChartSpec::no_data(ChartIntent::Histogram),
                    violin: ChartSpec::no_data(ChartIntent::Violin),
                }
            } else {
                TabView::Forecast {
                    map: view::forecast_map(&subset, selection, store.forecast_range()),
                    histogram: view::forecast_histogram(&subset),
                    violin: view::forecast_violin(&subset),
                }
            };
            DashboardView {
                attribute: selection.attribute,
                value: selection.value.clone(),
                options,
                matching_rows: subset.len(),
                content,
            }
        }
        Tab::Probability => {
            let options = filter_options(store.probability(), selection.attribute);
            let subset = apply(store.probability(), selection);
            let content = if subset.is_empty() {
                TabView::Probability {
                    map: ChartSpec::no_data(ChartIntent::Map),
                    distribution: ChartSpec::no_data(ChartIntent::StackedBar),
                    groups: Vec::new(),
                }
            } else {
                let aggregation = aggregate(&subset, selection.attribute);
                TabView::Probability {
                    map: view::probability_map(&subset, select_palette(&subset)),
                    distribution: view::distribution_bars(&aggregation, selection),
                    groups: aggregation.groups,
                }
            };
            DashboardView {
                attribute: selection.attribute,
                value: selection.value.clone(),
                options,
                matching_rows: subset.len(),
                content,
            }
        }
    }
}
