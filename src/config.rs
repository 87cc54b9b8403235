use std::path::PathBuf;

use clap::Parser;

use crate::dashboard::{DashboardState, Tab};
use crate::data::filter::{FilterSelection, FilterValue};
use crate::data::loader::LoadOptions;
use crate::data::model::GroupAttribute;

pub const DEFAULT_FORECAST_FILE: &str =
    "Valores_Pronosticados_Precipitacion_2025-2_Colombia.csv";
pub const DEFAULT_PROBABILITY_FILE: &str =
    "Probabilidades_Pronosticadas_Precipitacion_2025-2_Colombia.csv";

/// Precipitation forecast and probability dashboard.
#[derive(Debug, Parser)]
#[command(name = "precip-panda", version, about)]
pub struct Cli {
    /// Point-forecast table (delimited text or .parquet).
    #[arg(long, env = "PRECIP_FORECAST_FILE", default_value = DEFAULT_FORECAST_FILE)]
    pub forecast: PathBuf,

    /// Category probability table (delimited text or .parquet).
    #[arg(long, env = "PRECIP_PROBABILITY_FILE", default_value = DEFAULT_PROBABILITY_FILE)]
    pub probabilities: PathBuf,

    /// Field delimiter of the text tables: a single character, or "tab".
    #[arg(long, env = "PRECIP_DELIMITER", default_value = "tab", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Write the chart specifications for the selection below as JSON and
    /// exit instead of opening the window.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Initial tab: forecast or probability.
    #[arg(long, default_value = "forecast")]
    pub tab: Tab,

    /// Initial grouping attribute: region, department or municipality.
    #[arg(long, default_value = "region")]
    pub attribute: GroupAttribute,

    /// Initial filter value; omitted or "all" means no restriction.
    #[arg(long)]
    pub value: Option<String>,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
        }
    }

    pub fn initial_state(&self) -> DashboardState {
        let value = match self.value.as_deref() {
            None => FilterValue::All,
            Some(v) if v.eq_ignore_ascii_case(FilterValue::All.label()) => FilterValue::All,
            Some(v) => FilterValue::from(v),
        };
        DashboardState {
            tab: self.tab,
            selection: FilterSelection::new(self.attribute, value),
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("delimiter must be a single ASCII character or 'tab', got '{s}'")),
            }
        }
    }
}
