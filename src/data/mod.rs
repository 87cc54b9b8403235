//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  forecast.tsv / probabilities.tsv (.parquet)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → typed table, drop -999 rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ DatasetStore  │  Arc<ForecastTable>, Arc<ProbabilityTable>
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐     ┌──────────┐
//!   │ catalog   │     │  filter   │  attribute options / matching subset
//!   └──────────┘     └──────────┘
//!                          │
//!                          ▼
//!                    ┌───────────┐
//!                    │ aggregate  │  per-group category means → 100 %
//!                    └───────────┘
//! ```

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support {
    use super::model::*;
    use super::store::DatasetStore;

    fn location(region: Option<&str>, department: &str, municipality: &str) -> Location {
        Location {
            region: region.map(str::to_string),
            department: Some(department.to_string()),
            municipality: Some(municipality.to_string()),
        }
    }

    pub fn forecast(
        region: Option<&str>,
        department: &str,
        municipality: &str,
        value: f64,
    ) -> ForecastRecord {
        ForecastRecord {
            latitude: 4.0,
            longitude: -74.0,
            location: location(region, department, municipality),
            forecast: value,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn probability(
        region: Option<&str>,
        department: &str,
        municipality: &str,
        index: Option<i64>,
        percentage: f64,
        below: f64,
        normal: f64,
        above: f64,
    ) -> ProbabilityRecord {
        ProbabilityRecord {
            latitude: 4.0,
            longitude: -74.0,
            location: location(region, department, municipality),
            category: index.and_then(ProbabilityCategory::from_index),
            percentage,
            below: Some(below),
            normal: Some(normal),
            above: Some(above),
        }
    }

    pub fn forecast_table() -> ForecastTable {
        Table::from_rows(vec![
            forecast(Some("Andina"), "Cundinamarca", "Bogota", 120.0),
            forecast(Some("Andina"), "Antioquia", "Medellin", 300.0),
            forecast(Some("Andina"), "Antioquia", "Bello", 5.0),
            forecast(Some("Pacifica"), "Valle", "Cali", 80.0),
            forecast(Some("Caribe"), "Bolivar", "Cartagena", 40.0),
            forecast(None, "Atlantico", "Barranquilla", 60.0),
        ])
    }

    pub fn probability_table() -> ProbabilityTable {
        Table::from_rows(vec![
            probability(Some("Andina"), "Cundinamarca", "Bogota", Some(3), 50.0, 20.0, 30.0, 50.0),
            probability(Some("Andina"), "Antioquia", "Medellin", Some(2), 45.0, 25.0, 45.0, 30.0),
            probability(Some("Andina"), "Antioquia", "Bello", None, 40.0, 30.0, 40.0, 30.0),
            probability(Some("Pacifica"), "Valle", "Cali", Some(1), 60.0, 60.0, 25.0, 15.0),
            probability(Some("Caribe"), "Bolivar", "Cartagena", None, 35.0, 0.0, 0.0, 0.0),
        ])
    }

    pub fn store() -> DatasetStore {
        DatasetStore::from_tables(forecast_table(), probability_table())
    }
}
