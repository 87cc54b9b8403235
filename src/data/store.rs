use std::path::Path;
use std::sync::Arc;

use super::error::DataLoadError;
use super::loader::{load_forecast, load_probability, LoadOptions};
use super::model::{ForecastTable, ProbabilityTable, ValueRange};

/// The two base tables, loaded once and never mutated afterwards.
///
/// Tables sit behind `Arc` so every view (and every session, if the store is
/// shared across threads) reads the same snapshot without locking.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    forecast: Arc<ForecastTable>,
    probability: Arc<ProbabilityTable>,
    /// Range of the whole forecast table, fixed so map colors stay
    /// comparable across filters.
    forecast_range: Option<ValueRange>,
}

impl DatasetStore {
    /// Load both sources. Either failing aborts the whole load.
    pub fn load(
        forecast_path: &Path,
        probability_path: &Path,
        options: &LoadOptions,
    ) -> Result<Self, DataLoadError> {
        let forecast = load_forecast(forecast_path, options)?;
        let probability = load_probability(probability_path, options)?;
        Ok(Self::from_tables(forecast, probability))
    }

    pub fn from_tables(forecast: ForecastTable, probability: ProbabilityTable) -> Self {
        let forecast_range = ValueRange::of(forecast.iter().map(|r| r.forecast));
        DatasetStore {
            forecast: Arc::new(forecast),
            probability: Arc::new(probability),
            forecast_range,
        }
    }

    pub fn forecast(&self) -> &ForecastTable {
        &self.forecast
    }

    pub fn probability(&self) -> &ProbabilityTable {
        &self.probability
    }

    pub fn forecast_range(&self) -> Option<ValueRange> {
        self.forecast_range
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_is_all_or_nothing() {
        let mut forecast = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        forecast
            .write_all(
                b"Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tPronostico\n\
                  4.6\t-74.1\tAndina\tCundinamarca\tBogota\t120\n\
                  3.4\t-76.5\tPacifica\tValle\tCali\t80\n",
            )
            .unwrap();
        let mut probability = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        probability
            .write_all(b"Latitud\tLongitud\tRegion_Homogenea\n4.6\t-74.1\tAndina\n")
            .unwrap();

        let err = DatasetStore::load(forecast.path(), probability.path(), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { .. }));
    }

    #[test]
    fn forecast_range_covers_whole_table() {
        let store = crate::data::test_support::store();
        let range = store.forecast_range().unwrap();
        assert_eq!(range.min, 5.0);
        assert_eq!(range.max, 300.0);
    }
}
