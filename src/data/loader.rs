use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataLoadError;
use super::model::{
    ForecastRecord, ForecastTable, Location, ProbabilityCategory, ProbabilityRecord,
    ProbabilityTable, MISSING_SENTINEL,
};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

/// A column header as published, plus the English alias accepted in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub alias: &'static str,
}

impl Column {
    const fn new(name: &'static str, alias: &'static str) -> Self {
        Column { name, alias }
    }

    fn matches(&self, header: &str) -> bool {
        header.eq_ignore_ascii_case(self.name) || header.eq_ignore_ascii_case(self.alias)
    }
}

pub const LATITUDE: Column = Column::new("Latitud", "Latitude");
pub const LONGITUDE: Column = Column::new("Longitud", "Longitude");
pub const REGION: Column = Column::new("Region_Homogenea", "Region");
pub const DEPARTMENT: Column = Column::new("Departamento", "Department");
pub const MUNICIPALITY: Column = Column::new("Municipio", "Municipality");
pub const FORECAST: Column = Column::new("Pronostico", "Forecast");
pub const CATEGORY_INDEX: Column = Column::new("Indice", "Index");
pub const PERCENTAGE: Column = Column::new("Porcentaje", "Percentage");
pub const BELOW: Column = Column::new("Inferior", "Below");
pub const NORMAL: Column = Column::new("Normal", "Normal");
pub const ABOVE: Column = Column::new("Superior", "Above");

/// Cell contents read as missing, in addition to the empty string.
const NA_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "-nan", "NULL", "null", "None", "<NA>"];

/// Options controlling how delimited sources are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    /// The published tables are tab-separated.
    fn default() -> Self {
        LoadOptions { delimiter: b'\t' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the point-forecast table, dropping rows whose forecast is missing.
pub fn load_forecast(path: &Path, options: &LoadOptions) -> Result<ForecastTable, DataLoadError> {
    let raw = read_raw(path, options)?;
    forecast_from_raw(&raw)
}

/// Load the probability table, dropping rows whose percentage is missing.
pub fn load_probability(
    path: &Path,
    options: &LoadOptions,
) -> Result<ProbabilityTable, DataLoadError> {
    let raw = read_raw(path, options)?;
    probability_from_raw(&raw)
}

/// Dispatch by extension: `.parquet` / `.pq` are Parquet, anything else is
/// delimited text.
fn read_raw(path: &Path, options: &LoadOptions) -> Result<RawTable, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => read_parquet(path),
        _ => {
            let file = File::open(path).map_err(|source| DataLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_delimited(file, path, options.delimiter)
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – untyped cells, one row per source line
// ---------------------------------------------------------------------------

/// Source table before typing: header names and trimmed text cells,
/// `None` where the cell is missing.
#[derive(Debug)]
pub(crate) struct RawTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    fn column(&self, column: Column) -> Result<usize, DataLoadError> {
        self.headers
            .iter()
            .position(|h| column.matches(h))
            .ok_or_else(|| DataLoadError::MissingColumn {
                path: self.path.clone(),
                column: column.name,
            })
    }

    fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().enumerate().map(move |(i, cells)| RowView {
            path: &self.path,
            // 1-based data row, not counting the header.
            row: i + 1,
            cells,
        })
    }
}

struct RowView<'a> {
    path: &'a Path,
    row: usize,
    cells: &'a [Option<String>],
}

impl RowView<'_> {
    fn text(&self, idx: usize) -> Option<String> {
        self.cells.get(idx).cloned().flatten()
    }

    fn number(&self, idx: usize, column: Column) -> Result<Option<f64>, DataLoadError> {
        let Some(cell) = self.cells.get(idx).and_then(|c| c.as_deref()) else {
            return Ok(None);
        };
        let invalid = || DataLoadError::InvalidNumber {
            path: self.path.to_path_buf(),
            row: self.row,
            column: column.name,
            value: cell.to_string(),
        };
        match cell.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) if v.is_infinite() => Err(invalid()),
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(invalid()),
        }
    }

    fn required_number(&self, idx: usize, column: Column) -> Result<f64, DataLoadError> {
        self.number(idx, column)?
            .ok_or_else(|| DataLoadError::MissingCell {
                path: self.path.to_path_buf(),
                row: self.row,
                column: column.name,
            })
    }

    fn location(&self, cols: &LocationColumns) -> Location {
        Location {
            region: self.text(cols.region),
            department: self.text(cols.department),
            municipality: self.text(cols.municipality),
        }
    }
}

struct LocationColumns {
    region: usize,
    department: usize,
    municipality: usize,
}

impl LocationColumns {
    fn resolve(raw: &RawTable) -> Result<Self, DataLoadError> {
        Ok(LocationColumns {
            region: raw.column(REGION)?,
            department: raw.column(DEPARTMENT)?,
            municipality: raw.column(MUNICIPALITY)?,
        })
    }
}

fn normalize_cell(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || NA_TOKENS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Typed conversion
// ---------------------------------------------------------------------------

pub(crate) fn forecast_from_raw(raw: &RawTable) -> Result<ForecastTable, DataLoadError> {
    let lat = raw.column(LATITUDE)?;
    let lon = raw.column(LONGITUDE)?;
    let loc = LocationColumns::resolve(raw)?;
    let value = raw.column(FORECAST)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = 0usize;

    for row in raw.rows() {
        let forecast = match row.number(value, FORECAST)? {
            Some(v) if v != MISSING_SENTINEL => v,
            _ => {
                dropped += 1;
                continue;
            }
        };
        records.push(ForecastRecord {
            latitude: row.required_number(lat, LATITUDE)?,
            longitude: row.required_number(lon, LONGITUDE)?,
            location: row.location(&loc),
            forecast,
        });
    }

    log::info!(
        "{}: {} forecast rows loaded, {dropped} rows without a forecast dropped",
        raw.path.display(),
        records.len()
    );
    Ok(ForecastTable::from_rows(records))
}

pub(crate) fn probability_from_raw(raw: &RawTable) -> Result<ProbabilityTable, DataLoadError> {
    let lat = raw.column(LATITUDE)?;
    let lon = raw.column(LONGITUDE)?;
    let loc = LocationColumns::resolve(raw)?;
    let index = raw.column(CATEGORY_INDEX)?;
    let percentage = raw.column(PERCENTAGE)?;
    let below = raw.column(BELOW)?;
    let normal = raw.column(NORMAL)?;
    let above = raw.column(ABOVE)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = 0usize;
    let mut unknown_index = 0usize;

    for row in raw.rows() {
        let pct = match row.number(percentage, PERCENTAGE)? {
            Some(v) if v != MISSING_SENTINEL => v,
            _ => {
                dropped += 1;
                continue;
            }
        };

        let category = match row.number(index, CATEGORY_INDEX)? {
            None => None,
            Some(v) => {
                let decoded = if v.fract() == 0.0 {
                    ProbabilityCategory::from_index(v as i64)
                } else {
                    None
                };
                if decoded.is_none() {
                    unknown_index += 1;
                }
                decoded
            }
        };

        records.push(ProbabilityRecord {
            latitude: row.required_number(lat, LATITUDE)?,
            longitude: row.required_number(lon, LONGITUDE)?,
            location: row.location(&loc),
            category,
            percentage: pct,
            below: row.number(below, BELOW)?,
            normal: row.number(normal, NORMAL)?,
            above: row.number(above, ABOVE)?,
        });
    }

    if unknown_index > 0 {
        log::warn!(
            "{}: {unknown_index} rows have a category index outside 1..=3, treated as missing",
            raw.path.display()
        );
    }
    log::info!(
        "{}: {} probability rows loaded, {dropped} rows without a percentage dropped",
        raw.path.display(),
        records.len()
    );
    Ok(ProbabilityTable::from_rows(records))
}

// ---------------------------------------------------------------------------
// Delimited text reader
// ---------------------------------------------------------------------------

/// Read a header row plus records. `path` only labels errors.
pub(crate) fn read_delimited<R: Read>(
    reader: R,
    path: &Path,
    delimiter: u8,
) -> Result<RawTable, DataLoadError> {
    let csv_err = |source| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    // Short rows are kept; their trailing cells read as missing.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        // Spreadsheet exports often start with a UTF-8 BOM.
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Read every column that Arrow can render as text. Columns that cannot be
/// cast (lists, structs) are skipped; a required one then surfaces as a
/// missing column.
fn read_parquet(path: &Path) -> Result<RawTable, DataLoadError> {
    let arrow_err = |source| DataLoadError::Arrow {
        path: path.to_path_buf(),
        source,
    };
    let parquet_err = |source| DataLoadError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;

    let mut text_columns = Vec::new();
    let mut headers = Vec::new();
    for (i, field) in builder.schema().fields().iter().enumerate() {
        if can_cast_types(field.data_type(), &DataType::Utf8) {
            text_columns.push(i);
            headers.push(field.name().trim().to_string());
        } else {
            log::debug!(
                "{}: skipping column '{}' of type {:?}",
                path.display(),
                field.name(),
                field.data_type()
            );
        }
    }

    let reader = builder.build().map_err(parquet_err)?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(arrow_err)?;
        let columns: Vec<ArrayRef> = text_columns
            .iter()
            .map(|&i| cast(batch.column(i), &DataType::Utf8))
            .collect::<Result<_, _>>()
            .map_err(arrow_err)?;

        for row in 0..batch.num_rows() {
            rows.push(
                columns
                    .iter()
                    .map(|col| {
                        if col.is_null(row) {
                            None
                        } else {
                            normalize_cell(col.as_string::<i32>().value(row))
                        }
                    })
                    .collect(),
            );
        }
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::GroupAttribute;

    const FORECAST_TSV: &str = "\
Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tPronostico
4.6\t-74.1\tAndina\tCundinamarca\tBogota\t120.5
6.2\t-75.6\tAndina\tAntioquia\tMedellin\t-999
3.4\t-76.5\tPacifica\tValle\tCali\t
10.4\t-75.5\t\tBolivar\tCartagena\t40
";

    const PROBABILITY_TSV: &str = "\
Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tIndice\tPorcentaje\tInferior\tNormal\tSuperior
4.6\t-74.1\tAndina\tCundinamarca\tBogota\t3\t55\t10\t35\t55
6.2\t-75.6\tAndina\tAntioquia\tMedellin\t2\t-999\t20\t50\t30
3.4\t-76.5\tPacifica\tValle\tCali\t\t40\t40\t30\t30
10.4\t-75.5\tCaribe\tBolivar\tCartagena\t7\t45\t45\t35\t
";

    fn raw(text: &str) -> RawTable {
        read_delimited(text.as_bytes(), Path::new("test.tsv"), b'\t').unwrap()
    }

    #[test]
    fn forecast_sentinel_and_empty_values_are_dropped() {
        let table = forecast_from_raw(&raw(FORECAST_TSV)).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.forecast != MISSING_SENTINEL));
        assert_eq!(table.rows()[0].location.municipality.as_deref(), Some("Bogota"));
        assert_eq!(table.rows()[1].location.get(GroupAttribute::Region), None);
        assert_eq!(table.rows()[1].forecast, 40.0);
    }

    #[test]
    fn probability_rows_decode_categories_and_bands() {
        let table = probability_from_raw(&raw(PROBABILITY_TSV)).unwrap();
        assert_eq!(table.len(), 3);

        let rows = table.rows();
        assert_eq!(rows[0].category, Some(ProbabilityCategory::Above));
        assert_eq!(rows[0].below, Some(10.0));
        // Empty index cell.
        assert_eq!(rows[1].category, None);
        // Index 7 is not a known category.
        assert_eq!(rows[2].category, None);
        assert_eq!(rows[2].above, None);
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let text = "Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\n1\t2\ta\tb\tc\n";
        let err = forecast_from_raw(&raw(text)).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingColumn { column: "Pronostico", .. }
        ));
    }

    #[test]
    fn non_numeric_value_is_a_load_error() {
        let text = "\
Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tPronostico
north\t-74.1\tAndina\tCundinamarca\tBogota\t12
";
        let err = forecast_from_raw(&raw(text)).unwrap_err();
        match err {
            DataLoadError::InvalidNumber { row, column, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Latitud");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn infinite_value_is_a_load_error() {
        let text = "\
Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tPronostico
4.6\t-74.1\tAndina\tCundinamarca\tBogota\t12
6.2\t-75.6\tAndina\tAntioquia\tMedellin\tinf
";
        let err = forecast_from_raw(&raw(text)).unwrap_err();
        match err {
            DataLoadError::InvalidNumber { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Pronostico");
                assert_eq!(value, "inf");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_rows_read_trailing_cells_as_missing() {
        let text = "\
Latitud\tLongitud\tRegion_Homogenea\tDepartamento\tMunicipio\tPronostico
4.6\t-74.1\tAndina\tCundinamarca\tBogota\t12
6.2\t-75.6\tAndina\tAntioquia
3.4\t-76.5\tPacifica
";
        let table = forecast_from_raw(&raw(text)).unwrap();
        // Both short rows lack a forecast and are dropped like the sentinel.
        assert_eq!(table.len(), 1);

        let text = "\
Latitud\tLongitud\tIndice\tPorcentaje\tInferior\tNormal\tSuperior\tRegion_Homogenea\tDepartamento\tMunicipio
4.6\t-74.1\t3\t55\t10\t35\t55\tAndina
";
        let table = probability_from_raw(&raw(text)).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.location.region.as_deref(), Some("Andina"));
        assert_eq!(row.location.department, None);
        assert_eq!(row.location.municipality, None);
    }

    #[test]
    fn english_headers_and_custom_delimiter_are_accepted() {
        let text = "\
Latitude,Longitude,Region,Department,Municipality,Forecast
4.6,-74.1,Andina,Cundinamarca,Bogota,12
";
        let raw = read_delimited(text.as_bytes(), Path::new("test.csv"), b',').unwrap();
        let table = forecast_from_raw(&raw).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].forecast, 12.0);
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let err = load_forecast(Path::new("/nonexistent/forecast.tsv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn loads_delimited_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(FORECAST_TSV.as_bytes()).unwrap();

        let table = load_forecast(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn loads_parquet_with_numeric_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Latitud", DataType::Float64, false),
            Field::new("Longitud", DataType::Float64, false),
            Field::new("Region_Homogenea", DataType::Utf8, true),
            Field::new("Departamento", DataType::Utf8, true),
            Field::new("Municipio", DataType::Utf8, true),
            Field::new("Indice", DataType::Int64, true),
            Field::new("Porcentaje", DataType::Float64, false),
            Field::new("Inferior", DataType::Float64, true),
            Field::new("Normal", DataType::Float64, true),
            Field::new("Superior", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![4.6, 6.2])),
                Arc::new(Float64Array::from(vec![-74.1, -75.6])),
                Arc::new(StringArray::from(vec![Some("Andina"), None])),
                Arc::new(StringArray::from(vec!["Cundinamarca", "Antioquia"])),
                Arc::new(StringArray::from(vec!["Bogota", "Medellin"])),
                Arc::new(Int64Array::from(vec![Some(1), None])),
                Arc::new(Float64Array::from(vec![60.0, -999.0])),
                Arc::new(Float64Array::from(vec![60.0, 20.0])),
                Arc::new(Float64Array::from(vec![25.0, 50.0])),
                Arc::new(Float64Array::from(vec![15.0, 30.0])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_probability(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.category, Some(ProbabilityCategory::Below));
        assert_eq!(row.location.region.as_deref(), Some("Andina"));
        assert_eq!(row.percentage, 60.0);
        assert_eq!(row.above, Some(15.0));
    }
}
