//! Writes synthetic forecast and probability tables, as tab-separated text
//! and as Parquet, for trying the viewer without the published files.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SENTINEL: f64 = -999.0;

/// (region, department, municipality, latitude, longitude)
const PLACES: &[(&str, &str, &str, f64, f64)] = &[
    ("Andina", "Cundinamarca", "Bogota", 4.71, -74.07),
    ("Andina", "Antioquia", "Medellin", 6.24, -75.58),
    ("Andina", "Antioquia", "Rionegro", 6.15, -75.37),
    ("Andina", "Boyaca", "Tunja", 5.53, -73.36),
    ("Andina", "Santander", "Bucaramanga", 7.12, -73.12),
    ("Caribe", "Bolivar", "Cartagena", 10.39, -75.51),
    ("Caribe", "Atlantico", "Barranquilla", 10.96, -74.78),
    ("Caribe", "Magdalena", "Santa Marta", 11.24, -74.20),
    ("Pacifica", "Valle del Cauca", "Cali", 3.45, -76.53),
    ("Pacifica", "Choco", "Quibdo", 5.69, -76.66),
    ("Pacifica", "Narino", "Tumaco", 1.80, -78.76),
    ("Orinoquia", "Meta", "Villavicencio", 4.14, -73.63),
    ("Amazonia", "Amazonas", "Leticia", -4.21, -69.94),
];

/// Stations generated around each place.
const STATIONS_PER_PLACE: usize = 12;

/// Deterministic splitmix64 stream; one seed gives the same files every run.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

struct Station {
    region: &'static str,
    department: &'static str,
    municipality: &'static str,
    latitude: f64,
    longitude: f64,
}

struct ProbabilityRow {
    index: Option<i64>,
    percentage: f64,
    below: f64,
    normal: f64,
    above: f64,
}

fn stations(rng: &mut SampleRng) -> Vec<Station> {
    PLACES
        .iter()
        .flat_map(|&(region, department, municipality, lat, lon)| {
            (0..STATIONS_PER_PLACE)
                .map(|_| (rng.normal(lat, 0.08), rng.normal(lon, 0.08)))
                .collect::<Vec<_>>()
                .into_iter()
                .map(move |(latitude, longitude)| Station {
                    region,
                    department,
                    municipality,
                    latitude,
                    longitude,
                })
        })
        .collect()
}

/// Wetter on the Pacific coast, drier in the Caribbean.
fn base_rain(region: &str) -> f64 {
    match region {
        "Pacifica" => 420.0,
        "Amazonia" => 300.0,
        "Andina" => 180.0,
        "Orinoquia" => 220.0,
        _ => 90.0,
    }
}

fn probability_row(rng: &mut SampleRng, region: &str) -> ProbabilityRow {
    let tilt = match region {
        "Caribe" => [1.6, 1.0, 0.6],
        "Pacifica" => [0.6, 1.0, 1.6],
        _ => [1.0, 1.2, 1.0],
    };
    let raw: Vec<f64> = tilt
        .iter()
        .map(|w| (w * (0.5 + rng.uniform())).max(0.01))
        .collect();
    let total: f64 = raw.iter().sum();
    let bands: Vec<f64> = raw.iter().map(|v| (v / total * 100.0).round()).collect();

    let (dominant, &pct) = bands
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((0, &bands[0]));

    ProbabilityRow {
        index: if rng.chance(0.05) {
            None
        } else {
            Some(dominant as i64 + 1)
        },
        percentage: if rng.chance(0.04) { SENTINEL } else { pct },
        below: bands[0],
        normal: bands[1],
        above: bands[2],
    }
}

fn write_tsv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn location_columns(stations: &[Station]) -> Vec<ArrayRef> {
    vec![
        Arc::new(Float64Array::from_iter_values(stations.iter().map(|s| s.latitude))),
        Arc::new(Float64Array::from_iter_values(stations.iter().map(|s| s.longitude))),
        Arc::new(StringArray::from_iter_values(stations.iter().map(|s| s.region))),
        Arc::new(StringArray::from_iter_values(stations.iter().map(|s| s.department))),
        Arc::new(StringArray::from_iter_values(stations.iter().map(|s| s.municipality))),
    ]
}

fn location_fields() -> Vec<Field> {
    vec![
        Field::new("Latitud", DataType::Float64, false),
        Field::new("Longitud", DataType::Float64, false),
        Field::new("Region_Homogenea", DataType::Utf8, false),
        Field::new("Departamento", DataType::Utf8, false),
        Field::new("Municipio", DataType::Utf8, false),
    ]
}

fn location_cells(s: &Station) -> Vec<String> {
    vec![
        format!("{:.4}", s.latitude),
        format!("{:.4}", s.longitude),
        s.region.to_string(),
        s.department.to_string(),
        s.municipality.to_string(),
    ]
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);
    let stations = stations(&mut rng);

    // ---- Point forecast ----
    let forecast: Vec<f64> = stations
        .iter()
        .map(|s| {
            if rng.chance(0.05) {
                SENTINEL
            } else {
                rng.normal(base_rain(s.region), 40.0).max(0.0).round()
            }
        })
        .collect();

    let header = [
        "Latitud",
        "Longitud",
        "Region_Homogenea",
        "Departamento",
        "Municipio",
        "Pronostico",
    ];
    let rows: Vec<Vec<String>> = stations
        .iter()
        .zip(&forecast)
        .map(|(s, v)| {
            let mut cells = location_cells(s);
            cells.push(v.to_string());
            cells
        })
        .collect();
    write_tsv(Path::new("sample_forecast.tsv"), &header, &rows)?;

    let mut fields = location_fields();
    fields.push(Field::new("Pronostico", DataType::Float64, false));
    let mut columns = location_columns(&stations);
    columns.push(Arc::new(Float64Array::from(forecast)));
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    write_parquet(Path::new("sample_forecast.parquet"), &batch)?;

    // ---- Category probabilities ----
    let probs: Vec<ProbabilityRow> = stations
        .iter()
        .map(|s| probability_row(&mut rng, s.region))
        .collect();

    let header = [
        "Latitud",
        "Longitud",
        "Region_Homogenea",
        "Departamento",
        "Municipio",
        "Indice",
        "Porcentaje",
        "Inferior",
        "Normal",
        "Superior",
    ];
    let rows: Vec<Vec<String>> = stations
        .iter()
        .zip(&probs)
        .map(|(s, p)| {
            let mut cells = location_cells(s);
            cells.push(p.index.map(|i| i.to_string()).unwrap_or_default());
            cells.push(p.percentage.to_string());
            cells.push(p.below.to_string());
            cells.push(p.normal.to_string());
            cells.push(p.above.to_string());
            cells
        })
        .collect();
    write_tsv(Path::new("sample_probabilities.tsv"), &header, &rows)?;

    let mut fields = location_fields();
    fields.extend([
        Field::new("Indice", DataType::Int64, true),
        Field::new("Porcentaje", DataType::Float64, false),
        Field::new("Inferior", DataType::Float64, false),
        Field::new("Normal", DataType::Float64, false),
        Field::new("Superior", DataType::Float64, false),
    ]);
    let mut columns = location_columns(&stations);
    columns.extend([
        Arc::new(Int64Array::from(probs.iter().map(|p| p.index).collect::<Vec<_>>())) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(probs.iter().map(|p| p.percentage))) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(probs.iter().map(|p| p.below))) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(probs.iter().map(|p| p.normal))) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(probs.iter().map(|p| p.above))) as ArrayRef,
    ]);
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    write_parquet(Path::new("sample_probabilities.parquet"), &batch)?;

    println!(
        "Wrote {} stations to sample_forecast.{{tsv,parquet}} and sample_probabilities.{{tsv,parquet}}",
        stations.len()
    );
    Ok(())
}
