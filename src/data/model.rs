use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder used by the published tables for a missing measurement.
pub const MISSING_SENTINEL: f64 = -999.0;

// ---------------------------------------------------------------------------
// GroupAttribute – the hierarchical dimension used to filter and group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupAttribute {
    #[default]
    Region,
    Department,
    Municipality,
}

impl GroupAttribute {
    /// All attributes in selector order.
    pub const ALL: [GroupAttribute; 3] = [
        GroupAttribute::Region,
        GroupAttribute::Department,
        GroupAttribute::Municipality,
    ];

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            GroupAttribute::Region => "Region",
            GroupAttribute::Department => "Department",
            GroupAttribute::Municipality => "Municipality",
        }
    }
}

impl fmt::Display for GroupAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GroupAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "region" | "region_homogenea" => Ok(GroupAttribute::Region),
            "department" | "departamento" => Ok(GroupAttribute::Department),
            "municipality" | "municipio" => Ok(GroupAttribute::Municipality),
            other => Err(format!(
                "unknown attribute '{other}' (expected region, department or municipality)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ProbabilityCategory – the three precipitation bands
// ---------------------------------------------------------------------------

/// Below / Normal / Above. The numeric index (1, 2, 3) is the encoding used
/// by the `Indice` column of the probability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProbabilityCategory {
    Below,
    Normal,
    Above,
}

impl ProbabilityCategory {
    pub const ALL: [ProbabilityCategory; 3] = [
        ProbabilityCategory::Below,
        ProbabilityCategory::Normal,
        ProbabilityCategory::Above,
    ];

    /// Decode the table's integer index. Anything outside 1..=3 is `None`.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(ProbabilityCategory::Below),
            2 => Some(ProbabilityCategory::Normal),
            3 => Some(ProbabilityCategory::Above),
            _ => None,
        }
    }

    pub fn index(&self) -> i64 {
        match self {
            ProbabilityCategory::Below => 1,
            ProbabilityCategory::Normal => 2,
            ProbabilityCategory::Above => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProbabilityCategory::Below => "Below",
            ProbabilityCategory::Normal => "Normal",
            ProbabilityCategory::Above => "Above",
        }
    }
}

impl fmt::Display for ProbabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Records – one row of either source table
// ---------------------------------------------------------------------------

/// Administrative placement of a record. Any level may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub region: Option<String>,
    pub department: Option<String>,
    pub municipality: Option<String>,
}

impl Location {
    /// Value of the given attribute, `None` when the cell was empty.
    pub fn get(&self, attribute: GroupAttribute) -> Option<&str> {
        match attribute {
            GroupAttribute::Region => self.region.as_deref(),
            GroupAttribute::Department => self.department.as_deref(),
            GroupAttribute::Municipality => self.municipality.as_deref(),
        }
    }
}

/// Shared access to the geolocated part of a record.
pub trait GeoRecord {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
    fn location(&self) -> &Location;

    fn attribute(&self, attribute: GroupAttribute) -> Option<&str> {
        self.location().get(attribute)
    }
}

/// One row of the point-forecast table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub location: Location,
    /// Forecast precipitation in mm. Never the missing sentinel.
    pub forecast: f64,
}

/// One row of the categorical probability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub location: Location,
    /// Dominant category of the cell, when the index is present and valid.
    pub category: Option<ProbabilityCategory>,
    /// Probability of the dominant category. Never the missing sentinel.
    pub percentage: f64,
    pub below: Option<f64>,
    pub normal: Option<f64>,
    pub above: Option<f64>,
}

impl ProbabilityRecord {
    /// Raw probability of one band, if present in the source row.
    pub fn band(&self, category: ProbabilityCategory) -> Option<f64> {
        match category {
            ProbabilityCategory::Below => self.below,
            ProbabilityCategory::Normal => self.normal,
            ProbabilityCategory::Above => self.above,
        }
    }
}

impl GeoRecord for ForecastRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
    fn location(&self) -> &Location {
        &self.location
    }
}

impl GeoRecord for ProbabilityRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
    fn location(&self) -> &Location {
        &self.location
    }
}

// ---------------------------------------------------------------------------
// Table – an ordered, immutable collection of records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    rows: Vec<R>,
}

pub type ForecastTable = Table<ForecastRecord>;
pub type ProbabilityTable = Table<ProbabilityRecord>;

impl<R> Table<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        Table { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Table { rows: Vec::new() }
    }
}

impl<R> FromIterator<R> for Table<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Table {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Closed numeric interval, used for color and axis ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range of the finite values in `values`, `None` if there are none.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(ValueRange { min: v, max: v }),
                Some(r) => Some(ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the range, clamped to [0, 1].
    /// A zero-width range maps everything to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_parses_english_and_source_names() {
        assert_eq!("Region".parse::<GroupAttribute>(), Ok(GroupAttribute::Region));
        assert_eq!(
            "Departamento".parse::<GroupAttribute>(),
            Ok(GroupAttribute::Department)
        );
        assert_eq!(
            "municipio".parse::<GroupAttribute>(),
            Ok(GroupAttribute::Municipality)
        );
        assert!("country".parse::<GroupAttribute>().is_err());
    }

    #[test]
    fn category_index_round_trip() {
        for cat in ProbabilityCategory::ALL {
            assert_eq!(ProbabilityCategory::from_index(cat.index()), Some(cat));
        }
        assert_eq!(ProbabilityCategory::from_index(0), None);
        assert_eq!(ProbabilityCategory::from_index(4), None);
    }

    #[test]
    fn value_range_skips_non_finite() {
        let r = ValueRange::of([3.0, f64::NAN, -1.0, 7.5]).unwrap();
        assert_eq!(r, ValueRange { min: -1.0, max: 7.5 });
        assert!(ValueRange::of(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn value_range_normalize_clamps_and_handles_flat_range() {
        let r = ValueRange { min: 0.0, max: 10.0 };
        assert_eq!(r.normalize(5.0), 0.5);
        assert_eq!(r.normalize(-3.0), 0.0);
        assert_eq!(r.normalize(30.0), 1.0);
        let flat = ValueRange { min: 4.0, max: 4.0 };
        assert_eq!(flat.normalize(4.0), 0.5);
    }
}
