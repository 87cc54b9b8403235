use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{GeoRecord, GroupAttribute, Table};

// ---------------------------------------------------------------------------
// Filter predicate: one attribute, one selected value (or everything)
// ---------------------------------------------------------------------------

/// A selectable filter value. `All` is the synthetic "no restriction" option.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterValue {
    #[default]
    All,
    Only(String),
}

impl FilterValue {
    /// Label shown in selectors and chart titles.
    pub fn label(&self) -> &str {
        match self {
            FilterValue::All => "All",
            FilterValue::Only(v) => v,
        }
    }

    /// Whether a record whose attribute holds `value` passes.
    /// A missing attribute only passes the `All` option.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Only(s.to_string())
    }
}

/// The current attribute/value pair. Built fresh from UI state on every
/// interaction; nothing is accumulated between selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub attribute: GroupAttribute,
    pub value: FilterValue,
}

impl FilterSelection {
    pub fn new(attribute: GroupAttribute, value: FilterValue) -> Self {
        FilterSelection { attribute, value }
    }

    pub fn all(attribute: GroupAttribute) -> Self {
        FilterSelection {
            attribute,
            value: FilterValue::All,
        }
    }
}

/// Return the records passing `selection`, in source order.
///
/// `All` yields a copy of the whole table; a value absent from the table
/// yields an empty table. The source is never touched.
pub fn apply<R: GeoRecord + Clone>(table: &Table<R>, selection: &FilterSelection) -> Table<R> {
    match &selection.value {
        FilterValue::All => table.clone(),
        value => table
            .iter()
            .filter(|r| value.matches(r.attribute(selection.attribute)))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{forecast_table, probability_table};

    #[test]
    fn all_returns_the_full_table_row_for_row() {
        let table = forecast_table();
        for attribute in GroupAttribute::ALL {
            let subset = apply(&table, &FilterSelection::all(attribute));
            assert_eq!(subset, table);
        }
    }

    #[test]
    fn value_keeps_matching_rows_in_order() {
        let table = forecast_table();
        let selection = FilterSelection::new(GroupAttribute::Department, "Antioquia".into());
        let subset = apply(&table, &selection);

        let names: Vec<_> = subset
            .iter()
            .map(|r| r.location.municipality.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["Medellin", "Bello"]);
    }

    #[test]
    fn unknown_value_yields_empty_subset() {
        let table = forecast_table();
        let selection = FilterSelection::new(GroupAttribute::Municipality, "Unknown".into());
        assert!(apply(&table, &selection).is_empty());
    }

    #[test]
    fn missing_attribute_never_matches_a_value() {
        let table = forecast_table();
        let selection = FilterSelection::new(GroupAttribute::Region, "Andina".into());
        let subset = apply(&table, &selection);
        assert_eq!(subset.len(), 3);
        assert!(subset.iter().all(|r| r.location.region.is_some()));
    }

    #[test]
    fn source_table_is_untouched() {
        let table = probability_table();
        let before = table.clone();
        let selection = FilterSelection::new(GroupAttribute::Region, "Pacifica".into());
        let subset = apply(&table, &selection);
        assert_eq!(subset.len(), 1);
        assert_eq!(table, before);
    }
}
