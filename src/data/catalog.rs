use std::collections::BTreeSet;

use super::filter::FilterValue;
use super::model::{GeoRecord, GroupAttribute, Table};

/// Selectable values for `attribute`: the `All` option followed by the
/// distinct non-missing values, sorted by label.
///
/// Recompute whenever the attribute changes; each level of the hierarchy has
/// its own universe of values.
pub fn filter_options<R: GeoRecord>(table: &Table<R>, attribute: GroupAttribute) -> Vec<FilterValue> {
    let distinct: BTreeSet<&str> = table.iter().filter_map(|r| r.attribute(attribute)).collect();

    std::iter::once(FilterValue::All)
        .chain(distinct.into_iter().map(FilterValue::from))
        .collect()
}
