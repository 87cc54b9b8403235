use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{GeoRecord, GroupAttribute, ProbabilityCategory, ProbabilityRecord, Table};

/// Mean category probabilities of one group, rescaled so that
/// `below + normal + above == 100`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedGroup {
    pub key: String,
    pub below: f64,
    pub normal: f64,
    pub above: f64,
}

impl AggregatedGroup {
    pub fn percent(&self, category: ProbabilityCategory) -> f64 {
        match category {
            ProbabilityCategory::Below => self.below,
            ProbabilityCategory::Normal => self.normal,
            ProbabilityCategory::Above => self.above,
        }
    }

    pub fn total(&self) -> f64 {
        self.below + self.normal + self.above
    }
}

/// Why a group could not be rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegenerateReason {
    /// The three category means sum to zero.
    ZeroTotal,
    /// The means overflow to an infinite total.
    NonFiniteTotal,
    /// A category mean is below zero, which no probability can be.
    NegativeMean(ProbabilityCategory),
    /// No row of the group carries a value for this category.
    NoObservations(ProbabilityCategory),
}

/// A group excluded from the result instead of being emitted as NaN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegenerateGroup {
    pub key: String,
    pub reason: DegenerateReason,
}

/// Output of [`aggregate`]: rescaled groups plus the ones that were left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub groups: Vec<AggregatedGroup>,
    pub degenerate: Vec<DegenerateGroup>,
}

#[derive(Default)]
struct Accumulator {
    sums: [f64; 3],
    counts: [usize; 3],
}

impl Accumulator {
    fn push(&mut self, record: &ProbabilityRecord) {
        for (i, cat) in ProbabilityCategory::ALL.iter().enumerate() {
            if let Some(v) = record.band(*cat).filter(|v| v.is_finite()) {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    fn finish(self, key: String) -> Result<AggregatedGroup, DegenerateGroup> {
        let mut means = [0.0; 3];
        for (i, cat) in ProbabilityCategory::ALL.iter().enumerate() {
            if self.counts[i] == 0 {
                return Err(DegenerateGroup {
                    key,
                    reason: DegenerateReason::NoObservations(*cat),
                });
            }
            means[i] = self.sums[i] / self.counts[i] as f64;
            if means[i] < 0.0 {
                return Err(DegenerateGroup {
                    key,
                    reason: DegenerateReason::NegativeMean(*cat),
                });
            }
        }

        let total: f64 = means.iter().sum();
        let reason = if !total.is_finite() {
            Some(DegenerateReason::NonFiniteTotal)
        } else if total == 0.0 {
            Some(DegenerateReason::ZeroTotal)
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(DegenerateGroup { key, reason });
        }

        let group = AggregatedGroup {
            key,
            below: means[0] / total * 100.0,
            normal: means[1] / total * 100.0,
            above: means[2] / total * 100.0,
        };
        debug_assert!((group.total() - 100.0).abs() < 1e-6, "{group:?}");
        Ok(group)
    }
}

/// Group `subset` by `attribute`, average the three categories per group and
/// rescale each group's means to sum to 100.
///
/// Rows without a value for `attribute` are not grouped. Groups come out in
/// ascending key order. Degenerate groups (a category with no observations or
/// a negative mean, a zero or infinite total) are moved to
/// [`Aggregation::degenerate`].
pub fn aggregate(subset: &Table<ProbabilityRecord>, attribute: GroupAttribute) -> Aggregation {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in subset {
        if let Some(key) = record.attribute(attribute) {
            groups.entry(key).or_default().push(record);
        }
    }

    let mut out = Aggregation::default();
    for (key, acc) in groups {
        match acc.finish(key.to_string()) {
            Ok(group) => out.groups.push(group),
            Err(degenerate) => {
                log::warn!(
                    "{attribute} '{}' excluded from category distribution: {:?}",
                    degenerate.key,
                    degenerate.reason
                );
                out.degenerate.push(degenerate);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::test_support::{probability, probability_table};

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn single_row_is_rescaled_to_percentages() {
        let table = Table::from_rows(vec![probability(
            Some("R"),
            "A",
            "M",
            Some(1),
            10.0,
            10.0,
            10.0,
            20.0,
        )]);
        let agg = aggregate(&table, GroupAttribute::Department);

        assert_eq!(agg.groups.len(), 1);
        let g = &agg.groups[0];
        assert_eq!(g.key, "A");
        assert!((g.below - 25.0).abs() < TOLERANCE);
        assert!((g.normal - 25.0).abs() < TOLERANCE);
        assert!((g.above - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn every_group_sums_to_one_hundred() {
        let table = probability_table();
        for attribute in GroupAttribute::ALL {
            let agg = aggregate(&table, attribute);
            assert!(!agg.groups.is_empty());
            for g in &agg.groups {
                assert!((g.total() - 100.0).abs() < TOLERANCE, "{g:?}");
            }
        }
    }

    #[test]
    fn means_are_taken_before_rescaling() {
        let table = probability_table();
        let agg = aggregate(&table, GroupAttribute::Department);
        let antioquia = agg.groups.iter().find(|g| g.key == "Antioquia").unwrap();
        // Means 27.5 / 42.5 / 30 over a total of 100.
        assert!((antioquia.below - 27.5).abs() < TOLERANCE);
        assert!((antioquia.normal - 42.5).abs() < TOLERANCE);
        assert!((antioquia.above - 30.0).abs() < TOLERANCE);
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let agg = aggregate(&probability_table(), GroupAttribute::Municipality);
        let keys: Vec<&str> = agg.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["Bello", "Bogota", "Cali", "Medellin"]);
    }

    #[test]
    fn zero_total_group_is_reported_not_emitted() {
        let agg = aggregate(&probability_table(), GroupAttribute::Region);
        assert!(agg.groups.iter().all(|g| g.key != "Caribe"));
        assert_eq!(
            agg.degenerate,
            vec![DegenerateGroup {
                key: "Caribe".to_string(),
                reason: DegenerateReason::ZeroTotal,
            }]
        );
        assert!(agg
            .groups
            .iter()
            .all(|g| g.below.is_finite() && g.normal.is_finite() && g.above.is_finite()));
    }

    #[test]
    fn negative_mean_is_reported_not_emitted() {
        let table = Table::from_rows(vec![
            probability(Some("R"), "B", "M1", None, 50.0, -5.0, 10.0, 0.0),
            probability(Some("R"), "B", "M2", None, 50.0, -5.0, 10.0, 0.0),
            probability(Some("R"), "C", "M3", None, 50.0, 20.0, 30.0, 50.0),
        ]);
        let agg = aggregate(&table, GroupAttribute::Department);
        assert_eq!(agg.groups.len(), 1);
        assert_eq!(agg.groups[0].key, "C");
        assert_eq!(
            agg.degenerate,
            vec![DegenerateGroup {
                key: "B".to_string(),
                reason: DegenerateReason::NegativeMean(ProbabilityCategory::Below),
            }]
        );
    }

    #[test]
    fn overflowing_bands_are_a_non_finite_total() {
        let table = Table::from_rows(vec![
            probability(Some("R"), "A", "M1", None, 50.0, 1e308, 1e308, 1.0),
            probability(Some("R"), "A", "M2", None, 50.0, 1e308, 1e308, 1.0),
        ]);
        let agg = aggregate(&table, GroupAttribute::Department);
        assert!(agg.groups.is_empty());
        assert_eq!(agg.degenerate[0].reason, DegenerateReason::NonFiniteTotal);
    }

    #[test]
    fn category_without_observations_is_degenerate() {
        let mut record = probability(Some("R"), "A", "M", None, 50.0, 30.0, 30.0, 40.0);
        record.normal = None;
        let agg = aggregate(&Table::from_rows(vec![record]), GroupAttribute::Region);
        assert!(agg.groups.is_empty());
        assert_eq!(
            agg.degenerate[0].reason,
            DegenerateReason::NoObservations(ProbabilityCategory::Normal)
        );
    }

    #[test]
    fn missing_band_values_are_skipped_in_the_mean() {
        let mut sparse = probability(Some("R"), "A", "M1", None, 50.0, 0.0, 0.0, 0.0);
        sparse.below = None;
        let full = probability(Some("R"), "A", "M2", None, 50.0, 20.0, 40.0, 40.0);
        let agg = aggregate(&Table::from_rows(vec![sparse, full]), GroupAttribute::Department);
        // below mean = 20 (one observation), normal = 20, above = 20.
        let g = &agg.groups[0];
        assert!((g.below - 100.0 / 3.0).abs() < TOLERANCE);
        assert!((g.total() - 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn empty_subset_yields_empty_aggregation() {
        let table = probability_table();
        let subset = apply(
            &table,
            &FilterSelection::new(GroupAttribute::Municipality, "Unknown".into()),
        );
        let agg = aggregate(&subset, GroupAttribute::Municipality);
        assert!(agg.groups.is_empty());
        assert!(agg.degenerate.is_empty());
    }
}
