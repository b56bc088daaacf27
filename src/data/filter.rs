use std::collections::{BTreeMap, BTreeSet};

use super::model::{Category, StudentRecord, StudentTable};

// ---------------------------------------------------------------------------
// Filter inputs: what the user picked in the side panel
// ---------------------------------------------------------------------------

/// Everything the user can change. A category that is absent from
/// `selections`, or maps to an empty set, is not filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub selections: BTreeMap<Category, BTreeSet<String>>,
    pub group_only: bool,
    /// Inclusive age range; `None` means the full current bounds.
    pub age_range: Option<(i64, i64)>,
    /// Inclusive height range in cm; `None` means the full current bounds.
    pub height_range: Option<(i64, i64)>,
}

impl FilterState {
    /// Toggle a single value in a category's selection.
    pub fn toggle(&mut self, category: Category, value: &str) {
        let selected = self.selections.entry(category).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn clear(&mut self, category: Category) {
        self.selections.remove(&category);
    }

    pub fn is_selected(&self, category: Category, value: &str) -> bool {
        self.selections
            .get(&category)
            .is_some_and(|s| s.contains(value))
    }

    pub fn selected_count(&self, category: Category) -> usize {
        self.selections.get(&category).map_or(0, BTreeSet::len)
    }
}

/// Indices of records passing the categorical selections and the group toggle.
pub fn categorical_indices(table: &StudentTable, filters: &FilterState) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| passes_categorical(rec, filters))
        .map(|(i, _)| i)
        .collect()
}

fn passes_categorical(rec: &StudentRecord, filters: &FilterState) -> bool {
    if filters.group_only && !rec.is_group_member {
        return false;
    }
    filters
        .selections
        .iter()
        .all(|(category, selected)| selected.is_empty() || selected.contains(category.value(rec)))
}

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// Bounds offered to the user for a numeric range filter.
///
/// `min`/`max` are whole numbers wide enough to hold every value. When all
/// values are equal, `single` carries that value and no slider is offered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeControl {
    pub min: i64,
    pub max: i64,
    /// `false` when the subset had no usable values and `[0, 1]` was substituted.
    pub valid: bool,
    pub single: Option<f64>,
}

impl RangeControl {
    const FALLBACK: RangeControl = RangeControl {
        min: 0,
        max: 1,
        valid: false,
        single: None,
    };

    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        values
            .filter(|v| v.is_finite())
            .map(snap)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .map(|(lo, hi)| RangeControl {
                min: lo.floor() as i64,
                max: hi.ceil() as i64,
                valid: true,
                single: (lo == hi).then_some(lo),
            })
            .unwrap_or(Self::FALLBACK)
    }

    /// A single value: no slider, just report it.
    pub fn is_fixed(&self) -> bool {
        self.single.is_some()
    }

    /// The range actually applied: the user's choice clamped into the bounds,
    /// or the full bounds when nothing was chosen. A fixed control always
    /// applies its full bounds.
    pub fn resolve(&self, selected: Option<(i64, i64)>) -> (i64, i64) {
        if self.is_fixed() {
            return (self.min, self.max);
        }
        match selected {
            Some((lo, hi)) => {
                let lo = lo.clamp(self.min, self.max);
                let hi = hi.clamp(lo, self.max);
                (lo, hi)
            }
            None => (self.min, self.max),
        }
    }
}

/// 1.1 m * 100 is 110.00000000000001; bounds and comparisons both use this.
fn snap(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Age bounds over the non-null ages of `indices`.
pub fn age_bounds(table: &StudentTable, indices: &[usize]) -> RangeControl {
    RangeControl::from_values(
        indices
            .iter()
            .filter_map(|&i| table.records[i].age)
            .map(|a| a as f64),
    )
}

/// Height bounds in whole cm: `floor(min)` to `ceil(max)`, so the default
/// range keeps every row.
pub fn height_bounds(table: &StudentTable, indices: &[usize]) -> RangeControl {
    RangeControl::from_values(indices.iter().map(|&i| table.records[i].height_cm))
}

/// Keep the rows whose age and height fall inside the inclusive ranges.
/// A null age never passes.
pub fn apply_ranges(
    table: &StudentTable,
    indices: &[usize],
    age: (i64, i64),
    height: (i64, i64),
) -> Vec<usize> {
    let (h_lo, h_hi) = (height.0 as f64, height.1 as f64);
    indices
        .iter()
        .copied()
        .filter(|&i| {
            let rec = &table.records[i];
            let age_ok = rec.age.is_some_and(|a| age.0 <= a && a <= age.1);
            let height = snap(rec.height_cm);
            let height_ok = h_lo <= height && height <= h_hi;
            age_ok && height_ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{record, table};

    fn sample() -> StudentTable {
        table(vec![
            record("A", "O+", "Negro", "Centro", Some(20), 1.70, 60.0),
            record("202310254018", "A+", "Rubio", "Norte", Some(22), 1.80, 80.0),
            record("C", "O+", "Rubio", "Sur", None, 1.60, 50.0),
            record("202410029018", "B-", "Negro", "Centro", Some(25), 1.655, 70.0),
        ])
    }

    #[test]
    fn empty_selection_is_pass_through() {
        let t = sample();
        let mut filters = FilterState::default();
        filters.selections.insert(Category::BloodType, BTreeSet::new());
        assert_eq!(categorical_indices(&t, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn selections_intersect_across_categories() {
        let t = sample();
        let mut filters = FilterState::default();
        filters.toggle(Category::BloodType, "O+");
        filters.toggle(Category::BloodType, "A+");
        filters.toggle(Category::HairColor, "Rubio");
        assert_eq!(categorical_indices(&t, &filters), vec![1, 2]);
    }

    #[test]
    fn toggle_twice_clears_value() {
        let mut filters = FilterState::default();
        filters.toggle(Category::Neighborhood, "Sur");
        assert!(filters.is_selected(Category::Neighborhood, "Sur"));
        filters.toggle(Category::Neighborhood, "Sur");
        assert_eq!(filters.selected_count(Category::Neighborhood), 0);
    }

    #[test]
    fn group_only_keeps_members() {
        let t = sample();
        let filters = FilterState {
            group_only: true,
            ..Default::default()
        };
        assert_eq!(categorical_indices(&t, &filters), vec![1, 3]);
    }

    #[test]
    fn unknown_values_yield_empty_subset() {
        let t = sample();
        let mut filters = FilterState::default();
        filters.toggle(Category::BloodType, "AB-");
        filters.toggle(Category::HairColor, "Verde");
        filters.toggle(Category::Neighborhood, "Marte");
        assert!(categorical_indices(&t, &filters).is_empty());
    }

    #[test]
    fn bounds_skip_null_ages() {
        let t = sample();
        let all = [0, 1, 2, 3];
        assert_eq!(
            age_bounds(&t, &all),
            RangeControl {
                min: 20,
                max: 25,
                valid: true,
                single: None,
            }
        );
        let h = height_bounds(&t, &all);
        assert_eq!((h.min, h.max), (160, 180));
    }

    #[test]
    fn height_bounds_round_outwards() {
        let t = sample();
        let h = height_bounds(&t, &[0, 3]);
        assert_eq!((h.min, h.max), (165, 170));
        assert!(!h.is_fixed());
    }

    #[test]
    fn single_fractional_height_is_fixed() {
        let t = sample();
        let h = height_bounds(&t, &[3]);
        assert!(h.is_fixed());
        assert_eq!(h.single, Some(165.5));
        assert_eq!((h.min, h.max), (165, 166));
        assert_eq!(apply_ranges(&t, &[3], (25, 25), h.resolve(Some((165, 165)))), vec![3]);
    }

    #[test]
    fn no_valid_ages_fall_back_to_unit_range() {
        let t = sample();
        let ages = age_bounds(&t, &[2]);
        assert_eq!(ages, RangeControl::FALLBACK);
        assert!(!ages.valid);
    }

    #[test]
    fn resolve_clamps_into_bounds() {
        let bounds = RangeControl {
            min: 18,
            max: 30,
            valid: true,
            single: None,
        };
        assert_eq!(bounds.resolve(None), (18, 30));
        assert_eq!(bounds.resolve(Some((10, 40))), (18, 30));
        assert_eq!(bounds.resolve(Some((25, 20))), (25, 25));
        let fixed = RangeControl {
            min: 20,
            max: 20,
            valid: true,
            single: Some(20.0),
        };
        assert!(fixed.is_fixed());
        assert_eq!(fixed.resolve(Some((0, 99))), (20, 20));
    }

    #[test]
    fn float_noise_stays_inside_bounds() {
        let t = table(vec![record("A", "O+", "Negro", "Centro", Some(20), 1.1, 50.0)]);
        let h = height_bounds(&t, &[0]);
        assert_eq!((h.min, h.max), (110, 110));
        assert_eq!(apply_ranges(&t, &[0], (20, 20), h.resolve(None)), vec![0]);
    }

    #[test]
    fn ranges_are_inclusive_and_drop_null_age() {
        let t = sample();
        let kept = apply_ranges(&t, &[0, 1, 2, 3], (20, 22), (160, 180));
        assert_eq!(kept, vec![0, 1]);
    }
}
