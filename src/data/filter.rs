use super::error::FilterError;
use super::model::{BonusTable, IncomeCategory};

// ---------------------------------------------------------------------------
// Filter selection: one equality constraint per categorical dimension
// ---------------------------------------------------------------------------

/// A single dimension's constraint. `Unconstrained` is what the UI shows as
/// "All"; the engine never compares against a magic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint<T> {
    Unconstrained,
    EqualTo(T),
}

impl<T> Default for Constraint<T> {
    fn default() -> Self {
        Constraint::Unconstrained
    }
}

impl<T: PartialEq> Constraint<T> {
    /// Whether a row value satisfies this constraint.
    fn matches(&self, value: &T) -> bool {
        match self {
            Constraint::Unconstrained => true,
            Constraint::EqualTo(wanted) => wanted == value,
        }
    }
}

/// The active selection across all three filterable dimensions.
/// Constraints compose conjunctively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub country: Constraint<String>,
    pub age_group: Constraint<String>,
    pub income_category: Constraint<IncomeCategory>,
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Return indices of records that pass all active constraints, preserving
/// table order.
///
/// Zero matches is a legitimate empty view. A concrete constraint value that
/// does not exist in the table's fixed domain is a [`FilterError`] instead:
/// it means the selection and the table have diverged, which must not be
/// mistaken for "no rows matched".
pub fn filtered_indices(
    table: &BonusTable,
    selection: &FilterSelection,
) -> Result<Vec<usize>, FilterError> {
    validate_selection(table, selection)?;

    Ok(table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            selection.country.matches(&rec.country)
                && selection.age_group.matches(&rec.age_group)
                && match &selection.income_category {
                    Constraint::Unconstrained => true,
                    // Unlabeled rows (None) never match a concrete bucket.
                    Constraint::EqualTo(wanted) => rec.income_category == Some(*wanted),
                }
        })
        .map(|(i, _)| i)
        .collect())
}

/// Check every concrete constraint against the table's fixed domains.
fn validate_selection(table: &BonusTable, selection: &FilterSelection) -> Result<(), FilterError> {
    if let Constraint::EqualTo(country) = &selection.country {
        if !table.countries.contains(country) {
            return Err(FilterError {
                dimension: "country",
                value: country.clone(),
            });
        }
    }
    if let Constraint::EqualTo(age_group) = &selection.age_group {
        if !table.age_groups.contains(age_group) {
            return Err(FilterError {
                dimension: "age group",
                value: age_group.clone(),
            });
        }
    }
    // Income categories come from a closed enum; any value is in-domain.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{tests::record, BonusRecord};

    fn sample_table() -> BonusTable {
        let mut rows: Vec<BonusRecord> = vec![
            record("Austria", "18-25"),
            record("Austria", "26-35"),
            record("Germany", "18-25"),
        ];
        rows[1].income_category = Some(IncomeCategory::High);
        rows[2].income_category = None;
        BonusTable::from_records(rows)
    }

    #[test]
    fn unconstrained_selection_is_identity() {
        let table = sample_table();
        let view = filtered_indices(&table, &FilterSelection::default()).unwrap();
        assert_eq!(view, vec![0, 1, 2]);
    }

    #[test]
    fn constraints_compose_conjunctively() {
        let table = sample_table();
        let selection = FilterSelection {
            country: Constraint::EqualTo("Austria".to_string()),
            age_group: Constraint::EqualTo("18-25".to_string()),
            income_category: Constraint::Unconstrained,
        };
        let view = filtered_indices(&table, &selection).unwrap();
        assert_eq!(view, vec![0]);
        for &i in &view {
            assert_eq!(table.records[i].country, "Austria");
            assert_eq!(table.records[i].age_group, "18-25");
        }
    }

    #[test]
    fn zero_matches_is_an_empty_view_not_an_error() {
        let table = sample_table();
        let selection = FilterSelection {
            country: Constraint::EqualTo("Germany".to_string()),
            age_group: Constraint::EqualTo("26-35".to_string()),
            income_category: Constraint::Unconstrained,
        };
        assert_eq!(filtered_indices(&table, &selection).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn unknown_value_fails_loudly() {
        let table = sample_table();
        let selection = FilterSelection {
            country: Constraint::EqualTo("Atlantis".to_string()),
            ..FilterSelection::default()
        };
        let err = filtered_indices(&table, &selection).unwrap_err();
        assert_eq!(err.dimension, "country");
        assert_eq!(err.value, "Atlantis");
    }

    #[test]
    fn unlabeled_rows_never_match_a_concrete_bucket() {
        let table = sample_table();
        let selection = FilterSelection {
            income_category: Constraint::EqualTo(IncomeCategory::Middle),
            ..FilterSelection::default()
        };
        // Row 2 is unlabeled and must not appear.
        assert_eq!(filtered_indices(&table, &selection).unwrap(), vec![0]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = sample_table();
        let selection = FilterSelection {
            country: Constraint::EqualTo("Austria".to_string()),
            ..FilterSelection::default()
        };
        let once = filtered_indices(&table, &selection).unwrap();

        // Re-apply to a table rebuilt from the surviving rows.
        let survivors: Vec<BonusRecord> =
            once.iter().map(|&i| table.records[i].clone()).collect();
        let refiltered = BonusTable::from_records(survivors.clone());
        let twice = filtered_indices(&refiltered, &selection).unwrap();
        let twice_rows: Vec<BonusRecord> =
            twice.iter().map(|&i| refiltered.records[i].clone()).collect();
        assert_eq!(twice_rows, survivors);
    }
}
