use super::model::{BonusRecord, IncomeCategory};

// ---------------------------------------------------------------------------
// Income binning: income_level → IncomeCategory
// ---------------------------------------------------------------------------

/// One bin of the income classification, evaluated in list order.
struct IncomeBin {
    lower: f64,
    /// Whether `lower` itself belongs to this bin.
    lower_inclusive: bool,
    /// Upper bound, always inclusive (pandas-style right-closed intervals).
    upper: f64,
    label: IncomeCategory,
}

/// The fixed classification: (0, 30000] / (30000, 70000] / (70000, 150000],
/// with the lowest boundary included in the first bin.
const INCOME_BINS: [IncomeBin; 3] = [
    IncomeBin {
        lower: 0.0,
        lower_inclusive: true,
        upper: 30_000.0,
        label: IncomeCategory::Low,
    },
    IncomeBin {
        lower: 30_000.0,
        lower_inclusive: false,
        upper: 70_000.0,
        label: IncomeCategory::Middle,
    },
    IncomeBin {
        lower: 70_000.0,
        lower_inclusive: false,
        upper: 150_000.0,
        label: IncomeCategory::High,
    },
];

/// Classify a single income level. Values outside [0, 150000] (and NaN)
/// get no bucket; the caller keeps such rows unlabeled rather than dropping
/// them.
pub fn income_category(income_level: f64) -> Option<IncomeCategory> {
    INCOME_BINS
        .iter()
        .find(|bin| {
            let above_lower = if bin.lower_inclusive {
                income_level >= bin.lower
            } else {
                income_level > bin.lower
            };
            above_lower && income_level <= bin.upper
        })
        .map(|bin| bin.label)
}

/// Attach the derived income category to every record in place.
/// Adds the column only; no row is removed or otherwise mutated.
pub fn attach_income_categories(records: &mut [BonusRecord]) {
    for rec in records.iter_mut() {
        rec.income_category = income_category(rec.income_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_follow_right_closed_policy() {
        assert_eq!(income_category(0.0), Some(IncomeCategory::Low));
        assert_eq!(income_category(30_000.0), Some(IncomeCategory::Low));
        assert_eq!(income_category(30_001.0), Some(IncomeCategory::Middle));
        assert_eq!(income_category(70_000.0), Some(IncomeCategory::Middle));
        assert_eq!(income_category(70_000.5), Some(IncomeCategory::High));
        assert_eq!(income_category(150_000.0), Some(IncomeCategory::High));
    }

    #[test]
    fn out_of_range_incomes_stay_unlabeled() {
        assert_eq!(income_category(-1.0), None);
        assert_eq!(income_category(150_000.1), None);
        assert_eq!(income_category(f64::NAN), None);
    }

    #[test]
    fn attach_labels_every_row_without_dropping_any() {
        let mut records = vec![
            crate::data::model::tests::record("A", "18-25"),
            crate::data::model::tests::record("B", "26-35"),
        ];
        records[0].income_level = 20_000.0;
        records[1].income_level = 500_000.0;

        attach_income_categories(&mut records);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].income_category, Some(IncomeCategory::Low));
        assert_eq!(records[1].income_category, None);
    }
}
