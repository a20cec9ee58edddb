use std::collections::BTreeMap;

use super::model::{BonusRecord, BonusTable};

// ---------------------------------------------------------------------------
// Summary types handed to the presentation layer
// ---------------------------------------------------------------------------
//
// Every metric is `Option<f64>`: `None` means "insufficient data" and is
// rendered as "N/A". A legitimate zero is always `Some(0.0)`, so the two are
// distinguishable at this boundary.

/// Scalar KPIs over the current view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kpis {
    pub avg_bonus_roi: Option<f64>,
    pub avg_customer_lifetime_value: Option<f64>,
    pub bonus_distribution_variance: Option<f64>,
}

/// Mean bonus ROI for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRoi {
    pub country: String,
    pub avg_bonus_roi: Option<f64>,
}

/// Bonus and wagering behaviour for one distinct income level.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeSegment {
    pub income_level: f64,
    pub avg_bonus: Option<f64>,
    pub avg_wagering_increase: Option<f64>,
}

/// Bonus distribution per eligibility flag value.
#[derive(Debug, Clone, PartialEq)]
pub struct FairnessSlice {
    pub should_receive_bonus: bool,
    pub avg_bonus: Option<f64>,
    pub bonus_variance: Option<f64>,
}

/// Everything one recompute produces for rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    /// Mean bonus ROI per country, sorted by country name.
    pub roi_by_country: Vec<CountryRoi>,
    /// Per-income-level means, sorted by income level ascending.
    pub income_segments: Vec<IncomeSegment>,
    /// Per-flag bonus distribution, `false` before `true`.
    pub fairness: Vec<FairnessSlice>,
    /// Per-row cost-to-revenue ratios for histogram binning. Rows with a
    /// zero or non-finite denominator are excluded rather than propagated
    /// as infinity.
    pub cost_to_revenue: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean; `None` on empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (denominator n − 1); `None` for fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

// ---------------------------------------------------------------------------
// Full recompute
// ---------------------------------------------------------------------------

/// Compute the complete dashboard summary over the given view.
///
/// Stateless and cache-free: every call recomputes from scratch, which is
/// fine at the scale of one in-memory table.
pub fn summarize(table: &BonusTable, view: &[usize]) -> DashboardSummary {
    let rows: Vec<&BonusRecord> = view.iter().map(|&i| &table.records[i]).collect();

    DashboardSummary {
        kpis: compute_kpis(&rows),
        roi_by_country: roi_by_country(&rows),
        income_segments: income_segments(&rows),
        fairness: fairness(&rows),
        cost_to_revenue: cost_to_revenue(&rows),
    }
}

fn compute_kpis(rows: &[&BonusRecord]) -> Kpis {
    let roi: Vec<f64> = rows.iter().map(|r| r.bonus_roi).collect();
    let clv: Vec<f64> = rows.iter().map(|r| r.customer_lifetime_value).collect();
    let bonuses: Vec<f64> = rows.iter().map(|r| r.amount_of_bonuses_received).collect();

    Kpis {
        avg_bonus_roi: mean(&roi),
        avg_customer_lifetime_value: mean(&clv),
        bonus_distribution_variance: sample_variance(&bonuses),
    }
}

fn roi_by_country(rows: &[&BonusRecord]) -> Vec<CountryRoi> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in rows {
        groups
            .entry(rec.country.as_str())
            .or_default()
            .push(rec.bonus_roi);
    }
    groups
        .into_iter()
        .map(|(country, rois)| CountryRoi {
            country: country.to_string(),
            avg_bonus_roi: mean(&rois),
        })
        .collect()
}

fn income_segments(rows: &[&BonusRecord]) -> Vec<IncomeSegment> {
    // income_level is a float key, so group via an explicit sorted list
    // instead of a BTreeMap.
    let mut groups: Vec<(f64, Vec<f64>, Vec<f64>)> = Vec::new();
    for rec in rows {
        match groups
            .iter_mut()
            .find(|(level, _, _)| *level == rec.income_level)
        {
            Some((_, bonuses, wagering)) => {
                bonuses.push(rec.amount_of_bonuses_received);
                wagering.push(rec.increase_in_wagering_after_bonus);
            }
            None => groups.push((
                rec.income_level,
                vec![rec.amount_of_bonuses_received],
                vec![rec.increase_in_wagering_after_bonus],
            )),
        }
    }
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    groups
        .into_iter()
        .map(|(income_level, bonuses, wagering)| IncomeSegment {
            income_level,
            avg_bonus: mean(&bonuses),
            avg_wagering_increase: mean(&wagering),
        })
        .collect()
}

fn fairness(rows: &[&BonusRecord]) -> Vec<FairnessSlice> {
    let mut groups: BTreeMap<bool, Vec<f64>> = BTreeMap::new();
    for rec in rows {
        groups
            .entry(rec.should_receive_bonus)
            .or_default()
            .push(rec.amount_of_bonuses_received);
    }
    groups
        .into_iter()
        .map(|(flag, bonuses)| FairnessSlice {
            should_receive_bonus: flag,
            avg_bonus: mean(&bonuses),
            bonus_variance: sample_variance(&bonuses),
        })
        .collect()
}

fn cost_to_revenue(rows: &[&BonusRecord]) -> Vec<f64> {
    rows.iter()
        .filter_map(|rec| {
            let revenue = rec.revenue_from_bonuses;
            if revenue == 0.0 || !revenue.is_finite() {
                return None;
            }
            let ratio = rec.amount_of_bonuses_received / revenue;
            ratio.is_finite().then_some(ratio)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, Constraint, FilterSelection};
    use crate::data::model::tests::record;

    fn all_indices(table: &BonusTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn mean_and_variance_edge_cases() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert_eq!(sample_variance(&[]), None);
        // A single data point has no sample variance.
        assert_eq!(sample_variance(&[4.0]), None);
        assert_eq!(sample_variance(&[1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn empty_view_yields_undefined_kpis() {
        let table = BonusTable::from_records(vec![record("A", "18-25")]);
        let summary = summarize(&table, &[]);
        assert_eq!(summary.kpis.avg_bonus_roi, None);
        assert_eq!(summary.kpis.avg_customer_lifetime_value, None);
        assert_eq!(summary.kpis.bonus_distribution_variance, None);
        assert!(summary.roi_by_country.is_empty());
        assert!(summary.income_segments.is_empty());
        assert!(summary.fairness.is_empty());
        assert!(summary.cost_to_revenue.is_empty());
    }

    #[test]
    fn country_scenario_matches_expected_means() {
        let mut rows = vec![record("A", "18-25"), record("A", "18-25"), record("B", "18-25")];
        rows[0].bonus_roi = 1.0;
        rows[1].bonus_roi = 3.0;
        rows[2].bonus_roi = 5.0;
        let table = BonusTable::from_records(rows);

        // Unfiltered group-by.
        let summary = summarize(&table, &all_indices(&table));
        assert_eq!(
            summary.roi_by_country,
            vec![
                CountryRoi { country: "A".to_string(), avg_bonus_roi: Some(2.0) },
                CountryRoi { country: "B".to_string(), avg_bonus_roi: Some(5.0) },
            ]
        );

        // Filtered to country A: two rows, mean ROI 2.0.
        let selection = FilterSelection {
            country: Constraint::EqualTo("A".to_string()),
            ..FilterSelection::default()
        };
        let view = filtered_indices(&table, &selection).unwrap();
        assert_eq!(view.len(), 2);
        let filtered = summarize(&table, &view);
        assert_eq!(filtered.kpis.avg_bonus_roi, Some(2.0));
    }

    #[test]
    fn income_segments_sorted_by_level() {
        let mut rows = vec![record("A", "18-25"), record("A", "18-25"), record("A", "18-25")];
        rows[0].income_level = 60_000.0;
        rows[0].amount_of_bonuses_received = 10.0;
        rows[1].income_level = 20_000.0;
        rows[1].amount_of_bonuses_received = 30.0;
        rows[2].income_level = 20_000.0;
        rows[2].amount_of_bonuses_received = 50.0;
        let table = BonusTable::from_records(rows);

        let segments = summarize(&table, &all_indices(&table)).income_segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].income_level, 20_000.0);
        assert_eq!(segments[0].avg_bonus, Some(40.0));
        assert_eq!(segments[1].income_level, 60_000.0);
        assert_eq!(segments[1].avg_bonus, Some(10.0));
    }

    #[test]
    fn fairness_groups_by_flag_with_variance() {
        let mut rows = vec![
            record("A", "18-25"),
            record("A", "18-25"),
            record("A", "18-25"),
        ];
        rows[0].should_receive_bonus = false;
        rows[0].amount_of_bonuses_received = 8.0;
        rows[1].should_receive_bonus = true;
        rows[1].amount_of_bonuses_received = 2.0;
        rows[2].should_receive_bonus = true;
        rows[2].amount_of_bonuses_received = 4.0;
        let table = BonusTable::from_records(rows);

        let fairness = summarize(&table, &all_indices(&table)).fairness;
        assert_eq!(fairness.len(), 2);
        assert!(!fairness[0].should_receive_bonus);
        assert_eq!(fairness[0].avg_bonus, Some(8.0));
        // One row only: variance undefined, not zero.
        assert_eq!(fairness[0].bonus_variance, None);
        assert!(fairness[1].should_receive_bonus);
        assert_eq!(fairness[1].avg_bonus, Some(3.0));
        assert_eq!(fairness[1].bonus_variance, Some(2.0));
    }

    #[test]
    fn cost_to_revenue_excludes_zero_denominators() {
        let mut rows = vec![record("A", "18-25"), record("A", "18-25"), record("A", "18-25")];
        rows[0].revenue_from_bonuses = 10.0;
        rows[0].amount_of_bonuses_received = 5.0;
        rows[1].revenue_from_bonuses = 0.0;
        rows[1].amount_of_bonuses_received = 5.0;
        rows[2].revenue_from_bonuses = 5.0;
        rows[2].amount_of_bonuses_received = 5.0;
        let table = BonusTable::from_records(rows);

        let ratios = summarize(&table, &all_indices(&table)).cost_to_revenue;
        assert_eq!(ratios, vec![0.5, 1.0]);
    }
}
