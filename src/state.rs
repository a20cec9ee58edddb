use crate::color::CountryColors;
use crate::data::aggregate::{summarize, DashboardSummary};
use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::model::BonusTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which chart the central panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    RoiByCountry,
    IncomeSegmentation,
    Fairness,
    CostToRevenue,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::RoiByCountry,
        ChartKind::IncomeSegmentation,
        ChartKind::Fairness,
        ChartKind::CostToRevenue,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::RoiByCountry => "Bonus ROI by Country",
            ChartKind::IncomeSegmentation => "Customer Segmentation by Income Level",
            ChartKind::Fairness => "Fairness in Bonus Distribution",
            ChartKind::CostToRevenue => "Cost-to-Revenue Ratio",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until the user opens a file). Immutable once set.
    pub table: Option<BonusTable>,

    /// Current per-dimension filter selection.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection (cached per recompute).
    pub visible_rows: Vec<usize>,

    /// Aggregates over `visible_rows` (cached per recompute).
    pub summary: DashboardSummary,

    /// Chart shown in the central panel.
    pub active_chart: ChartKind,

    /// Stable per-country bar colours, rebuilt per loaded table.
    pub colors: CountryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            selection: FilterSelection::default(),
            visible_rows: Vec::new(),
            summary: DashboardSummary::default(),
            active_chart: ChartKind::default(),
            colors: CountryColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table, reset the selection and recompute.
    pub fn set_table(&mut self, table: BonusTable) {
        self.selection = FilterSelection::default();
        self.visible_rows = (0..table.len()).collect();
        self.summary = summarize(&table, &self.visible_rows);
        self.colors = CountryColors::new(&table.countries);
        self.table = Some(table);
        self.status_message = None;
    }

    /// Re-run the filter → aggregate pipeline after a selection change.
    ///
    /// On a filter error the previous view and summary stay on screen and
    /// only the status line changes; one bad cycle never blanks the
    /// dashboard.
    pub fn recompute(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match filtered_indices(table, &self.selection) {
            Ok(view) => {
                self.summary = summarize(table, &view);
                self.visible_rows = view;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("filter rejected: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Constraint;
    use crate::data::model::tests::record;

    fn two_country_table() -> BonusTable {
        BonusTable::from_records(vec![record("Austria", "18-25"), record("Germany", "26-35")])
    }

    #[test]
    fn set_table_shows_everything() {
        let mut state = AppState::default();
        state.set_table(two_country_table());
        assert_eq!(state.visible_rows, vec![0, 1]);
        assert!(state.summary.kpis.avg_bonus_roi.is_some());
    }

    #[test]
    fn failed_recompute_keeps_previous_view() {
        let mut state = AppState::default();
        state.set_table(two_country_table());

        state.selection.country = Constraint::EqualTo("Austria".to_string());
        state.recompute();
        assert_eq!(state.visible_rows, vec![0]);

        let before = state.summary.clone();
        state.selection.country = Constraint::EqualTo("Atlantis".to_string());
        state.recompute();
        assert_eq!(state.visible_rows, vec![0]);
        assert_eq!(state.summary, before);
        assert!(state.status_message.as_deref().unwrap().contains("Atlantis"));
    }
}
