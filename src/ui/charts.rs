use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::data::aggregate::DashboardSummary;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Central panel: KPI cards + the active chart
// ---------------------------------------------------------------------------

/// Render the dashboard body in the central panel.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore bonus allocations  (File → Open…)");
        });
        return;
    }

    kpi_row(ui, &state.summary);
    ui.separator();

    // Chart tab strip.
    ui.horizontal(|ui: &mut Ui| {
        for kind in ChartKind::ALL {
            if ui
                .selectable_label(state.active_chart == kind, kind.title())
                .clicked()
            {
                state.active_chart = kind;
            }
        }
    });
    ui.add_space(4.0);

    if state.visible_rows.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No records match the current filters.");
        });
        return;
    }

    match state.active_chart {
        ChartKind::RoiByCountry => roi_by_country_chart(ui, state),
        ChartKind::IncomeSegmentation => income_segmentation_chart(ui, &state.summary),
        ChartKind::Fairness => fairness_chart(ui, &state.summary),
        ChartKind::CostToRevenue => cost_to_revenue_histogram(ui, &state.summary),
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// Format a metric for display; undefined is "N/A", never a fake zero.
fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

fn kpi_row(ui: &mut Ui, summary: &DashboardSummary) {
    ui.columns(3, |cols: &mut [Ui]| {
        kpi_card(&mut cols[0], "Average Bonus ROI", summary.kpis.avg_bonus_roi);
        kpi_card(
            &mut cols[1],
            "Average Customer Lifetime Value",
            summary.kpis.avg_customer_lifetime_value,
        );
        kpi_card(
            &mut cols[2],
            "Bonus Distribution Variance",
            summary.kpis.bonus_distribution_variance,
        );
    });
}

fn kpi_card(ui: &mut Ui, label: &str, value: Option<f64>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(label);
            ui.label(RichText::new(fmt_metric(value)).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn roi_by_country_chart(ui: &mut Ui, state: &AppState) {
    let countries: Vec<String> = state
        .summary
        .roi_by_country
        .iter()
        .map(|c| c.country.clone())
        .collect();

    let bars: Vec<Bar> = state
        .summary
        .roi_by_country
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let roi = entry.avg_bonus_roi?;
            Some(
                Bar::new(i as f64, roi)
                    .width(0.6)
                    .name(&entry.country)
                    .fill(state.colors.color_for(&entry.country)),
            )
        })
        .collect();

    Plot::new("roi_by_country")
        .legend(Legend::default())
        .y_axis_label("Average Bonus ROI")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as usize;
            if (mark.value - i as f64).abs() < 1e-6 {
                countries.get(i).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Average Bonus ROI"));
        });
}

fn income_segmentation_chart(ui: &mut Ui, summary: &DashboardSummary) {
    let levels: Vec<f64> = summary
        .income_segments
        .iter()
        .map(|s| s.income_level)
        .collect();

    let bonus_bars: Vec<Bar> = summary
        .income_segments
        .iter()
        .enumerate()
        .filter_map(|(i, seg)| Some(Bar::new(i as f64 - 0.2, seg.avg_bonus?).width(0.35)))
        .collect();
    let wagering_bars: Vec<Bar> = summary
        .income_segments
        .iter()
        .enumerate()
        .filter_map(|(i, seg)| {
            Some(Bar::new(i as f64 + 0.2, seg.avg_wagering_increase?).width(0.35))
        })
        .collect();

    Plot::new("income_segmentation")
        .legend(Legend::default())
        .y_axis_label("Average Amount")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as usize;
            if (mark.value - i as f64).abs() < 1e-6 {
                levels.get(i).map(|lvl| format!("{lvl:.0}")).unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bonus_bars).name("Avg Bonus Received"));
            plot_ui.bar_chart(BarChart::new(wagering_bars).name("Avg Wagering Increase"));
        });
}

fn fairness_chart(ui: &mut Ui, summary: &DashboardSummary) {
    // Variance is undefined for single-row groups, so list it as text under
    // the chart rather than forcing a zero bar.
    for slice in &summary.fairness {
        let label = if slice.should_receive_bonus {
            "Eligible"
        } else {
            "Not eligible"
        };
        ui.label(format!(
            "{label}: variance {}",
            fmt_metric(slice.bonus_variance)
        ));
    }

    let bars: Vec<Bar> = summary
        .fairness
        .iter()
        .filter_map(|slice| {
            let x = if slice.should_receive_bonus { 1.0 } else { 0.0 };
            Some(Bar::new(x, slice.avg_bonus?).width(0.6))
        })
        .collect();

    Plot::new("fairness")
        .legend(Legend::default())
        .y_axis_label("Average Bonus Received")
        .x_axis_formatter(|mark, _range| {
            if (mark.value - 0.0).abs() < 1e-6 {
                "Not eligible".to_string()
            } else if (mark.value - 1.0).abs() < 1e-6 {
                "Eligible".to_string()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Avg Bonus Received"));
        });
}

const HISTOGRAM_BINS: usize = 20;

fn cost_to_revenue_histogram(ui: &mut Ui, summary: &DashboardSummary) {
    let ratios = &summary.cost_to_revenue;
    if ratios.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No valid cost-to-revenue ratios in the current selection.");
        });
        return;
    }

    let min = ratios.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = ratios.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);
    let bin_width = span / HISTOGRAM_BINS as f64;

    let mut counts = [0usize; HISTOGRAM_BINS];
    for &r in ratios {
        let bin = (((r - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let center = min + (i as f64 + 0.5) * bin_width;
            Bar::new(center, count as f64).width(bin_width * 0.95)
        })
        .collect();

    Plot::new("cost_to_revenue")
        .legend(Legend::default())
        .x_axis_label("Cost-to-Revenue Ratio")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Cost-to-Revenue"));
        });
}
