use anyhow::Context;
use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::Constraint;
use crate::data::model::IncomeCategory;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel: one dropdown per categorical dimension,
/// each offering "All" plus the table's fixed domain values.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the domains so we can mutate the selection inside the closures.
    let countries = table.countries.clone();
    let age_groups = table.age_groups.clone();

    let mut changed = false;

    changed |= string_constraint_combo(
        ui,
        "country_filter",
        "Country",
        &mut state.selection.country,
        &countries,
    );
    changed |= string_constraint_combo(
        ui,
        "age_group_filter",
        "Age Group",
        &mut state.selection.age_group,
        &age_groups,
    );
    changed |= income_category_combo(ui, &mut state.selection.income_category);

    if changed {
        state.recompute();
    }
}

/// A dropdown over "All" + the given domain values. Returns whether the
/// selection changed.
fn string_constraint_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    constraint: &mut Constraint<String>,
    options: &[String],
) -> bool {
    let mut changed = false;

    ui.strong(label);
    let selected_text = match constraint {
        Constraint::Unconstrained => "All".to_string(),
        Constraint::EqualTo(v) => v.clone(),
    };
    egui::ComboBox::from_id_salt(id)
        .width(ui.available_width())
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            let is_all = matches!(constraint, Constraint::Unconstrained);
            if ui.selectable_label(is_all, "All").clicked() && !is_all {
                *constraint = Constraint::Unconstrained;
                changed = true;
            }
            for option in options {
                let is_selected = matches!(constraint, Constraint::EqualTo(v) if v == option);
                if ui.selectable_label(is_selected, option).clicked() && !is_selected {
                    *constraint = Constraint::EqualTo(option.clone());
                    changed = true;
                }
            }
        });
    ui.add_space(8.0);

    changed
}

fn income_category_combo(ui: &mut Ui, constraint: &mut Constraint<IncomeCategory>) -> bool {
    let mut changed = false;

    ui.strong("Income Category");
    let selected_text = match constraint {
        Constraint::Unconstrained => "All".to_string(),
        Constraint::EqualTo(cat) => cat.to_string(),
    };
    egui::ComboBox::from_id_salt("income_category_filter")
        .width(ui.available_width())
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            let is_all = matches!(constraint, Constraint::Unconstrained);
            if ui.selectable_label(is_all, "All").clicked() && !is_all {
                *constraint = Constraint::Unconstrained;
                changed = true;
            }
            for cat in IncomeCategory::ALL {
                let is_selected = matches!(constraint, Constraint::EqualTo(c) if *c == cat);
                if ui
                    .selectable_label(is_selected, cat.to_string())
                    .clicked()
                    && !is_selected
                {
                    *constraint = Constraint::EqualTo(cat);
                    changed = true;
                }
            }
        });
    ui.add_space(8.0);

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} matching",
                table.len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bonus-allocation data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let result = crate::data::loader::load_file(&path)
            .with_context(|| format!("loading {}", path.display()));
        match result {
            Ok(table) => {
                log::info!(
                    "Loaded {} records across {} countries",
                    table.len(),
                    table.countries.len()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
