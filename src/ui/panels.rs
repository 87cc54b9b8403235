use eframe::egui::{self, Color32, RichText, Ui};

use crate::dashboard::Tab;
use crate::data::model::GroupAttribute;
use crate::export;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Grouping attribute ----
    ui.strong("Filter by");
    let current_attr = state.dashboard.selection.attribute;
    for attribute in GroupAttribute::ALL {
        if ui.radio(current_attr == attribute, attribute.label()).clicked() {
            state.select_attribute(attribute);
        }
    }
    ui.separator();

    // ---- Value selector (options depend on the attribute above) ----
    ui.strong(state.dashboard.selection.attribute.label());
    let current = state.dashboard.selection.value.clone();
    let options = state.view.options.clone();
    let mut chosen = None;

    egui::ComboBox::from_id_salt("filter_value")
        .selected_text(current.label())
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui: &mut Ui| {
            for option in &options {
                if ui
                    .selectable_label(*option == current, option.label())
                    .clicked()
                {
                    chosen = Some(option.clone());
                }
            }
        });

    if let Some(value) = chosen {
        state.select_value(value);
    }

    ui.add_space(8.0);
    ui.label(format!("{} values available", options.len().saturating_sub(1)));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, the tab switcher and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export charts…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            if ui
                .selectable_label(state.dashboard.tab == tab, tab.label())
                .clicked()
            {
                state.select_tab(tab);
            }
        }

        ui.separator();

        let total = match state.dashboard.tab {
            Tab::Forecast => state.store.forecast().len(),
            Tab::Probability => state.store.probability().len(),
        };
        ui.label(format!(
            "{} of {total} points shown",
            state.view.matching_rows
        ));

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.separator();
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart specifications")
        .add_filter("JSON", &["json"])
        .set_file_name("charts.json")
        .save_file();

    if let Some(path) = file {
        match export::write_json(&path, &state.view) {
            Ok(()) => {
                log::info!("Exported charts to {}", path.display());
                state.status = Some(Status::Info(format!("Exported to {}", path.display())));
            }
            Err(e) => {
                log::error!("Failed to export charts: {e:#}");
                state.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }
}
