use std::sync::Arc;

use eframe::egui;

use crate::dashboard::DashboardState;
use crate::data::store::DatasetStore;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PrecipApp {
    pub state: AppState,
}

impl PrecipApp {
    pub fn new(store: DatasetStore, dashboard: DashboardState) -> Self {
        Self {
            state: AppState::new(Arc::new(store), dashboard),
        }
    }
}

impl eframe::App for PrecipApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, &self.state);
        });
    }
}
