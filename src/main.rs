mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod export;
mod state;
mod ui;
mod view;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use app::PrecipApp;
use config::Cli;
use data::store::DatasetStore;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = DatasetStore::load(&cli.forecast, &cli.probabilities, &cli.load_options())
        .context("loading precipitation tables")?;
    let state = cli.initial_state();

    if let Some(path) = &cli.export {
        let view = dashboard::evaluate(&store, &state);
        export::write_json(path, &view)?;
        let charts = view.content.charts();
        let empty = charts.iter().filter(|c| c.is_no_data()).count();
        log::info!(
            "Wrote {} charts ({empty} without data) for {} rows to {}",
            charts.len(),
            view.matching_rows,
            path.display()
        );
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Precip Panda – Colombia Precipitation Outlook",
        options,
        Box::new(move |_cc| Ok(Box::new(PrecipApp::new(store, state)))),
    )
    .map_err(|e| anyhow!("running the viewer: {e}"))
}
