use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::AggregatedGroup;
use crate::data::model::{GroupAttribute, ProbabilityCategory};

/// Rescaled category shares, one row per group.
pub fn groups_table(ui: &mut Ui, attribute: GroupAttribute, groups: &[AggregatedGroup]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(160.0))
        .columns(Column::auto().at_least(80.0), ProbabilityCategory::ALL.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(attribute.label());
            });
            for cat in ProbabilityCategory::ALL {
                header.col(|ui| {
                    ui.strong(format!("{} (%)", cat.label()));
                });
            }
        })
        .body(|mut body| {
            for group in groups {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&group.key);
                    });
                    for cat in ProbabilityCategory::ALL {
                        row.col(|ui| {
                            ui.label(format!("{:.1}", group.percent(cat)));
                        });
                    }
                });
            }
        });
}
