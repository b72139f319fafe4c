// src/gui/components/stats_panel.rs
//
// Summary of the current record set (same numbers the CLI prints).

use eframe::egui;

use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Statistics");
    let Some(result) = &app.result else {
        ui.label("No data yet");
        return;
    };
    let summary = result.summary(app.state.options.export.top_n);

    egui::ScrollArea::vertical()
        .id_salt("stats_scroll")
        .show(ui, |ui| {
            ui.label(format!("Total: {}", summary.total));
            ui.label(format!("Method: {}", summary.acquisition));

            egui::CollapsingHeader::new("By category").default_open(true).show(ui, |ui| {
                for (c, n) in &summary.by_category {
                    ui.label(format!("{} {}: {}", c.local_name(), c, n));
                }
            });
            egui::CollapsingHeader::new("By contract method").default_open(true).show(ui, |ui| {
                for (m, n) in &summary.by_method {
                    ui.label(format!("{m}: {n}"));
                }
            });
            egui::CollapsingHeader::new("Top institutions").show(ui, |ui| {
                for (i, n) in &summary.top_institutions {
                    ui.label(format!("{i}: {n}"));
                }
            });
            egui::CollapsingHeader::new("By date").show(ui, |ui| {
                for (d, n) in &summary.by_date {
                    ui.label(format!("{}: {n}", d.format("%Y-%m-%d")));
                }
            });
            ui.small(format!(
                "dup {} · filtered {} · rejected {}",
                summary.duplicates, summary.filtered, summary.rejected
            ));
        });
}
