// src/gui/components/export_bar.rs

use chrono::Local;
use eframe::egui;

use crate::gui::{actions, app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.label("Output dir:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.out_dir_text).desired_width(220.0));
        ui.label("Label:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.label_text).desired_width(140.0));

        let export = actions::sync_export_fields(app);
        ui.weak(export.file_name(Local::now().date_naive()));

        let can_export = app.result.as_ref().is_some_and(|r| !r.is_empty()) && !app.running;
        if ui.add_enabled(can_export, egui::Button::new("Export CSV")).clicked() {
            actions::export_csv(app);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Search:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.search).desired_width(260.0));

        let current = app.state.gui.category_filter;
        let text = current.map_or(s!("all categories"), |c| c.label().to_string());
        egui::ComboBox::from_id_salt("category_filter")
            .selected_text(text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.state.gui.category_filter, None, "all categories");
                for c in crate::model::Category::ALL {
                    ui.selectable_value(&mut app.state.gui.category_filter, Some(c), c.label());
                }
            });
    });
}
