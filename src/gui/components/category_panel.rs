// src/gui/components/category_panel.rs
//
// Left panel: what to collect and from where, plus the Collect button.

use eframe::egui;

use crate::gui::{actions, app::App};
use crate::model::Category;
use crate::sources::demo::DemoSet;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Categories");
    ui.add_enabled_ui(!app.running, |ui| {
        for (i, c) in Category::ALL.into_iter().enumerate() {
            let label = format!("{} ({})", c.local_name(), c);
            if ui.checkbox(&mut app.state.gui.selected_categories[i], label).changed() {
                logf!("UI: {} → {}", c, app.state.gui.selected_categories[i]);
            }
        }

        ui.separator();
        let opts = &mut app.state.options.collect;
        ui.horizontal(|ui| {
            ui.label("Days:");
            ui.add(egui::DragValue::new(&mut opts.days).range(1..=90));
        });

        ui.separator();
        ui.label("Sources");
        let key_hint = if opts.api_key.is_some() { "Public API" } else { "Public API (no key)" };
        ui.checkbox(&mut opts.use_api, key_hint);
        ui.checkbox(&mut opts.use_browser, "Browser");
        ui.horizontal(|ui| {
            ui.label("Demo set:");
            ui.selectable_value(&mut opts.demo_set, DemoSet::Sample, "sample");
            ui.selectable_value(&mut opts.demo_set, DemoSet::Full, "full");
        });
    });

    ui.add_space(8.0);
    let label = if app.running { "Collecting…" } else { "Collect" };
    if ui.add_enabled(!app.running, egui::Button::new(label)).clicked() {
        let ctx = ui.ctx().clone();
        actions::collect(app, &ctx);
    }
}
