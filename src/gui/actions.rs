// src/gui/actions.rs
use std::path::PathBuf;
use std::thread;

use chrono::Local;
use eframe::egui;

use crate::{
    config::options::ExportOptions,
    file,
    gui::{app::App, progress::GuiProgress},
    runner,
};

/// Run a collection on a worker thread with its own runtime.
/// The result lands in `app.pending`; `App::update` picks it up.
pub fn collect(app: &mut App, ctx: &egui::Context) {
    if app.running {
        return;
    }
    let categories = app.state.gui.categories();
    if categories.is_empty() {
        app.status("Select at least one category");
        return;
    }
    app.state.options.collect.categories = categories;
    app.running = true;

    let options = app.state.options.collect.clone();
    let status = app.status.clone();
    let slot = app.pending.clone();
    let ctx = ctx.clone();

    logf!("Collect: begin categories={:?}", options.categories);
    thread::spawn(move || {
        let mut prog = GuiProgress::new(status, ctx.clone());
        let rt = match runner::runtime() {
            Ok(rt) => rt,
            Err(e) => {
                loge!("Collect: {e}");
                if let Ok(mut s) = slot.lock() {
                    *s = Some(Err(e.to_string()));
                }
                ctx.request_repaint();
                return;
            }
        };
        let result = rt.block_on(runner::collect(&options, Some(&mut prog)));
        if let Ok(mut s) = slot.lock() {
            *s = Some(Ok(result));
        }
        ctx.request_repaint();
    });
}

/// Mirror the export bar text fields into export options.
pub fn sync_export_fields(app: &mut App) -> ExportOptions {
    let gui = &app.state.gui;
    let export = &mut app.state.options.export;
    export.out_dir = PathBuf::from(gui.out_dir_text.trim());
    export.label = gui.label_text.trim().to_string();
    export.clone()
}

pub fn export_csv(app: &mut App) {
    let export = sync_export_fields(app);
    let Some(result) = &app.result else {
        app.status("Nothing to export yet");
        return;
    };
    match file::write_export(result, &export, Local::now().date_naive()) {
        Ok(path) => {
            logf!("Export: wrote {}", path.display());
            app.status(format!("Saved {} records → {}", result.len(), path.display()));
            app.last_export = Some(path);
        }
        Err(e) => {
            loge!("Export: {e}");
            app.status(format!("Export failed: {e}"));
        }
    }
}
