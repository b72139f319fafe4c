// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use eframe::egui::ViewportBuilder;
use g2b_collect::config::state::GuiState;
use g2b_collect::{gui, log};

fn main() {
    if let Err(e) = log::init_file(false) {
        eprintln!("debug log unavailable: {e}");
    }

    let defaults = GuiState::default();
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([defaults.window_w as f32, defaults.window_h as f32])
            .with_title("G2B bid collector"),
        ..Default::default()
    };

    if let Err(e) = gui::run(options) {
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
