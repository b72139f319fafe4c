// src/gui/progress.rs
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::model::{Category, SourceKind};
use crate::progress::Progress;

/// Writes status lines into the shared label and wakes the UI thread.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    ctx: egui::Context,
    done: usize,
    total: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>, ctx: egui::Context) -> Self {
        Self { status, ctx, done: 0, total: 0 }
    }
    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
        self.ctx.request_repaint();
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.set_status(format!("Collecting {total} categories…"));
    }
    fn log(&mut self, msg: &str) {
        self.set_status(s!(msg));
    }
    fn item_done(&mut self, category: Category, method: Option<SourceKind>) {
        self.done += 1;
        let via = method.map_or("nothing", |m| m.label());
        self.set_status(format!("{} via {} ({}/{})", category, via, self.done, self.total));
    }
    fn finish(&mut self) {
        if self.total == 0 {
            self.set_status(s!("Collection complete"));
        } else {
            self.set_status(format!("Collection complete ({}/{})", self.done, self.total));
        }
    }
}
