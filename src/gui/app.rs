// src/gui/app.rs
use std::{
    error::Error,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use eframe::egui;

use crate::{
    collect::CollectionResult,
    config::state::AppState,
    model::BidRecord,
    store,
};

/// Hangul-capable system fonts, first match wins.
const CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    r"C:\Windows\Fonts\malgun.ttf",
];

fn install_cjk_font(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONTS
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|b| (*p, b)))
    else {
        logw!("UI: no Hangul font found; Korean text will not render");
        return;
    };
    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(s!("cjk"), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(s!("cjk"));
    }
    ctx.set_fonts(fonts);
    logd!("UI: font {path}");
}

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "G2B bid collector",
        options,
        Box::new(|cc| {
            install_cjk_font(&cc.egui_ctx);
            Ok(Box::new(App::new(AppState::default())))
        }),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    // last finished collection (or the reloaded cache)
    pub result: Option<CollectionResult>,
    pub last_export: Option<PathBuf>,

    // status/progress (worker writes here)
    pub status: Arc<Mutex<String>>,
    pub running: bool,

    // worker → UI hand-off; taken on the next frame
    pub pending: Arc<Mutex<Option<Result<CollectionResult, String>>>>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        let (result, status) = match store::load_cached() {
            Ok(Some(r)) => {
                logf!("Cache: loaded {} records", r.len());
                let msg = format!("Loaded {} cached records", r.len());
                (Some(r), msg)
            }
            Ok(None) => (None, s!("Idle")),
            Err(e) => {
                loge!("Cache: unreadable: {e}");
                (None, s!("Idle (cache unreadable)"))
            }
        };

        Self {
            state,
            result,
            last_export: None,
            status: Arc::new(Mutex::new(status)),
            running: false,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }

    pub fn status_text(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Records passing the search box and category filter.
    pub fn visible_records(&self) -> Vec<&BidRecord> {
        let Some(result) = &self.result else { return Vec::new() };
        let needle = self.state.gui.search.trim().to_lowercase();
        let cat = self.state.gui.category_filter;
        result
            .records()
            .iter()
            .filter(|r| cat.is_none_or(|c| r.category == c))
            .filter(|r| {
                needle.is_empty()
                    || r.id.to_lowercase().contains(&needle)
                    || r.title.to_lowercase().contains(&needle)
                    || r.institution.as_deref().is_some_and(|i| i.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Pick up a finished worker result, if any.
    fn poll_worker(&mut self) {
        let Some(done) = self.pending.lock().ok().and_then(|mut slot| slot.take()) else {
            return;
        };
        self.running = false;
        match done {
            Err(e) => self.status(format!("Error: {e}")),
            Ok(result) => {
                logf!("Collect: finished with {} records", result.len());
                if let Err(e) = store::save_result(&result) {
                    loge!("Cache: save failed: {e}");
                }
                self.status(format!("Collected {} records ({})", result.len(), result.acquisition_method()));
                self.result = Some(result);
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();

        egui::SidePanel::left("controls")
            .resizable(false)
            .show(ctx, |ui| {
                crate::gui::components::category_panel::draw(ui, self);
                ui.separator();
                crate::gui::components::stats_panel::draw(ui, self);
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.running {
                    ui.spinner();
                }
                ui.label(self.status_text());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            crate::gui::components::export_bar::draw(ui, self);
            ui.separator();
            crate::gui::components::bid_table::draw(ui, self);
        });
    }
}
