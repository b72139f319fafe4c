// src/gui/components/bid_table.rs
//
// Read-only view of the filtered records.

use eframe::egui::{self, Align, Layout};
use egui_extras::{Column, TableBuilder};

use crate::gui::app::App;
use crate::model::BidRecord;

const HEADERS: [&str; 8] = ["ID", "Title", "Institution", "Category", "Method", "Published", "Deadline", "Source"];

fn cells(r: &BidRecord) -> [String; 8] {
    let dt = |d: &chrono::NaiveDateTime| d.format("%Y-%m-%d %H:%M").to_string();
    [
        r.id.clone(),
        r.title.clone(),
        r.institution.clone().unwrap_or_default(),
        r.category.local_name().to_string(),
        r.contract_method.label().to_string(),
        dt(&r.published),
        r.deadline.as_ref().map(dt).unwrap_or_default(),
        r.source.label().to_string(),
    ]
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let rows: Vec<[String; 8]> = app.visible_records().into_iter().map(cells).collect();
    let total = app.result.as_ref().map_or(0, |r| r.len());
    ui.label(format!("{} of {} records", rows.len(), total));

    if rows.is_empty() {
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::initial(150.0).clip(true))
        .column(Column::initial(360.0).at_least(120.0).clip(true))
        .column(Column::initial(160.0).clip(true))
        .column(Column::initial(60.0))
        .column(Column::initial(140.0).clip(true))
        .column(Column::initial(120.0))
        .column(Column::initial(120.0))
        .column(Column::remainder())
        .min_scrolled_height(0.0)
        .header(22.0, |mut header| {
            for h in HEADERS {
                header.col(|ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let r = &rows[row.index()];
                for cell in r {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
