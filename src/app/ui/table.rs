use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::format_amount;

use super::super::ViewModel;
use super::super::filter::{SortColumn, TradeRow, sort_rows, trade_rows};

const TABLE_COLUMNS: [SortColumn; 4] = [
    SortColumn::Supplier,
    SortColumn::Buyer,
    SortColumn::Volume,
    SortColumn::Frequency,
];

impl ViewModel {
    pub(in crate::app) fn draw_trade_table(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Direct trade relationships");
            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.table_filter)
                    .hint_text("filter by name")
                    .desired_width(180.0),
            );
        });
        ui.add_space(4.0);

        let mut rows = trade_rows(&self.snapshot);
        let filter_text = self.table_filter.trim();
        if !filter_text.is_empty() {
            let matcher = SkimMatcherV2::default();
            rows.retain(|row| {
                matcher.fuzzy_match(&row.supplier_label, filter_text).is_some()
                    || matcher.fuzzy_match(&row.buyer_label, filter_text).is_some()
            });
        }
        sort_rows(&mut rows, self.table_sort);

        ui.horizontal(|ui| {
            for column in TABLE_COLUMNS {
                let active = self.table_sort.column == column;
                let marker = if !active {
                    ""
                } else if self.table_sort.descending {
                    " v"
                } else {
                    " ^"
                };
                let text = RichText::new(format!("{}{marker}", column.label()));
                let text = if active { text.strong() } else { text };
                if ui.button(text).clicked() {
                    self.table_sort.click(column);
                }
            }
            ui.separator();
            ui.label(format!("{} rows", rows.len()));
        });

        if rows.is_empty() {
            ui.label("No taxpayer-to-taxpayer relationships in this snapshot.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("trade_table_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 20.0, rows.len(), |ui, row_range| {
                for index in row_range {
                    let Some(row) = rows.get(index) else {
                        continue;
                    };
                    Self::draw_trade_row(ui, row);
                }
            });
    }

    fn draw_trade_row(ui: &mut Ui, row: &TradeRow) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} -> {}",
                row.supplier_label, row.buyer_label
            ))
            .on_hover_text(format!("{} -> {}", row.supplier_id, row.buyer_id));
            ui.separator();
            ui.label(row.kind.caption());
            ui.separator();
            ui.label(format_amount(row.volume));
            ui.separator();
            ui.label(format!("{}x", row.frequency));
        });
    }
}
