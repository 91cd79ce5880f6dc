use eframe::egui::{self, RichText, Ui};

use crate::data::NodeKind;

use super::super::ViewModel;
use super::super::render_utils::kind_color;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(4.0);

        let counts = NodeKind::ALL.map(|kind| {
            self.snapshot
                .nodes
                .iter()
                .filter(|node| node.kind == kind)
                .count()
        });

        for (kind, count) in NodeKind::ALL.into_iter().zip(counts) {
            let mut checked = self.type_filter.is_visible(kind);
            let label = RichText::new(format!("{} ({count})", kind.label()))
                .color(kind_color(kind));
            if ui.checkbox(&mut checked, label).changed() {
                self.toggle_kind(kind);
            }
        }
        if self.type_filter.visible_kind_count() == 1 {
            ui.small("at least one kind stays visible");
        }

        ui.separator();
        ui.checkbox(&mut self.show_table, "Show trade table");

        ui.separator();
        ui.heading("Simulation");
        ui.add_space(4.0);

        let params = &mut self.layout.params;
        ui.add(
            egui::Slider::new(&mut params.repulsion, 400.0..=9_000.0)
                .text("repulsion")
                .logarithmic(true),
        );
        ui.add(egui::Slider::new(&mut params.link_distance, 30.0..=240.0).text("link distance"));
        ui.add(
            egui::Slider::new(&mut params.link_strength, 0.004..=0.12)
                .text("link strength")
                .logarithmic(true),
        );
        ui.add(
            egui::Slider::new(&mut params.center_pull, 0.0..=0.01)
                .text("center pull")
                .logarithmic(false),
        );

        ui.separator();
        self.draw_cycle_alerts(ui);
    }

    fn draw_cycle_alerts(&mut self, ui: &mut Ui) {
        let title = if self.cycles.is_empty() {
            "Circular trades".to_owned()
        } else {
            format!("Circular trades ({})", self.cycles.len())
        };

        egui::CollapsingHeader::new(RichText::new(title).strong())
            .default_open(!self.cycles.is_empty())
            .show(ui, |ui| {
                if ui.button("Rescan").clicked() {
                    self.request_cycle_scan();
                }

                if self.cycles.is_empty() {
                    ui.label("No circular trading chains detected.");
                    return;
                }

                egui::ScrollArea::vertical()
                    .id_salt("cycle_alert_scroll")
                    .max_height(220.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        for alert in &self.cycles {
                            let chain = if alert.names.is_empty() {
                                alert.cycle.join(" -> ")
                            } else {
                                alert.names.join(" -> ")
                            };
                            ui.label(format!("[{}] {chain}", alert.cycle_length));
                        }
                    });
            });
    }
}
