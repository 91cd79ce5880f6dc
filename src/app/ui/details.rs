use eframe::egui::{self, RichText, Ui};

use crate::util::format_amount;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Entity Details");
        ui.add_space(6.0);

        let Some(reference) = self.interaction.reference() else {
            ui.label("Hover or select a node in the graph.");
            return;
        };
        let Some(node) = self.snapshot.nodes.get(reference) else {
            ui.label("Selection no longer exists in the current snapshot.");
            return;
        };

        let label = node.label.clone();
        let id = node.id.clone();
        let kind = node.kind;
        let is_center = node.is_center;
        let properties = node.properties.clone();
        let neighbor_indices = self.snapshot.neighbors(reference).to_vec();

        ui.label(RichText::new(label).strong());
        ui.small(id);
        ui.label(format!("Kind: {}", kind.label()));
        if is_center {
            ui.label("Hub center of the current view");
        }

        if !properties.is_empty() {
            ui.separator();
            ui.label(RichText::new("Properties").strong());
            for (key, value) in &properties {
                let rendered = match key.as_str() {
                    "taxable_value" | "total_value" | "volume" => value
                        .parse::<f64>()
                        .map(format_amount)
                        .unwrap_or_else(|_| value.clone()),
                    _ => value.clone(),
                };
                ui.label(format!("{key}: {rendered}"));
            }
        }

        ui.separator();
        ui.label(RichText::new("Directly related").strong());
        if neighbor_indices.is_empty() {
            ui.label("No relationships in this snapshot.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("related_entities_scroll")
            .max_height(320.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for &neighbor in &neighbor_indices {
                    let Some(other) = self.snapshot.nodes.get(neighbor) else {
                        continue;
                    };
                    let row = format!("{}  ({})", other.label, other.kind.label());
                    if ui.link(row).on_hover_text(other.id.as_str()).clicked() {
                        clicked = Some(neighbor);
                    }
                }
            });

        if let Some(neighbor) = clicked {
            let focus = self.interaction.click_node(neighbor, &self.snapshot);
            if let Some(request) = focus {
                self.request_hub_focus(request.entity_id);
            }
        }
    }
}
