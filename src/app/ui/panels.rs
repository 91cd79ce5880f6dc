use eframe::egui::{self, Align, Context, Key, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("taxgraph");
                    ui.separator();

                    let search_box = ui.add(
                        egui::TextEdit::singleline(&mut self.search_input)
                            .hint_text("search gstin / name / invoice")
                            .desired_width(220.0),
                    );
                    let submitted = search_box.lost_focus()
                        && ui.input(|input| input.key_pressed(Key::Enter));
                    if ui.button("Search").clicked() || submitted {
                        self.request_search();
                    }
                    if ui.button("Reset").clicked() {
                        self.search_input.clear();
                        self.request_full_load();
                    }

                    ui.separator();
                    if ui.button("+").clicked() {
                        self.camera.zoom_step(1.25);
                    }
                    if ui.button("-").clicked() {
                        self.camera.zoom_step(0.8);
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_camera_pending = true;
                    }
                    if ui.button("Reset view").clicked() {
                        self.camera.reset();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.is_loading() {
                            ui.spinner();
                        }
                        if let Some(status) = &self.status_line {
                            ui.colored_label(
                                egui::Color32::from_rgb(229, 115, 115),
                                status.as_str(),
                            );
                        }
                        if self.layout.hub_mode() {
                            ui.label("hub view");
                            ui.separator();
                        }
                        ui.label(format!(
                            "{} nodes / {} links",
                            self.snapshot.node_count(),
                            self.snapshot.link_count()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_details(ui));

        if self.show_table {
            egui::TopBottomPanel::bottom("trade_table")
                .resizable(true)
                .default_height(240.0)
                .show(ctx, |ui| self.draw_trade_table(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.has_loaded_once {
                if self.is_loading() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading trade network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Could not reach the graph backend");
                        if let Some(status) = &self.status_line {
                            ui.add_space(6.0);
                            ui.label(status.as_str());
                        }
                        ui.add_space(10.0);
                        if ui.button("Retry").clicked() {
                            self.request_full_load();
                        }
                    });
                }
            } else if self.snapshot.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("No entities matched this query");
                    ui.add_space(6.0);
                    ui.label("Try a broader search, or reset to the default sample.");
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
