use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use crate::util::truncate_label;

use super::ViewModel;
use super::filter::{visible_links, visible_nodes};
use super::highlight::build_match_set;
use super::layout::TickOutcome;
use super::render_utils::{
    ARROW_SIZE, LABEL_CHAR_BUDGET, arrowhead_points, blend_color, circle_visible, dim_color,
    draw_background, kind_color, kind_radius, segment_visible, should_draw_caption,
    should_draw_label,
};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.camera.pan, self.camera.zoom);

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = ui
                    .input(|input| input.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                self.camera.zoom_about(rect, pointer, scroll);
            }
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }

        match self.layout.tick(&mut self.snapshot) {
            TickOutcome::Moving => {
                ui.ctx().request_repaint();
            }
            TickOutcome::Settled => {
                self.fit_camera_pending = true;
                ui.ctx().request_repaint();
            }
            TickOutcome::Idle => {}
        }

        if self.fit_camera_pending {
            if let Some(bounds) = self.snapshot.bounds() {
                self.camera.fit_bounds(rect, bounds);
            }
            self.fit_camera_pending = false;
        }

        let shown_nodes = visible_nodes(&self.snapshot, &self.type_filter);
        let shown_links = visible_links(&self.snapshot, &self.type_filter);

        let zoom = self.camera.zoom;
        let screen_positions = self
            .snapshot
            .nodes
            .iter()
            .map(|node| self.camera.world_to_screen(rect, node.pos))
            .collect::<Vec<_>>();
        let screen_radii = self
            .snapshot
            .nodes
            .iter()
            .map(|node| (kind_radius(node.kind, node.is_center) * zoom.powf(0.40)).clamp(2.5, 46.0))
            .collect::<Vec<_>>();

        let hovered = Self::hovered_index(
            ui,
            &response,
            &shown_nodes,
            &screen_positions,
            &screen_radii,
        );
        match hovered {
            Some(index) => self.interaction.pointer_enter(index),
            None => self.interaction.pointer_leave(),
        }

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            match hovered {
                Some(index) => {
                    let focus = self.interaction.click_node(index, &self.snapshot);
                    if let Some(request) = focus {
                        self.request_hub_focus(request.entity_id);
                    }
                }
                None => self.interaction.click_background(),
            }
        }

        let matches = self
            .interaction
            .reference()
            .map(|reference| build_match_set(&self.snapshot, reference));
        let zoom_sqrt = zoom.sqrt();

        for &link_index in &shown_links {
            let link = &self.snapshot.links[link_index];
            let start = screen_positions[link.source];
            let end = screen_positions[link.target];
            if !segment_visible(rect, start, end, 2.5) {
                continue;
            }

            let is_match = matches
                .as_ref()
                .is_some_and(|set| set.contains_link(link_index));

            let (line_width, line_color) = if is_match {
                (
                    (2.5 * zoom_sqrt).clamp(1.2, 4.4),
                    Color32::from_rgb(241, 146, 94),
                )
            } else if matches.is_some() {
                (
                    (0.82 * zoom_sqrt).clamp(0.45, 2.0),
                    Color32::from_rgba_unmultiplied(80, 90, 104, 130),
                )
            } else {
                (
                    (1.18 * zoom_sqrt).clamp(0.6, 3.4),
                    Color32::from_rgba_unmultiplied(116, 124, 136, 185),
                )
            };

            painter.line_segment([start, end], Stroke::new(line_width, line_color));

            let arrow_size = (ARROW_SIZE * zoom_sqrt).clamp(4.0, 12.0);
            if let Some(points) =
                arrowhead_points(start, end, screen_radii[link.target], arrow_size)
            {
                painter.add(egui::Shape::convex_polygon(
                    points.to_vec(),
                    line_color,
                    Stroke::NONE,
                ));
            }

            if should_draw_caption(is_match, zoom) {
                let midpoint = start + (end - start) * 0.5;
                painter.text(
                    midpoint + vec2(0.0, -6.0),
                    Align2::CENTER_BOTTOM,
                    link.kind.caption(),
                    FontId::proportional(11.0),
                    Color32::from_gray(210),
                );
            }
        }

        let selected_ring = Color32::from_rgb(245, 206, 93);
        let reference_ring = Color32::from_gray(235);

        for &index in &shown_nodes {
            let node = &self.snapshot.nodes[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_reference = self.interaction.reference() == Some(index);
            let is_selected = self.interaction.selected() == Some(index);
            let is_match = matches
                .as_ref()
                .is_some_and(|set| set.contains_node(index));

            let base_color = kind_color(node.kind);
            let fill = if is_reference {
                blend_color(base_color, Color32::WHITE, 0.22)
            } else if matches.is_some() && !is_match {
                dim_color(base_color, 0.45)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            if is_reference || is_selected {
                let ring_color = if is_selected {
                    selected_ring
                } else {
                    reference_ring
                };
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.0, ring_color));
            }

            if should_draw_label(node.kind, node.is_center, is_match, is_reference, zoom) {
                let label_color = if matches.is_some() && !is_match && !is_reference {
                    Color32::from_rgba_unmultiplied(238, 238, 238, 110)
                } else {
                    Color32::from_gray(238)
                };
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    truncate_label(&node.label, LABEL_CHAR_BUDGET),
                    FontId::proportional(12.0),
                    label_color,
                );
            }
        }

        if let Some(index) = self.interaction.hovered() {
            let node = &self.snapshot.nodes[index];
            let overlay = format!(
                "{}  |  {}  |  {} relations",
                node.label,
                node.kind.label(),
                self.snapshot.neighbors(index).len()
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                overlay,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }

    fn hovered_index(
        ui: &Ui,
        response: &egui::Response,
        shown_nodes: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        if !response.hovered() {
            return None;
        }

        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        shown_nodes
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                if distance <= screen_radii[index] {
                    Some((index, distance))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
