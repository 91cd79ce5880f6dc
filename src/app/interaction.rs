use eframe::egui::{Pos2, Rect, Vec2};

use crate::data::GraphSnapshot;

/// Pointer-driven hover/selection state. Hover is transient and always
/// wins the reference; leaving a node falls back to whatever was selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    hovered: Option<usize>,
    selected: Option<usize>,
}

/// Side effect of a node click: a neighborhood fetch the controller should
/// issue without blocking the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubFocusRequest {
    pub entity_id: String,
}

impl InteractionState {
    pub fn reference(&self) -> Option<usize> {
        self.hovered.or(self.selected)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn pointer_enter(&mut self, node: usize) {
        self.hovered = Some(node);
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    pub fn click_node(
        &mut self,
        node: usize,
        snapshot: &GraphSnapshot,
    ) -> Option<HubFocusRequest> {
        self.selected = Some(node);

        let clicked = snapshot.nodes.get(node)?;
        if clicked.kind.is_primary() && !clicked.is_center {
            Some(HubFocusRequest {
                entity_id: clicked.id.clone(),
            })
        } else {
            None
        }
    }

    pub fn click_background(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    /// A fresh snapshot invalidates node indices wholesale.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 6.0;

    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Wheel zoom anchored at the pointer so the world point under the
    /// cursor stays put.
    pub fn zoom_about(&mut self, rect: Rect, pointer: Pos2, scroll: f32) {
        let world_before = self.screen_to_world(rect, pointer);
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Stepwise zoom anchored at the viewport center, for the +/- camera
    /// commands.
    pub fn zoom_step(&mut self, factor: f32) {
        let before = self.zoom;
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan *= self.zoom / before;
    }

    pub fn fit_bounds(&mut self, rect: Rect, bounds: (Vec2, Vec2)) {
        const MARGIN: f32 = 80.0;

        let (min, max) = bounds;
        let size = max - min;
        let zoom_x = rect.width() / (size.x + MARGIN);
        let zoom_y = rect.height() / (size.y + MARGIN);
        self.zoom = zoom_x.min(zoom_y).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);

        let world_center = min + size * 0.5;
        self.pan = -world_center * self.zoom;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NodeKind;
    use crate::data::test_support::node;
    use eframe::egui::vec2;

    fn snapshot() -> GraphSnapshot {
        let mut hub = node("hub", NodeKind::Taxpayer);
        hub.is_center = true;
        GraphSnapshot::new(
            vec![
                node("t1", NodeKind::Taxpayer),
                node("i1", NodeKind::Invoice),
                hub,
            ],
            vec![],
        )
    }

    #[test]
    fn hover_takes_precedence_and_falls_back_to_selection() {
        let snapshot = snapshot();
        let mut state = InteractionState::default();

        state.click_node(0, &snapshot);
        assert_eq!(state.reference(), Some(0));

        state.pointer_enter(1);
        assert_eq!(state.reference(), Some(1));

        state.pointer_leave();
        assert_eq!(state.reference(), Some(0));
    }

    #[test]
    fn background_click_returns_to_idle_from_any_state() {
        let snapshot = snapshot();
        let mut state = InteractionState::default();

        state.click_node(0, &snapshot);
        state.pointer_enter(1);
        state.click_background();

        assert_eq!(state.reference(), None);
        assert_eq!(state.selected(), None);
        assert_eq!(state.hovered(), None);
    }

    #[test]
    fn clicking_a_primary_non_center_node_requests_hub_focus() {
        let snapshot = snapshot();
        let mut state = InteractionState::default();

        let request = state.click_node(0, &snapshot);
        assert_eq!(
            request.map(|r| r.entity_id),
            Some("t1".to_owned())
        );

        assert!(state.click_node(1, &snapshot).is_none(), "invoices never focus");
        let center = snapshot.index_by_id["hub"];
        assert!(
            state.click_node(center, &snapshot).is_none(),
            "the center is already the hub"
        );
    }

    #[test]
    fn zoom_about_keeps_the_anchor_point_fixed() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let mut camera = Camera::default();
        let pointer = Pos2::new(200.0, 150.0);
        let world_before = camera.screen_to_world(rect, pointer);

        camera.zoom_about(rect, pointer, 60.0);

        let world_after = camera.screen_to_world(rect, pointer);
        assert!((world_after - world_before).length() < 1.0e-3);
        assert!(camera.zoom > 1.0);
    }

    #[test]
    fn fit_bounds_centers_the_layout() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let mut camera = Camera::default();
        camera.fit_bounds(rect, (vec2(-200.0, -100.0), vec2(400.0, 300.0)));

        let screen = camera.world_to_screen(rect, vec2(100.0, 100.0));
        assert!((screen - rect.center()).length() < 1.0e-3);
    }
}
