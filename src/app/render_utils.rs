use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::data::NodeKind;

pub(super) const LABEL_ZOOM_THRESHOLD: f32 = 1.15;
pub(super) const CAPTION_ZOOM_THRESHOLD: f32 = 1.6;
pub(super) const LABEL_CHAR_BUDGET: usize = 22;
pub(super) const ARROW_SIZE: f32 = 7.0;

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Taxpayer => Color32::from_rgb(86, 156, 255),
        NodeKind::Invoice => Color32::from_rgb(255, 183, 77),
        NodeKind::Gstr1Return => Color32::from_rgb(129, 199, 132),
        NodeKind::Gstr2bReturn => Color32::from_rgb(77, 182, 172),
        NodeKind::Gstr3bReturn => Color32::from_rgb(186, 104, 200),
        NodeKind::User => Color32::from_rgb(229, 115, 115),
    }
}

pub(super) fn kind_radius(kind: NodeKind, is_center: bool) -> f32 {
    if is_center {
        return 22.0;
    }

    match kind {
        NodeKind::Taxpayer => 14.0,
        NodeKind::Invoice => 7.0,
        NodeKind::Gstr1Return | NodeKind::Gstr2bReturn | NodeKind::Gstr3bReturn => 10.0,
        NodeKind::User => 9.0,
    }
}

/// Label visibility is a pure function of (node, interaction, zoom):
/// high zoom shows everything, otherwise only taxpayers, the hub center,
/// and whatever the reference lights up.
pub(super) fn should_draw_label(
    kind: NodeKind,
    is_center: bool,
    is_match: bool,
    is_reference: bool,
    zoom: f32,
) -> bool {
    zoom > LABEL_ZOOM_THRESHOLD || kind.is_primary() || is_match || is_reference || is_center
}

pub(super) fn should_draw_caption(is_match: bool, zoom: f32) -> bool {
    is_match && zoom > CAPTION_ZOOM_THRESHOLD
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid_stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid_stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Triangle for the directional arrowhead: the tip sits on the target's
/// rim, the base a bit behind it along the link direction. Degenerate
/// (near-zero length) links get no arrow.
pub(super) fn arrowhead_points(
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    size: f32,
) -> Option<[Pos2; 3]> {
    let delta = end - start;
    let length = delta.length();
    if length < 0.001 {
        return None;
    }

    let direction = delta / length;
    let tip = end - direction * target_radius;
    let back = tip - direction * size;
    let perpendicular = Vec2::new(-direction.y, direction.x) * (size * 0.5);

    Some([tip, back + perpendicular, back - perpendicular])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_zoom_kind_and_emphasis() {
        assert!(should_draw_label(NodeKind::Taxpayer, false, false, false, 0.3));
        assert!(should_draw_label(NodeKind::Invoice, false, false, false, 1.5));
        assert!(should_draw_label(NodeKind::Invoice, false, true, false, 0.3));
        assert!(should_draw_label(NodeKind::Invoice, true, false, false, 0.3));
        assert!(!should_draw_label(NodeKind::Invoice, false, false, false, 0.3));
    }

    #[test]
    fn captions_require_both_zoom_and_match() {
        assert!(should_draw_caption(true, 2.0));
        assert!(!should_draw_caption(true, 1.0));
        assert!(!should_draw_caption(false, 2.0));
    }

    #[test]
    fn arrowhead_tip_is_inset_by_the_target_radius() {
        let start = Pos2::new(0.0, 0.0);
        let end = Pos2::new(100.0, 0.0);
        let [tip, left, right] = arrowhead_points(start, end, 10.0, 8.0).unwrap();

        assert!((tip.x - 90.0).abs() < 1.0e-4);
        assert!((tip.y).abs() < 1.0e-4);
        assert!((left.x - 82.0).abs() < 1.0e-4);
        assert_eq!(left.y, -right.y);

        assert!(arrowhead_points(start, start, 10.0, 8.0).is_none());
    }

    #[test]
    fn center_nodes_draw_larger_than_their_kind() {
        assert!(kind_radius(NodeKind::Taxpayer, true) > kind_radius(NodeKind::Taxpayer, false));
    }
}
