use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::case::{NodeType, Severity};

/// Fixed display color per entity type (the legend mapping).
pub(super) fn type_color(node_type: NodeType) -> Color32 {
    match node_type {
        NodeType::Suspect => Color32::from_rgb(244, 63, 94),
        NodeType::Device => Color32::from_rgb(251, 191, 36),
        NodeType::Sim => Color32::from_rgb(56, 189, 248),
        NodeType::BankAccount => Color32::from_rgb(16, 185, 129),
        NodeType::IpAddress => Color32::from_rgb(168, 85, 247),
        NodeType::Location => Color32::from_rgb(100, 116, 139),
    }
}

pub(super) fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Low => Color32::from_rgb(100, 116, 139),
        Severity::Medium => Color32::from_rgb(56, 189, 248),
        Severity::High => Color32::from_rgb(249, 115, 22),
        Severity::Critical => Color32::from_rgb(244, 63, 94),
    }
}

/// Yellow-to-rose ramp for risk scores in [0, 100].
pub(super) fn risk_color(risk_score: f32) -> Color32 {
    let t = (risk_score / 100.0).clamp(0.0, 1.0);
    blend_color(
        Color32::from_rgb(250, 204, 21),
        Color32::from_rgb(244, 63, 94),
        t,
    )
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
    painter.rect_filled(rect, 0.0, Color32::from_rgb(8, 13, 23));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(40, 55, 75, 60));

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
