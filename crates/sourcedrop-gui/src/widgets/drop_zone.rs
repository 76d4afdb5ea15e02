/// Drop zone -- the clickable target for drag-and-drop and the file picker.
use crate::state::DropZone;
use egui::{Align2, Color32, FontId, Stroke, Ui, Vec2};

/// Height of the drop target in points.
const DROP_ZONE_HEIGHT: f32 = 200.0;

/// Draw the drop zone. Returns `true` when it was clicked (open the picker).
pub fn drop_zone(ui: &mut Ui, zone: &DropZone, enabled: bool) -> bool {
    let width = ui.available_width();
    let sense = if enabled {
        egui::Sense::click()
    } else {
        egui::Sense::hover()
    };
    let (rect, response) = ui.allocate_exact_size(Vec2::new(width, DROP_ZONE_HEIGHT), sense);
    let painter = ui.painter_at(rect);

    let highlighted = zone.is_armed() || (enabled && response.hovered());
    let (fill, border, text) = if highlighted {
        (
            Color32::from_rgb(0x2a, 0x2a, 0x3c),
            ui.visuals().strong_text_color(),
            ui.visuals().strong_text_color(),
        )
    } else {
        (
            Color32::from_rgb(0x1a, 0x1a, 0x26),
            Color32::from_rgb(0x6c, 0x70, 0x86),
            ui.visuals().weak_text_color(),
        )
    };

    painter.rect_filled(rect, 8.0, fill);
    // Dashed border, one side at a time.
    let stroke = Stroke::new(2.0, border);
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    for side in corners.windows(2) {
        painter.extend(egui::Shape::dashed_line(side, stroke, 8.0, 6.0));
    }

    let label = if enabled {
        zone.text()
    } else {
        "Ingesting..."
    };
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(15.0),
        text,
    );

    if enabled {
        response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked()
    } else {
        false
    }
}
