/// Bottom status bar -- ingestion progress and the last round's outcome.
use crate::state::AppState;
use egui::Ui;
use sourcedrop_core::model::size::format_size;
use sourcedrop_core::model::TreeNode;

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    let color_accent = ui.visuals().hyperlink_color;
    let color_weak = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();
    let color_warning = egui::Color32::from_rgb(0xfa, 0xb3, 0x87);
    let color_error = egui::Color32::from_rgb(0xf3, 0x8b, 0xa8);

    ui.horizontal(|ui| {
        if state.is_ingesting() {
            ui.spinner();
            ui.label(
                egui::RichText::new("Ingesting...")
                    .size(12.0)
                    .color(color_normal),
            );
        } else {
            ui.label(egui::RichText::new("Ready").size(12.0).color(color_weak));
        }

        let selection = state.selection();
        if !selection.is_empty() {
            ui.separator();
            let files: u64 = selection.iter().map(TreeNode::file_count).sum();
            let bytes: u64 = selection.iter().map(TreeNode::total_size).sum();
            ui.label(
                egui::RichText::new(format!("{} item(s), {files} file(s)", selection.len()))
                    .size(12.0)
                    .color(color_normal),
            );
            ui.separator();
            ui.label(
                egui::RichText::new(format_size(bytes))
                    .size(12.0)
                    .color(color_accent),
            );
        }

        if let Some(duration) = state.session.last_duration() {
            ui.separator();
            ui.label(
                egui::RichText::new(format!("{:.1}s", duration.as_secs_f64()))
                    .size(12.0)
                    .color(color_weak),
            );
        }

        let duplicates = state.session.last_duplicates();
        if !duplicates.is_empty() {
            ui.separator();
            ui.label(
                egui::RichText::new(format!("{} already selected", duplicates.len()))
                    .size(12.0)
                    .color(color_weak),
            )
            .on_hover_text(duplicates.join("\n"));
        }

        let warnings = state.session.last_warnings();
        if !warnings.is_empty() {
            ui.separator();
            let detail = warnings
                .iter()
                .map(|w| format!("{}: {}", w.path, w.message))
                .collect::<Vec<_>>()
                .join("\n");
            ui.label(
                egui::RichText::new(format!("{} unreadable", warnings.len()))
                    .size(12.0)
                    .color(color_warning),
            )
            .on_hover_text(detail);
        }

        if let Some(error) = &state.error {
            ui.separator();
            ui.label(
                egui::RichText::new(truncate(error, 80))
                    .size(12.0)
                    .color(color_error),
            )
            .on_hover_text(error);
        }
    });
}

/// Truncate to `max_chars` characters, appending "..." when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{keep}...")
}
