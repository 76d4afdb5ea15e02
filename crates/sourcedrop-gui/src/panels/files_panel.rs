/// Files & folders panel -- drop zone plus the current Selection.
use crate::state::AppState;
use crate::widgets;
use egui::Ui;

/// What the user asked for this frame that needs the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesAction {
    PickFiles,
    PickFolders,
}

/// Draw the panel. Returns a picker request, if any.
pub fn files_panel(ui: &mut Ui, state: &mut AppState) -> Option<FilesAction> {
    let mut action = None;
    let enabled = !state.is_ingesting();

    ui.label(
        egui::RichText::new("Select files and folders to add to SOURCE")
            .size(13.0)
            .color(ui.visuals().text_color()),
    );
    ui.add_space(4.0);

    if widgets::drop_zone::drop_zone(ui, &state.drop_zone, enabled) {
        action = Some(FilesAction::PickFiles);
    }
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(enabled, egui::Button::new("\u{1f4c1} Add folder..."))
            .on_hover_text("Pick whole folders to add")
            .clicked()
        {
            action = Some(FilesAction::PickFolders);
        }
        if !state.skipped_paths.is_empty() {
            ui.label(
                egui::RichText::new(format!("{} path(s) could not be read", state.skipped_paths.len()))
                    .size(12.0)
                    .color(egui::Color32::from_rgb(0xfa, 0xb3, 0x87)),
            )
            .on_hover_text(state.skipped_paths.join("\n"));
        }
    });

    if !state.selection().is_empty() {
        ui.add_space(12.0);
        ui.label(
            egui::RichText::new("Selected Files:")
                .size(13.0)
                .color(ui.visuals().text_color()),
        );
        ui.add_space(4.0);
        if let Some(index) = widgets::selection_table::selection_table(ui, state.selection()) {
            state.remove_entry(index);
        }
    }

    action
}
