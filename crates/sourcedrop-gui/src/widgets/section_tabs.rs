/// Section tabs -- one tab per enabled data-source setting.
use crate::state::AppState;
use sourcedrop_core::settings::format_setting_name;
use egui::Ui;

/// Draw the tab strip. Nothing is drawn when no section is enabled.
pub fn section_tabs(ui: &mut Ui, state: &mut AppState) {
    let tabs = state.visible_tabs();
    if tabs.is_empty() {
        ui.label(
            egui::RichText::new("Enable a data source above to see its section.")
                .size(12.0)
                .color(ui.visuals().weak_text_color()),
        );
        return;
    }

    let mut clicked = None;
    ui.horizontal(|ui| {
        for key in &tabs {
            let selected = state.active_tab == Some(*key);
            let text = egui::RichText::new(format_setting_name(key)).size(15.0);
            if ui.selectable_label(selected, text).clicked() {
                clicked = Some(*key);
            }
            ui.add_space(12.0);
        }
    });
    if let Some(key) = clicked {
        state.select_tab(key);
    }
}
