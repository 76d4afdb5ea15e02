/// Settings panel -- the "Data Sources" card with one toggle per setting.
use crate::state::AppState;
use egui::Ui;
use sourcedrop_core::settings::format_setting_name;

/// Width of one setting card in the grid.
const CARD_WIDTH: f32 = 240.0;

/// Draw the data-source toggles for the current device.
pub fn settings_panel(ui: &mut Ui, state: &mut AppState) {
    let color_muted = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();

    ui.label(
        egui::RichText::new(format!("Data Sources: {}", state.device_name))
            .size(16.0)
            .color(color_normal),
    );
    ui.add_space(4.0);

    let Some(settings) = &state.settings else {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Loading settings...").color(color_muted));
        });
        return;
    };

    // Collect first so toggling can borrow `state` mutably.
    let items: Vec<(&'static str, bool, String)> = settings
        .iter()
        .map(|(key, item)| (key, item.enabled, item.description.clone()))
        .collect();

    let columns = ((ui.available_width() / CARD_WIDTH).floor() as usize).max(1);
    let mut toggled = None;
    egui::Grid::new("settings_grid")
        .num_columns(columns)
        .spacing([8.0, 8.0])
        .show(ui, |ui| {
            for (i, (key, enabled, description)) in items.iter().enumerate() {
                let frame = egui::Frame::group(ui.style()).inner_margin(egui::Margin::symmetric(10, 6));
                frame.show(ui, |ui| {
                    ui.set_width(CARD_WIDTH - 28.0);
                    ui.horizontal(|ui| {
                        let title_color = if *enabled { color_normal } else { color_muted };
                        ui.label(
                            egui::RichText::new(format_setting_name(key))
                                .size(13.0)
                                .color(title_color),
                        )
                        .on_hover_text(description);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let mut checked = *enabled;
                            if ui.checkbox(&mut checked, "").clicked() {
                                toggled = Some(*key);
                            }
                        });
                    });
                });
                if (i + 1) % columns == 0 {
                    ui.end_row();
                }
            }
        });

    if let Some(key) = toggled {
        // Failures are recorded in `state.error` and shown in the status bar.
        let _ = state.toggle_setting(key);
    }
}
