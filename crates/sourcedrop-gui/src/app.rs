/// Main `eframe::App` implementation for SourceDrop.
///
/// This is the top-level UI layout that composes all panels and widgets,
/// and the only place that reads raw window input. Hovered files, dropped
/// files, focus changes and picker results are turned into
/// [`DropZoneEvent`]s here and handed to [`AppState`].
use crate::panels;
use crate::panels::files_panel::FilesAction;
use crate::state::{AppState, DropZoneEvent};
use crate::widgets;
use sourcedrop_core::config::IngestConfig;
use sourcedrop_core::settings::{SettingsStore, FILES_AND_FOLDERS};
use std::path::PathBuf;

/// Pre-built application state.
///
/// Construct this **before** calling `eframe::run_native` so that the
/// settings fetch completes before the OS window is created.
pub struct SourceDropState {
    pub(crate) inner: AppState,
}

impl SourceDropState {
    /// Create the state and load this device's settings.
    pub fn build(config: IngestConfig, store: Box<dyn SettingsStore>) -> Self {
        let mut state = AppState::new(config, store);
        state.load_settings();
        Self { inner: state }
    }
}

/// The SourceDrop application.
pub struct SourceDropApp {
    state: AppState,
    /// Picker requested last frame. Opened one frame later so the armed
    /// drop-zone text is painted before the native dialog blocks.
    pending_picker: Option<FilesAction>,
}

impl SourceDropApp {
    /// Create a new application instance from pre-built state.
    pub fn with_state(cc: &eframe::CreationContext<'_>, state: SourceDropState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            state: state.inner,
            pending_picker: None,
        }
    }

    /// Translate this frame's raw drag/drop/focus input into drop-zone events.
    fn handle_window_input(&mut self, ctx: &egui::Context) {
        let (hovering, dropped, focus_regained) = ctx.input(|i| {
            let dropped: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect();
            let focus_regained = i
                .events
                .iter()
                .any(|e| matches!(e, egui::Event::WindowFocused(true)));
            (!i.raw.hovered_files.is_empty(), dropped, focus_regained)
        });

        // Dropping is only meaningful while the files section is shown.
        let accepting = self.state.drop_zone_visible() && !self.state.is_ingesting();

        let mut events = Vec::new();
        if focus_regained {
            events.push(DropZoneEvent::FocusRegained);
        }
        if !dropped.is_empty() {
            if accepting {
                events.push(DropZoneEvent::Drop(dropped));
            } else {
                tracing::info!("Ignoring {} dropped path(s): drop zone not available", dropped.len());
                events.push(DropZoneEvent::DragLeave);
            }
        } else if hovering && accepting && !self.state.drop_zone.drag_active {
            events.push(DropZoneEvent::DragEnter);
        } else if !hovering && self.state.drop_zone.drag_active {
            events.push(DropZoneEvent::DragLeave);
        }

        for event in events {
            // Failures are recorded in `state.error`.
            let _ = self.state.handle_drop_zone_event(event);
        }
    }

    /// Run the native picker requested on the previous frame.
    fn run_pending_picker(&mut self) {
        let Some(kind) = self.pending_picker.take() else {
            return;
        };
        let dialog = rfd::FileDialog::new().set_title("Add files from device");
        let picked = match kind {
            FilesAction::PickFiles => dialog.pick_files(),
            FilesAction::PickFolders => dialog.pick_folders(),
        };
        let paths = picked.unwrap_or_default();
        let _ = self
            .state
            .handle_drop_zone_event(DropZoneEvent::PickerClosed(paths));
    }
}

impl eframe::App for SourceDropApp {
    /// Override the GPU clear colour to match the active theme background,
    /// preventing a colour mismatch flash between frames.
    fn clear_color(&self, visuals: &egui::Visuals) -> [f32; 4] {
        let [r, g, b, a] = visuals.panel_fill.to_array();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_pending_picker();

        // ── Process background messages ───────────────────────────────────
        self.state.process_messages();
        if self.state.is_ingesting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.handle_window_input(ctx);

        // ── Top bar ───────────────────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .min_height(36.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("SourceDrop")
                            .size(18.0)
                            .strong()
                            .color(ui.visuals().hyperlink_color),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new("Device Settings")
                            .size(14.0)
                            .color(ui.visuals().text_color()),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("\u{2139} About").clicked() {
                            self.state.show_about = true;
                        }
                        if !self.state.settings_loaded() && ui.button("\u{1f504} Retry").clicked() {
                            self.state.load_settings();
                        }
                    });
                });
                ui.add_space(4.0);
            });

        // ── About dialog ──────────────────────────────────────────────────
        let mut show_about = self.state.show_about;
        egui::Window::new("About SourceDrop")
            .open(&mut show_about)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([320.0, 0.0])
            .show(ctx, |ui| {
                let muted = ui.visuals().weak_text_color();
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new("SourceDrop")
                            .size(22.0)
                            .strong()
                            .color(ui.visuals().hyperlink_color),
                    );
                    ui.label(
                        egui::RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                            .size(13.0)
                            .color(muted),
                    );
                    ui.add_space(8.0);
                    ui.label("Pick the data sources this device shares,\nthen drop files and folders to add them.");
                    ui.add_space(8.0);
                });
            });
        self.state.show_about = show_about;

        // ── Bottom status bar ─────────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state);
                ui.add_space(2.0);
            });

        // ── Central panel ─────────────────────────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                panels::settings_panel::settings_panel(ui, &mut self.state);
                ui.add_space(16.0);
                ui.separator();
                ui.add_space(8.0);
                widgets::section_tabs::section_tabs(ui, &mut self.state);
                ui.add_space(8.0);

                match self.state.active_tab {
                    Some(FILES_AND_FOLDERS) => {
                        if let Some(action) = panels::files_panel::files_panel(ui, &mut self.state) {
                            let _ = self
                                .state
                                .handle_drop_zone_event(DropZoneEvent::PickerOpened);
                            self.pending_picker = Some(action);
                            ctx.request_repaint();
                        }
                    }
                    Some(section) => {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} is enabled for this device.",
                                sourcedrop_core::settings::format_setting_name(section)
                            ))
                            .color(ui.visuals().weak_text_color()),
                        );
                    }
                    None => {}
                }
            });
        });
    }
}
