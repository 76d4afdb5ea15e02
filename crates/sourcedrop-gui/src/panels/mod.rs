/// Panels composed by the main window.

pub mod files_panel;
pub mod settings_panel;
