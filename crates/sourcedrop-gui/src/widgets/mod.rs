/// UI widgets for SourceDrop.

pub mod drop_zone;
pub mod section_tabs;
pub mod selection_table;
pub mod size_bar;
pub mod status_bar;
