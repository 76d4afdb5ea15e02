/// Selection table -- the accepted root entries with a Remove button each.
use crate::widgets::size_bar::{percent_of, size_bar};
use egui::Ui;
use egui_extras::{Column, TableBuilder};
use sourcedrop_core::model::size::format_size;
use sourcedrop_core::model::TreeNode;

const ROW_HEIGHT: f32 = 24.0;

/// Draw the Selection. Returns the index whose Remove button was clicked.
pub fn selection_table(ui: &mut Ui, selection: &[TreeNode]) -> Option<usize> {
    let total: u64 = selection.iter().map(TreeNode::total_size).sum();
    let mut remove = None;

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(200.0).clip(true))
        .column(Column::exact(90.0))
        .column(Column::exact(160.0))
        .column(Column::exact(150.0))
        .column(Column::exact(80.0))
        .header(ROW_HEIGHT, |mut header| {
            header.col(|ui| {
                ui.strong("Name");
            });
            header.col(|ui| {
                ui.strong("Type");
            });
            header.col(|ui| {
                ui.strong("Size");
            });
            header.col(|ui| {
                ui.strong("Modified");
            });
            header.col(|_| {});
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, selection.len(), |mut row| {
                let index = row.index();
                let node = &selection[index];
                let details = node.details.as_ref();

                row.col(|ui| {
                    let icon = if node.is_dir() { "\u{1f4c1}" } else { "\u{1f4c4}" };
                    let label = ui.label(format!("{icon} {}", node.name));
                    let hover = match node.warning() {
                        Some(warning) => format!("{}\n\u{26a0} {warning}", node.path),
                        None => node.path.clone(),
                    };
                    label.on_hover_text(hover);
                });
                row.col(|ui| {
                    let item_type = details.map(|d| d.item_type.as_str()).unwrap_or("-");
                    ui.label(item_type);
                });
                row.col(|ui| {
                    let size = node.total_size();
                    size_bar(ui, percent_of(size, total), 50.0, 8.0);
                    ui.label(format_size(size));
                });
                row.col(|ui| {
                    ui.label(
                        egui::RichText::new(
                            node.last_modified
                                .with_timezone(&chrono::Local)
                                .format("%Y-%m-%d %H:%M")
                                .to_string(),
                        )
                        .color(ui.visuals().weak_text_color()),
                    );
                });
                row.col(|ui| {
                    let button = egui::Button::new(
                        egui::RichText::new("Remove").color(egui::Color32::from_rgb(0xf3, 0x8b, 0xa8)),
                    );
                    if ui.add(button).clicked() {
                        remove = Some(index);
                    }
                });
            });
        });

    remove
}
