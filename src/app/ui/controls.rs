use eframe::egui::{self, RichText, Ui};

use crate::case::NodeType;

use super::super::graph::GraphFilter;
use super::super::render_utils::type_color;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Case Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.label("Search entities")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the rendered graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Matches entity labels and ids; click a highlighted node to select it.");

        ui.separator();
        ui.label(RichText::new("Entity types").strong());
        for (index, node_type) in NodeType::ALL.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.colored_label(type_color(*node_type), "●");
                changed |= ui
                    .checkbox(&mut self.filter.visible_types[index], node_type.label())
                    .changed();
            });
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Minimum risk score").strong());
        changed |= ui
            .add(egui::Slider::new(&mut self.filter.min_risk, 0.0..=100.0).integer())
            .on_hover_text("Hide entities below this risk score.")
            .changed();

        ui.add_space(6.0);
        if ui.button("Reset filters").clicked() {
            let default = GraphFilter::default();
            if self.filter != default {
                self.filter = default;
                changed = true;
            }
        }

        // Filter changes alter the snapshot identity; selection does not.
        if changed {
            self.graph_dirty = true;
        }

        ui.separator();
        ui.label(RichText::new("Selection").strong());
        match self.selected.clone() {
            Some(id) => {
                let label = self
                    .case
                    .node(&id)
                    .map(|node| node.label.clone())
                    .unwrap_or_else(|| id.clone());
                ui.label(label);
                if ui.button("Clear selection").clicked() {
                    self.set_selected(None);
                }
            }
            None => {
                ui.small("Click a node in the graph to select it.");
            }
        }

        ui.separator();
        ui.small(format!(
            "{} of {} entities rendered",
            self.visible_node_count,
            self.case.node_count()
        ));
    }
}
