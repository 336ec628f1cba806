use eframe::egui::{self, Color32, RichText, Stroke, Ui, vec2};
use serde_json::Value;

use crate::util::humanize_key;

use super::super::render_utils::{risk_color, type_color};
use super::super::ViewModel;

fn detail_value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl ViewModel {
    fn draw_risk_bar(ui: &mut Ui, risk_score: f32) {
        ui.horizontal(|ui| {
            ui.label("Risk score");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!("{risk_score:.0}/100"))
                        .strong()
                        .color(risk_color(risk_score)),
                );
            });
        });

        let (rect, _response) =
            ui.allocate_exact_size(vec2(ui.available_width(), 8.0), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 3.0, Color32::from_rgb(30, 41, 59));

        let fill_width = rect.width() * (risk_score / 100.0).clamp(0.0, 1.0);
        if fill_width > 0.5 {
            let fill = egui::Rect::from_min_size(rect.min, vec2(fill_width, rect.height()));
            painter.rect_filled(fill, 3.0, risk_color(risk_score));
        }
        painter.rect_stroke(
            rect,
            3.0,
            Stroke::new(1.0, Color32::from_rgb(51, 65, 85)),
            egui::StrokeKind::Inside,
        );
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Intelligence Panel");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a node in the graph to view intelligence.");
            self.draw_report(ui);
            return;
        };

        // Selection resolves against the host-owned case data, never the
        // simulation's working copy.
        let Some(node) = self.case.node(&selected_id) else {
            ui.label("Selected entity no longer exists in the case.");
            return;
        };

        let label = node.label.clone();
        let node_type = node.node_type;
        let risk_score = node.risk_score;
        let detail_rows: Vec<(String, String)> = node
            .details
            .iter()
            .map(|(key, value)| (humanize_key(key), detail_value_text(value)))
            .collect();
        let relationship_rows: Vec<(String, String, String, bool)> = self
            .case
            .relationships_of(&selected_id)
            .into_iter()
            .map(|(neighbor, relation, outgoing)| {
                (
                    neighbor.id.clone(),
                    neighbor.label.clone(),
                    relation.to_owned(),
                    outgoing,
                )
            })
            .collect();

        ui.horizontal(|ui| {
            ui.colored_label(type_color(node_type), "●");
            ui.label(RichText::new(label).strong());
        });
        ui.small(format!("{}  ·  {}", selected_id, node_type.label()));
        ui.add_space(8.0);

        Self::draw_risk_bar(ui, risk_score);
        ui.add_space(8.0);

        if detail_rows.is_empty() {
            ui.small("No recorded details for this entity.");
        } else {
            for (key, value) in &detail_rows {
                ui.small(RichText::new(key.to_uppercase()).color(Color32::from_gray(130)));
                ui.label(RichText::new(value.as_str()).monospace());
                ui.add_space(2.0);
            }
        }

        ui.separator();
        ui.label(RichText::new("Relationships").strong());
        if relationship_rows.is_empty() {
            ui.small("No recorded relationships.");
        } else {
            for (neighbor_id, neighbor_label, relation, outgoing) in &relationship_rows {
                let arrow = if *outgoing { "→" } else { "←" };
                let row = format!("{arrow} {relation}  {neighbor_label}");
                if ui.link(row).on_hover_text(neighbor_id.as_str()).clicked() {
                    self.set_selected(Some(neighbor_id.clone()));
                }
            }
        }

        ui.separator();
        if self.intel.running() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing network...");
            });
        } else if ui.button("Run network analysis").clicked() {
            self.intel.start(self.case.clone());
        }

        self.draw_report(ui);
    }

    fn draw_report(&self, ui: &mut Ui) {
        let Some(report) = self.intel.report() else {
            return;
        };

        ui.add_space(8.0);
        ui.label(RichText::new("Network type").small().color(Color32::from_gray(130)));
        ui.label(RichText::new(report.network_type.as_str()).strong());

        ui.add_space(6.0);
        ui.label(RichText::new("Summary").small().color(Color32::from_gray(130)));
        ui.label(report.summary.as_str());

        if !report.key_suspects.is_empty() {
            ui.add_space(6.0);
            ui.label(RichText::new("Key suspects").small().color(Color32::from_gray(130)));
            for suspect in &report.key_suspects {
                ui.label(format!("• {suspect}"));
            }
        }

        if !report.recommended_actions.is_empty() {
            ui.add_space(6.0);
            ui.label(
                RichText::new("Recommended actions").small().color(Color32::from_gray(130)),
            );
            for action in &report.recommended_actions {
                ui.label(format!("• {action}"));
            }
        }

        ui.add_space(4.0);
        ui.small(format!("Generated at {}", report.generated_at));
    }
}
