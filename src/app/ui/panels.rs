use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, RichText};

use crate::case::CaseGraph;

use super::super::camera::Camera;
use super::super::graph::GraphFilter;
use super::super::intel::IntelState;
use super::super::render_utils::severity_color;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(case: CaseGraph) -> Self {
        Self {
            case,
            filter: GraphFilter::default(),
            search: String::new(),
            selected: None,
            flyto_acknowledged: None,
            camera: Camera::new(),
            drag_node: None,
            show_alerts: false,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            last_canvas_size: None,
            intel: IntelState::new(),
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        case_file: Option<&str>,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);
        self.intel.poll();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("caseviz");
                    ui.separator();
                    ui.label(RichText::new(self.case.name.as_str()).strong());
                    if let Some(path) = case_file {
                        ui.label(format!("file: {path}"));
                    }
                    ui.label(format!("entities: {}", self.case.node_count()));
                    ui.label(format!("relationships: {}", self.case.edge_count()));

                    let unread = self.case.unread_alert_count();
                    let bell_text = if unread > 0 {
                        format!("Alerts ({unread})")
                    } else {
                        "Alerts".to_owned()
                    };
                    if ui.selectable_label(self.show_alerts, bell_text).clicked() {
                        self.show_alerts = !self.show_alerts;
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload case"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if let Some(visible_text) = self.visible_graph_text() {
                            ui.label(visible_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("intel")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if self.show_alerts {
            self.draw_alert_window(ctx);
        }
    }

    fn draw_alert_window(&mut self, ctx: &Context) {
        let mut open = self.show_alerts;
        let mut mark_all_read = false;

        egui::Window::new("Alerts")
            .open(&mut open)
            .default_width(340.0)
            .show(ctx, |ui| {
                if self.case.alerts.is_empty() {
                    ui.label("No alerts in this case.");
                    return;
                }

                for alert in &self.case.alerts {
                    ui.horizontal(|ui| {
                        ui.colored_label(severity_color(alert.severity), "●")
                            .on_hover_text(alert.severity.label());
                        let title = if alert.read {
                            RichText::new(alert.title.as_str())
                        } else {
                            RichText::new(alert.title.as_str()).strong()
                        };
                        ui.label(title);
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.small(alert.timestamp.as_str());
                        });
                    });
                    ui.small(alert.description.as_str());
                    ui.add_space(6.0);
                }

                ui.separator();
                if ui.button("Mark all read").clicked() {
                    mark_all_read = true;
                }
            });

        if mark_all_read {
            for alert in &mut self.case.alerts {
                alert.read = true;
            }
        }
        self.show_alerts = open;
    }
}
