use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::camera::{Camera, FLY_TO_SECONDS, FLY_TO_ZOOM};
use super::super::physics::step_simulation;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, risk_color, type_color,
};
use super::super::{RenderGraph, SearchMatchCache, ViewModel};

const EDGE_COLOR: Color32 = Color32::from_rgb(51, 65, 85);
const EDGE_INCIDENT_COLOR: Color32 = Color32::from_rgb(56, 189, 248);
const SELECTED_STROKE_COLOR: Color32 = Color32::WHITE;
const NODE_STROKE_COLOR: Color32 = Color32::from_rgb(30, 41, 59);
const LABEL_COLOR: Color32 = Color32::from_rgb(226, 232, 240);

impl ViewModel {
    fn update_screen_space(rect: Rect, camera: &Camera, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.screen_positions.reserve(cache.nodes.len());
        scratch.screen_radii.reserve(cache.nodes.len());

        let zoom = camera.zoom_level();
        for node in &cache.nodes {
            scratch
                .screen_positions
                .push(camera.world_to_screen(rect, node.world_pos));
            scratch.screen_radii.push(node.radius * zoom);
        }

        scratch.visible_indices.clear();
        for index in 0..cache.nodes.len() {
            if circle_visible(
                rect,
                scratch.screen_positions[index],
                scratch.screen_radii[index],
            ) {
                scratch.visible_indices.push(index);
            }
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let hit = matcher.fuzzy_match(&node.label, query).is_some()
                    || matcher.fuzzy_match(&node.id, query).is_some();
                hit.then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Starts a camera flight when the selection has changed to a node
    /// with a computed position. A selection made before the simulation
    /// has taken its first step, or of a node outside the rendered set,
    /// skips the flight silently.
    fn maybe_fly_to_selection(&mut self) {
        if self.flyto_acknowledged == self.selected {
            return;
        }
        self.flyto_acknowledged = self.selected.clone();

        let Some(id) = self.selected.as_deref() else {
            return;
        };
        let Some(cache) = self.graph_cache.as_ref() else {
            return;
        };
        if !cache.clock.has_stepped() {
            return;
        }
        let Some(&index) = cache.index_by_id.get(id) else {
            return;
        };

        let target = cache.nodes[index].world_pos;
        if !(target.x.is_finite() && target.y.is_finite()) {
            return;
        }
        self.camera.fly_to(target, FLY_TO_ZOOM, FLY_TO_SECONDS);
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() < 1.0 || rect.height() < 1.0 {
            // Transient zero-dimension state while panels settle.
            return;
        }

        // A real canvas size change restarts the engine on a fresh
        // working copy, same as a snapshot identity change.
        let size = rect.size();
        if self
            .last_canvas_size
            .is_none_or(|previous| (previous - size).length() > 0.5)
        {
            self.graph_dirty |= self.last_canvas_size.is_some();
            self.last_canvas_size = Some(size);
        }
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        // Interactions hit-test against the screen space of the previous
        // draw, which is what the user is pointing at.
        let hovered = self
            .graph_cache
            .as_ref()
            .and_then(|cache| Self::hovered_node(ui, cache));
        let hovered_index = hovered.map(|(index, _distance)| index);

        self.handle_canvas_zoom(ui, rect, &response);
        self.update_node_drag(rect, &response, hovered_index);
        self.handle_canvas_pan(&response);
        self.apply_click_selection(&response, hovered_index);
        self.maybe_fly_to_selection();

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let flying = self.camera.tick(dt);

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.camera.pan(), self.camera.zoom_level());

        let selected_id = self.selected.clone();
        let camera = &self.camera;
        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No entities match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(140),
            );
            if flying {
                ui.ctx().request_repaint();
            }
            return;
        };

        let moving = step_simulation(cache);

        Self::update_screen_space(rect, camera, cache);
        self.visible_node_count = cache.view_scratch.visible_indices.len();
        self.visible_edge_count = cache.edges.len();

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let zoom = camera.zoom_level();
        let selected_index = selected_id
            .as_deref()
            .and_then(|id| cache.index_by_id.get(id).copied());

        for edge in &cache.edges {
            let start = cache.view_scratch.screen_positions[edge.source];
            let end = cache.view_scratch.screen_positions[edge.target];

            let incident =
                selected_index == Some(edge.source) || selected_index == Some(edge.target);
            let width = (edge.strength.max(0.05).sqrt() * 2.0 * zoom).clamp(0.4, 8.0);
            let (width, color) = if incident {
                (
                    width.max(1.4),
                    Color32::from_rgba_unmultiplied(
                        EDGE_INCIDENT_COLOR.r(),
                        EDGE_INCIDENT_COLOR.g(),
                        EDGE_INCIDENT_COLOR.b(),
                        220,
                    ),
                )
            } else if selected_index.is_some() || search_active {
                (
                    width,
                    Color32::from_rgba_unmultiplied(EDGE_COLOR.r(), EDGE_COLOR.g(), EDGE_COLOR.b(), 90),
                )
            } else {
                (
                    width,
                    Color32::from_rgba_unmultiplied(EDGE_COLOR.r(), EDGE_COLOR.g(), EDGE_COLOR.b(), 150),
                )
            };

            painter.line_segment([start, end], Stroke::new(width, color));

            if incident && zoom > 0.8 {
                let midpoint = start + (end - start) * 0.5;
                painter.text(
                    midpoint,
                    Align2::CENTER_CENTER,
                    &edge.relation,
                    FontId::proportional(9.5),
                    Color32::from_gray(170),
                );
            }
        }

        let label_font = FontId::proportional(11.0);
        for index in cache.view_scratch.visible_indices.iter().copied() {
            let node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_index == Some(index);
            let is_hovered = hovered_index == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = type_color(node.node_type);
            let fill = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.25)
            } else if search_active && !is_match {
                dim_color(base_color, 0.35)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("entity-selection", node.id.as_str())),
                is_selected,
            );

            // Soft glow behind the disc, echoing the type color.
            painter.circle_filled(
                position,
                radius + 3.0,
                Color32::from_rgba_unmultiplied(fill.r(), fill.g(), fill.b(), 40),
            );
            painter.circle_filled(position, radius, fill);

            let stroke_color = blend_color(NODE_STROKE_COLOR, SELECTED_STROKE_COLOR, selection_mix);
            let stroke_width = 1.5 + (selection_mix * 1.5) + if is_match { 0.8 } else { 0.0 };
            painter.circle_stroke(position, radius, Stroke::new(stroke_width, stroke_color));

            // High-risk entities carry a persistent warning ring.
            if node.risk_score >= 80.0 {
                let ring = risk_color(node.risk_score);
                painter.circle_stroke(
                    position,
                    radius + 2.5,
                    Stroke::new(
                        1.0,
                        Color32::from_rgba_unmultiplied(ring.r(), ring.g(), ring.b(), 150),
                    ),
                );
            }

            if selection_mix > 0.0 {
                let halo_alpha = (40.0 + selection_mix * 110.0) as u8;
                painter.circle_stroke(
                    position,
                    radius + 4.0 + ((1.0 - selection_mix) * 5.0),
                    Stroke::new(
                        1.2,
                        Color32::from_rgba_unmultiplied(255, 255, 255, halo_alpha),
                    ),
                );
            }

            let show_label = zoom > 0.45 || is_selected || is_hovered || is_match;
            if show_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    label_font.clone(),
                    if search_active && !is_match {
                        Color32::from_gray(110)
                    } else {
                        LABEL_COLOR
                    },
                );
            }
        }

        if let Some((hover_at, _distance)) = hovered
            && let Some(render_node) = cache.nodes.get(hover_at)
            && let Some(entity) = self.case.node(&render_node.id)
        {
            let summary = format!(
                "{}  |  {}  |  risk {:.0}  |  {} link(s)",
                entity.label,
                entity.node_type.label(),
                entity.risk_score,
                self.case.degree(&entity.id)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                summary,
                FontId::proportional(13.0),
                Color32::from_gray(235),
            );
        }

        if moving || flying || response.dragged() || self.drag_node.is_some() {
            ui.ctx().request_repaint();
        }
    }
}
