use eframe::egui::{self, Rect, Ui, Vec2};

use super::super::{RenderGraph, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.camera.zoom_at(rect, pointer, factor);
    }

    /// Background pan: primary drag that did not start on a node, or any
    /// secondary/middle drag.
    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        let background_primary =
            response.dragged_by(egui::PointerButton::Primary) && self.drag_node.is_none();
        if background_primary
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }
    }

    /// Node under the pointer, hit-tested against the screen-space state
    /// of the most recent draw (what the user is actually pointing at).
    pub(in crate::app) fn hovered_node(ui: &Ui, cache: &RenderGraph) -> Option<(usize, f32)> {
        let scratch = &cache.view_scratch;
        if scratch.screen_positions.len() != cache.nodes.len() {
            return None;
        }

        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        scratch
            .visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = scratch.screen_positions[index].distance(pointer);
                (distance <= scratch.screen_radii[index].max(4.0)).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Drag lifecycle for a grabbed node: pin at the pointer's world
    /// position every frame and hold the simulation warm; release clears
    /// the pin and lets the layout cool. The node is tracked by id so a
    /// rebuild mid-drag cannot redirect the drag to another node.
    pub(in crate::app) fn update_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let Some(cache) = self.graph_cache.as_mut() else {
            self.drag_node = None;
            return;
        };

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
            && let Some(node) = cache.nodes.get(index)
        {
            self.drag_node = Some(node.id.clone());
        }

        let Some(drag_id) = self.drag_node.clone() else {
            return;
        };
        let Some(&index) = cache.index_by_id.get(&drag_id) else {
            self.drag_node = None;
            return;
        };

        if response.dragged_by(egui::PointerButton::Primary)
            || response.drag_started_by(egui::PointerButton::Primary)
        {
            if let Some(pointer) = response.interact_pointer_pos() {
                let world = self.camera.screen_to_world(rect, pointer);
                cache.nodes[index].pinned = Some(world);
                cache.nodes[index].world_pos = world;
                cache.nodes[index].velocity = Vec2::ZERO;
                cache.clock.reheat();
            }
        }

        if response.drag_stopped() {
            cache.nodes[index].pinned = None;
            cache.clock.cool();
            self.drag_node = None;
        }
    }

    /// Click selection. egui reports `clicked` only when the press never
    /// crossed its drag threshold, so a press-and-release with near-zero
    /// movement selects instead of dragging. The id is resolved against
    /// the host-owned case data, never the simulation copy.
    pub(in crate::app) fn apply_click_selection(
        &mut self,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }

        let clicked_id = hovered.and_then(|index| {
            self.graph_cache
                .as_ref()
                .and_then(|cache| cache.nodes.get(index))
                .and_then(|render_node| self.case.node(&render_node.id))
                .map(|entity| entity.id.clone())
        });

        if let Some(id) = clicked_id {
            self.set_selected(Some(id));
        }
    }

    /// Selection changes never touch the render graph; the simulation
    /// keeps running (or stays settled) exactly as it was.
    pub(in crate::app) fn set_selected(&mut self, id: Option<String>) {
        self.selected = id;
    }
}
