mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::RenderGraph;
use forces::{accumulate_collisions, accumulate_repulsion, separation_direction};
use quadtree::QuadCell;

pub(in crate::app) const LINK_DISTANCE: f32 = 100.0;
pub(in crate::app) const COLLIDE_RADIUS: f32 = 30.0;

const REPULSION_STRENGTH: f32 = 400.0;
const BARNES_HUT_THETA: f32 = 0.72;
const COLLISION_STRENGTH: f32 = 0.7;
const CENTER_STRENGTH: f32 = 0.08;
const VELOCITY_RETAIN: f32 = 0.6;
const MAX_SPEED: f32 = 40.0;

const ALPHA_MIN: f32 = 0.001;
const ALPHA_RELAX_STEPS: f32 = 300.0;
const DRAG_ALPHA_TARGET: f32 = 0.3;

/// Simulation temperature. Alpha relaxes toward `alpha_target` each step;
/// once both sit below `ALPHA_MIN` the layout is settled and no further
/// steps run until something reheats it.
pub(in crate::app) struct SimulationClock {
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    steps: u64,
}

impl SimulationClock {
    pub(in crate::app) fn new() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / ALPHA_RELAX_STEPS),
            steps: 0,
        }
    }

    /// Restart after a snapshot or dimension change: full reheat, but the
    /// step counter keeps running so carried-over positions stay "known".
    pub(in crate::app) fn restart(&mut self) {
        self.alpha = 1.0;
    }

    /// Drag perturbation: hold the temperature at a mid level.
    pub(in crate::app) fn reheat(&mut self) {
        self.alpha_target = DRAG_ALPHA_TARGET;
    }

    /// Drag released: let the temperature decay back to zero.
    pub(in crate::app) fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub(in crate::app) fn is_active(&self) -> bool {
        self.alpha >= ALPHA_MIN || self.alpha_target >= ALPHA_MIN
    }

    pub(in crate::app) fn has_stepped(&self) -> bool {
        self.steps > 0
    }

    fn advance(&mut self) -> f32 {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.steps += 1;
        self.alpha
    }
}

/// One discrete simulation step: link springs, Barnes-Hut repulsion and
/// collision separation accumulate into per-node forces, free nodes
/// integrate, pinned nodes snap back to their pin, and the layout centroid
/// drifts toward the origin. Returns whether another step should follow.
pub(in crate::app) fn step_simulation(cache: &mut RenderGraph) -> bool {
    let node_count = cache.nodes.len();
    if node_count == 0 || !cache.clock.is_active() {
        return false;
    }

    let alpha = cache.clock.advance();

    let scratch = &mut cache.physics_scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.reserve(node_count);
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;

    if let Some(tree) = QuadCell::build(positions) {
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion(
                &tree,
                index,
                positions,
                REPULSION_STRENGTH * alpha,
                BARNES_HUT_THETA,
                force,
            );
        }
        for index in 0..node_count {
            accumulate_collisions(
                &tree,
                index,
                positions,
                COLLIDE_RADIUS,
                COLLISION_STRENGTH,
                forces,
            );
        }
    }

    for edge in &cache.edges {
        let (source, target) = (edge.source, edge.target);
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let source_degree = cache.degrees[source].max(1) as f32;
        let target_degree = cache.degrees[target].max(1) as f32;

        let delta = (cache.nodes[target].world_pos + cache.nodes[target].velocity)
            - (cache.nodes[source].world_pos + cache.nodes[source].velocity);
        let length = delta.length();
        let direction = separation_direction(delta, source + target);
        let stretch = length - LINK_DISTANCE;

        // Weaker springs between highly-connected nodes, and the lighter
        // endpoint absorbs more of the correction.
        let strength = edge.strength / source_degree.min(target_degree);
        let correction = direction * (stretch * strength * alpha);
        let target_share = source_degree / (source_degree + target_degree);

        forces[target] -= correction * target_share;
        forces[source] += correction * (1.0 - target_share);
    }

    let mut any_motion = false;
    for (index, node) in cache.nodes.iter_mut().enumerate() {
        if let Some(pin) = node.pinned {
            node.velocity = Vec2::ZERO;
            node.world_pos = pin;
            continue;
        }

        let mut velocity = (node.velocity + forces[index]) * VELOCITY_RETAIN;
        let speed_sq = velocity.length_sq();
        if speed_sq > MAX_SPEED * MAX_SPEED {
            velocity *= MAX_SPEED / speed_sq.sqrt();
        }

        node.velocity = velocity;
        node.world_pos += velocity;
        if velocity.length_sq() > 1e-4 {
            any_motion = true;
        }
    }

    let mut centroid = Vec2::ZERO;
    for node in &cache.nodes {
        centroid += node.world_pos;
    }
    centroid /= node_count as f32;
    if centroid.length_sq() > 1e-4 {
        let shift = centroid * CENTER_STRENGTH;
        for node in &mut cache.nodes {
            if node.pinned.is_none() {
                node.world_pos -= shift;
            }
        }
    }

    any_motion || cache.clock.is_active()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::graph::{GraphFilter, assemble_render_graph};
    use super::*;
    use crate::case::sample_case;

    fn settled_graph() -> RenderGraph {
        let case = sample_case();
        let mut cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        while step_simulation(&mut cache) {}
        cache
    }

    #[test]
    fn simulation_settles_and_suspends() {
        let case = sample_case();
        let mut cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();

        let mut steps = 0u32;
        while step_simulation(&mut cache) {
            steps += 1;
            assert!(steps < 2_000, "simulation never cooled");
        }

        assert!(!cache.clock.is_active());
        // Idle engine takes no further steps.
        let before = cache.clock.steps;
        assert!(!step_simulation(&mut cache));
        assert_eq!(cache.clock.steps, before);
    }

    #[test]
    fn reheat_resumes_a_settled_simulation() {
        let mut cache = settled_graph();
        assert!(!step_simulation(&mut cache));

        cache.clock.reheat();
        assert!(step_simulation(&mut cache));

        cache.clock.cool();
        let mut steps = 0u32;
        while step_simulation(&mut cache) {
            steps += 1;
            assert!(steps < 2_000, "simulation never re-cooled");
        }
    }

    #[test]
    fn pinned_node_follows_pin_exactly_and_unpins_cleanly() {
        let case = sample_case();
        let mut cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();

        let pin = vec2(42.0, -17.0);
        cache.nodes[0].pinned = Some(pin);
        cache.clock.reheat();

        for _ in 0..40 {
            step_simulation(&mut cache);
            assert_eq!(cache.nodes[0].world_pos, pin);
            assert_eq!(cache.nodes[0].velocity, Vec2::ZERO);
        }

        cache.nodes[0].pinned = None;
        cache.clock.cool();
        for _ in 0..40 {
            step_simulation(&mut cache);
        }
        assert_ne!(cache.nodes[0].world_pos, pin, "released node should rejoin the simulation");
    }

    #[test]
    fn simulation_only_mutates_kinematic_fields() {
        let case = sample_case();
        let mut cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        let before: Vec<_> = cache
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.label.clone(), node.node_type, node.risk_score))
            .collect();

        while step_simulation(&mut cache) {}

        for (node, (id, label, node_type, risk_score)) in cache.nodes.iter().zip(before) {
            assert_eq!(node.id, id);
            assert_eq!(node.label, label);
            assert_eq!(node.node_type, node_type);
            assert_eq!(node.risk_score, risk_score);
            assert!((0.0..=100.0).contains(&node.risk_score));
        }
    }

    #[test]
    fn settled_layout_respects_collision_separation() {
        let cache = settled_graph();
        for a in 0..cache.nodes.len() {
            for b in (a + 1)..cache.nodes.len() {
                let distance = (cache.nodes[a].world_pos - cache.nodes[b].world_pos).length();
                assert!(
                    distance > COLLIDE_RADIUS,
                    "nodes {a} and {b} settled only {distance} apart"
                );
            }
        }
    }

    #[test]
    fn step_writes_each_position_exactly_once() {
        let case = sample_case();
        let mut cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        let node_count = cache.nodes.len();

        step_simulation(&mut cache);

        // The force buffer is sized to the node set: one accumulated force
        // and one integration per node per step, never a multiple.
        assert_eq!(cache.physics_scratch.forces.len(), node_count);
        assert_eq!(cache.physics_scratch.positions.len(), node_count);
    }
}
