use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::case::{CaseGraph, EntityNode, NodeType};
use crate::util::stable_pair;

use super::super::physics::{LINK_DISTANCE, SimulationClock};
use super::super::{PhysicsScratch, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch};

const SUSPECT_RADIUS: f32 = 15.0;
const ENTITY_RADIUS: f32 = 10.0;

/// Which entities make it into the rendered graph. Changing any filter
/// field changes the snapshot identity and warrants a rebuild; selection
/// is deliberately not part of this.
#[derive(Clone, PartialEq)]
pub(in crate::app) struct GraphFilter {
    pub(in crate::app) visible_types: [bool; NodeType::ALL.len()],
    pub(in crate::app) min_risk: f32,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            visible_types: [true; NodeType::ALL.len()],
            min_risk: 0.0,
        }
    }
}

pub(in crate::app) fn type_index(node_type: NodeType) -> usize {
    NodeType::ALL
        .iter()
        .position(|candidate| *candidate == node_type)
        .unwrap_or(0)
}

impl GraphFilter {
    pub(in crate::app) fn allows(&self, node: &EntityNode) -> bool {
        self.visible_types[type_index(node.node_type)] && node.risk_score >= self.min_risk
    }
}

fn display_radius(node_type: NodeType) -> f32 {
    if node_type == NodeType::Suspect {
        SUSPECT_RADIUS
    } else {
        ENTITY_RADIUS
    }
}

/// Deterministic entry kinematics so a node always appears at the same
/// spot across rebuilds and runs.
fn seed_position(id: &str, index: usize) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let raw = vec2(jx, jy);
    let direction = if raw.length_sq() > 1e-4 {
        raw.normalized()
    } else {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };

    let ring = 0.35 + raw.length().clamp(0.0, 1.0);
    direction * (LINK_DISTANCE * ring)
}

/// Builds the private working copy the simulation owns: deep-copies the
/// display fields of every node the filter admits, resolves edge
/// endpoints to indices (bare id or embedded object), and drops edges
/// whose endpoints are absent, so a filtered subgraph never shows a
/// dangling line. Kinematics of surviving nodes carry over from `prior`
/// so rebuilds restart the physics without visually resetting the layout.
pub(in crate::app) fn assemble_render_graph(
    case: &CaseGraph,
    filter: &GraphFilter,
    prior: Option<RenderGraph>,
) -> Option<RenderGraph> {
    let kept: Vec<&EntityNode> = case.nodes.iter().filter(|node| filter.allows(node)).collect();
    if kept.is_empty() {
        return None;
    }

    let mut index_by_id = HashMap::with_capacity(kept.len());
    for (index, node) in kept.iter().enumerate() {
        index_by_id.insert(node.id.clone(), index);
    }

    let mut edges = Vec::with_capacity(case.edges.len());
    let mut dropped = 0usize;
    for edge in &case.edges {
        let source = index_by_id.get(edge.source.id()).copied();
        let target = index_by_id.get(edge.target.id()).copied();
        match (source, target) {
            (Some(source), Some(target)) if source != target => {
                edges.push(RenderEdge {
                    source,
                    target,
                    relation: edge.relation.clone(),
                    strength: edge.strength.clamp(0.0, 1.0),
                });
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} edge(s) with endpoints outside the rendered set");
    }

    let mut degrees = vec![0u32; kept.len()];
    for edge in &edges {
        degrees[edge.source] += 1;
        degrees[edge.target] += 1;
    }

    let (mut prior_nodes, clock, physics_scratch, view_scratch) = match prior {
        Some(prior) => {
            let mut clock = prior.clock;
            clock.restart();
            // Screen-space state refers to the old index space.
            let mut view_scratch = prior.view_scratch;
            view_scratch.screen_positions.clear();
            view_scratch.screen_radii.clear();
            view_scratch.visible_indices.clear();
            let carried: HashMap<String, RenderNode> = prior
                .nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect();
            (carried, clock, prior.physics_scratch, view_scratch)
        }
        None => (
            HashMap::new(),
            SimulationClock::new(),
            PhysicsScratch::default(),
            ViewScratch::default(),
        ),
    };

    let nodes = kept
        .iter()
        .enumerate()
        .map(|(index, entity)| {
            let (world_pos, velocity, pinned) = match prior_nodes.remove(&entity.id) {
                Some(prior_node) => (prior_node.world_pos, prior_node.velocity, prior_node.pinned),
                None => (seed_position(&entity.id, index), Vec2::ZERO, None),
            };

            RenderNode {
                id: entity.id.clone(),
                label: entity.label.clone(),
                node_type: entity.node_type,
                risk_score: entity.risk_score,
                world_pos,
                velocity,
                pinned,
                radius: display_radius(entity.node_type),
            }
        })
        .collect();

    Some(RenderGraph {
        nodes,
        edges,
        degrees,
        index_by_id,
        clock,
        physics_scratch,
        view_scratch,
    })
}

impl ViewModel {
    /// Replaces the working copy. Taking the prior cache first guarantees
    /// a single live simulation even across rapid consecutive rebuilds.
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        let prior = self.graph_cache.take();
        self.graph_cache = assemble_render_graph(&self.case, &self.filter, prior);
        self.graph_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::case::{EdgeEndpoint, sample_case};

    use super::*;

    #[test]
    fn every_assembled_edge_has_both_endpoints() {
        let mut case = sample_case();
        case.edges.push(crate::case::RelationshipEdge {
            source: EdgeEndpoint::Id("S001".to_owned()),
            target: EdgeEndpoint::Id("GHOST".to_owned()),
            relation: "CALLS".to_owned(),
            strength: 0.5,
        });

        let cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        assert_eq!(cache.nodes.len(), 11);
        assert_eq!(cache.edges.len(), 10, "the dangling edge must be dropped");
        for edge in &cache.edges {
            assert!(edge.source < cache.nodes.len());
            assert!(edge.target < cache.nodes.len());
        }
    }

    #[test]
    fn embedded_object_endpoints_resolve_by_id() {
        let mut case = sample_case();
        let device = case.node("D001").unwrap().clone();
        case.edges.push(crate::case::RelationshipEdge {
            source: EdgeEndpoint::Node(Box::new(device)),
            target: EdgeEndpoint::Id("LOC1".to_owned()),
            relation: "SEIZED_AT".to_owned(),
            strength: 0.3,
        });

        let cache = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        assert_eq!(cache.edges.len(), 11);
        let added = cache.edges.last().unwrap();
        assert_eq!(cache.nodes[added.source].id, "D001");
        assert_eq!(cache.nodes[added.target].id, "LOC1");
    }

    #[test]
    fn removing_a_node_removes_its_edges() {
        let case: CaseGraph = serde_json::from_value(serde_json::json!({
            "name": "pair",
            "nodes": [
                { "id": "1", "label": "A", "type": "SUSPECT", "riskScore": 50.0 },
                { "id": "2", "label": "B", "type": "DEVICE", "riskScore": 20.0 }
            ],
            "links": [ { "source": "1", "target": "2", "type": "OWNS", "strength": 1.0 } ]
        }))
        .unwrap();

        let first = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        assert_eq!((first.nodes.len(), first.edges.len()), (2, 1));

        let mut reduced = case.clone();
        reduced.nodes.retain(|node| node.id != "2");
        let second = assemble_render_graph(&reduced, &GraphFilter::default(), Some(first)).unwrap();
        assert_eq!(second.nodes.len(), 1);
        assert!(second.edges.is_empty(), "edge 1->2 must disappear with node 2");
        assert_eq!(second.nodes[0].id, "1");
    }

    #[test]
    fn rebuild_carries_positions_and_restarts_the_clock() {
        let case = sample_case();
        let mut first = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();

        let moved = vec2(321.0, -77.0);
        first.nodes[3].world_pos = moved;
        let carried_id = first.nodes[3].id.clone();

        let second = assemble_render_graph(&case, &GraphFilter::default(), Some(first)).unwrap();
        let index = second.index_by_id[&carried_id];
        assert_eq!(second.nodes[index].world_pos, moved);
        assert!(second.clock.is_active(), "rebuild must restart the simulation");
    }

    #[test]
    fn type_filter_drops_nodes_and_their_edges() {
        let case = sample_case();
        let mut filter = GraphFilter::default();
        filter.visible_types[type_index(NodeType::Device)] = false;

        let cache = assemble_render_graph(&case, &filter, None).unwrap();
        assert!(cache.nodes.iter().all(|node| node.node_type != NodeType::Device));
        // D001 carries four of the sample's ten edges, D002 none.
        assert_eq!(cache.edges.len(), 6);
    }

    #[test]
    fn risk_filter_is_applied() {
        let case = sample_case();
        let filter = GraphFilter {
            min_risk: 70.0,
            ..GraphFilter::default()
        };
        let cache = assemble_render_graph(&case, &filter, None).unwrap();
        assert!(cache.nodes.iter().all(|node| node.risk_score >= 70.0));
    }

    #[test]
    fn an_all_excluding_filter_yields_no_graph() {
        let case = sample_case();
        let filter = GraphFilter {
            visible_types: [false; NodeType::ALL.len()],
            min_risk: 0.0,
        };
        assert!(assemble_render_graph(&case, &filter, None).is_none());
    }

    #[test]
    fn seeding_is_deterministic() {
        let case = sample_case();
        let a = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        let b = assemble_render_graph(&case, &GraphFilter::default(), None).unwrap();
        for (left, right) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(left.world_pos, right.world_pos);
        }
    }
}
