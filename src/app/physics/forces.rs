use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadCell;

/// Unit vector along `delta`, with a deterministic spread when two points
/// coincide so stacked nodes separate instead of dividing by zero.
pub(super) fn separation_direction(delta: Vec2, seed: usize) -> Vec2 {
    let length = delta.length();
    if length > 1e-4 {
        delta / length
    } else {
        let angle = ((seed as f32) * 0.618_034 + 0.23) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

/// Barnes-Hut walk for one node: distant cells contribute as their
/// aggregated center of mass, near cells recurse down to member pairs.
pub(super) fn accumulate_repulsion(
    cell: &QuadCell,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other == index {
                continue;
            }
            let delta = point - positions[other];
            let distance_sq = delta.length_sq().max(1.0);
            *force += separation_direction(delta, index + other) * (strength / distance_sq);
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance_sq = delta.length_sq().max(1.0);
    let distance = distance_sq.sqrt();
    if !cell.bounds.contains(point) && (cell.bounds.side() / distance) < theta {
        *force += (delta / distance) * (strength * cell.mass / distance_sq);
        return;
    }

    for child in cell.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, strength, theta, force);
    }
}

/// Pushes apart every pair closer than twice the collide radius. Each
/// unordered pair is resolved once, during the walk of its lower index.
pub(super) fn accumulate_collisions(
    cell: &QuadCell,
    index: usize,
    positions: &[Vec2],
    collide_radius: f32,
    strength: f32,
    forces: &mut [Vec2],
) {
    let point = positions[index];
    let min_distance = collide_radius * 2.0;
    if cell.bounds.distance_sq_to_point(point) > min_distance * min_distance {
        return;
    }

    if cell.is_leaf() {
        for &other in &cell.members {
            if other <= index {
                continue;
            }
            let delta = point - positions[other];
            let distance = delta.length();
            if distance >= min_distance {
                continue;
            }

            let direction = separation_direction(delta, index + other);
            let push = direction * ((min_distance - distance) * strength * 0.5);
            forces[index] += push;
            forces[other] -= push;
        }
        return;
    }

    for child in cell.children.iter().flatten() {
        accumulate_collisions(child, index, positions, collide_radius, strength, forces);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_pushes_points_apart() {
        let positions = vec![vec2(-10.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadCell::build(&positions).unwrap();

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, 400.0, 0.72, &mut force);
        assert!(force.x < 0.0, "left point should be pushed further left");
        assert!(force.y.abs() < 1e-4);

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 1, &positions, 400.0, 0.72, &mut force);
        assert!(force.x > 0.0);
    }

    #[test]
    fn collision_resolves_each_pair_once_and_symmetrically() {
        let positions = vec![vec2(0.0, 0.0), vec2(20.0, 0.0), vec2(500.0, 500.0)];
        let tree = QuadCell::build(&positions).unwrap();

        let mut forces = vec![Vec2::ZERO; positions.len()];
        for index in 0..positions.len() {
            accumulate_collisions(&tree, index, &positions, 30.0, 1.0, &mut forces);
        }

        // Overlapping pair separated by 20 with a 60 minimum: equal and
        // opposite pushes, untouched far node.
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-3);
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn coincident_nodes_get_a_separating_direction() {
        let positions = vec![vec2(0.0, 0.0), vec2(0.0, 0.0)];
        let tree = QuadCell::build(&positions).unwrap();

        let mut forces = vec![Vec2::ZERO; 2];
        for index in 0..2 {
            accumulate_collisions(&tree, index, &positions, 30.0, 1.0, &mut forces);
        }
        assert!(forces[0].length() > 0.0);
        assert!(forces[1].length() > 0.0);
    }
}
