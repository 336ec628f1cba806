use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Square region covered by one quadtree cell.
#[derive(Clone, Copy)]
pub(super) struct CellBounds {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl CellBounds {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Squared distance from a point to this cell's boundary; zero inside.
    pub(super) fn distance_sq_to_point(self, point: Vec2) -> f32 {
        let dx = ((point.x - self.center.x).abs() - self.half).max(0.0);
        let dy = ((point.y - self.center.y).abs() - self.half).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        ((point.x >= self.center.x) as usize) | (((point.y >= self.center.y) as usize) << 1)
    }

    fn quadrant_bounds(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(dx, dy),
            half: quarter,
        }
    }
}

/// Barnes-Hut quadtree over node positions. Interior cells aggregate mass
/// and center of mass; leaves keep the member indices.
pub(super) struct QuadCell {
    pub(super) bounds: CellBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<QuadCell>>; 4],
}

impl QuadCell {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = CellBounds::enclosing(positions)?;
        Some(Self::grow(bounds, (0..positions.len()).collect(), positions, 0))
    }

    fn grow(bounds: CellBounds, members: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = members.len() as f32;
        let mut center_of_mass = Vec2::ZERO;
        for &index in &members {
            center_of_mass += positions[index];
        }
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            bounds,
            center_of_mass,
            mass,
            members,
            children: std::array::from_fn(|_| None),
        };

        if cell.members.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.members {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }

        // All members piled in one quadrant means splitting makes no
        // progress (coincident points); stay a leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                cell.children[quadrant] = Some(Box::new(Self::grow(
                    bounds.quadrant_bounds(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_aggregates_total_mass() {
        let positions = vec![
            vec2(-50.0, -50.0),
            vec2(50.0, -50.0),
            vec2(-50.0, 50.0),
            vec2(50.0, 50.0),
            vec2(0.0, 0.0),
        ];
        let tree = QuadCell::build(&positions).unwrap();
        assert_eq!(tree.mass, 5.0);
        assert!(tree.bounds.contains(vec2(0.0, 0.0)));
        for position in &positions {
            assert!(tree.bounds.contains(*position));
        }
    }

    #[test]
    fn build_splits_past_leaf_capacity() {
        let positions: Vec<Vec2> = (0..40)
            .map(|i| vec2((i % 8) as f32 * 30.0, (i / 8) as f32 * 30.0))
            .collect();
        let tree = QuadCell::build(&positions).unwrap();
        assert!(!tree.is_leaf());

        fn leaf_member_total(cell: &QuadCell) -> usize {
            if cell.is_leaf() {
                cell.members.len()
            } else {
                cell.children
                    .iter()
                    .flatten()
                    .map(|child| leaf_member_total(child))
                    .sum()
            }
        }
        assert_eq!(leaf_member_total(&tree), 40);
    }

    #[test]
    fn coincident_points_stay_one_leaf() {
        let positions = vec![vec2(3.0, 3.0); 20];
        let tree = QuadCell::build(&positions).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.members.len(), 20);
    }

    #[test]
    fn empty_and_non_finite_inputs_build_nothing() {
        assert!(QuadCell::build(&[]).is_none());
        assert!(QuadCell::build(&[vec2(f32::NAN, 0.0)]).is_none());
    }
}
