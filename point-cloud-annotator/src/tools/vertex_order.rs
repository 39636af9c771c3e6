use bevy::prelude::*;

/// Ring index at which a newly clicked point should be spliced so the
/// polygon boundary stays a simple loop under a nearest-edge heuristic.
///
/// The point is compared against the nearest ring vertex `i1` and a second
/// candidate `i2` (the ring successor of `i1`, displaced only by a strictly
/// closer vertex); the sign of the planar cross product of `point - ring[i1]`
/// and `ring[i2] - ring[i1]` decides which of the two the point follows.
/// This is a local heuristic, not a hull construction: adversarial click
/// orders (for example a point equidistant from two non-adjacent vertices)
/// can still produce a self-crossing ring.
pub fn insertion_index(ring: &[Vec3], new_point: Vec3) -> usize {
    if ring.len() < 2 {
        return ring.len();
    }

    let p = planar(new_point);

    // Nearest vertex; distance ties keep the first index scanned.
    let mut i1 = 0;
    let mut min_dist = f32::INFINITY;
    for (i, v) in ring.iter().enumerate() {
        let d = planar(*v).distance(p);
        if d < min_dist {
            min_dist = d;
            i1 = i;
        }
    }

    // Second candidate defaults to the ring successor of i1; only a vertex
    // strictly closer than i1 itself displaces it, so equal-distance cases
    // keep the default.
    let mut i2 = (i1 + 1) % ring.len();
    let mut threshold = min_dist;
    for (i, v) in ring.iter().enumerate() {
        if i == i1 {
            continue;
        }
        let d = planar(*v).distance(p);
        if d < threshold {
            threshold = d;
            i2 = i;
        }
    }

    let toward_point = p - planar(ring[i1]);
    let toward_second = planar(ring[i2]) - planar(ring[i1]);
    if toward_point.perp_dot(toward_second) > 0.0 {
        i1 + 1
    } else {
        i2 + 1
    }
}

// The annotation plane spans world X/Z.
fn planar(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_of(points: &[(f32, f32)]) -> Vec<Vec3> {
        points.iter().map(|(x, z)| Vec3::new(*x, 5.0, *z)).collect()
    }

    #[test]
    fn empty_and_single_vertex_rings_append() {
        assert_eq!(insertion_index(&[], Vec3::new(1.0, 5.0, 1.0)), 0);
        let ring = ring_of(&[(0.0, 0.0)]);
        assert_eq!(insertion_index(&ring, Vec3::new(1.0, 5.0, 1.0)), 1);
    }

    #[test]
    fn point_below_bottom_edge_splices_into_it() {
        let ring = ring_of(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        // (5, -1) sits just outside the edge (0,0)-(10,0); it must land
        // between those two vertices.
        let index = insertion_index(&ring, Vec3::new(5.0, 5.0, -1.0));
        assert_eq!(index, 1);
    }

    #[test]
    fn point_beside_right_edge_follows_that_edge() {
        let ring = ring_of(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let index = insertion_index(&ring, Vec3::new(11.0, 5.0, 5.0));
        assert_eq!(index, 2, "point outside the right edge joins it");
    }

    #[test]
    fn negative_orientation_splices_after_second_candidate() {
        let ring = ring_of(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        // Inside the ring near the bottom edge the cross product flips sign,
        // so the point follows the second candidate instead.
        let index = insertion_index(&ring, Vec3::new(5.0, 5.0, 1.0));
        assert_eq!(index, 2);
    }

    #[test]
    fn distance_tie_is_deterministic() {
        let ring = ring_of(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        // (5, -1) is equidistant from the first two vertices; the scan keeps
        // the earlier index, so repeated calls agree.
        let p = Vec3::new(5.0, 5.0, -1.0);
        assert_eq!(insertion_index(&ring, p), insertion_index(&ring, p));
    }

    #[test]
    fn two_vertex_ring_uses_orientation_rule() {
        let ring = ring_of(&[(0.0, 0.0), (10.0, 0.0)]);
        let index = insertion_index(&ring, Vec3::new(5.0, 5.0, -1.0));
        assert_eq!(index, 1, "two vertices are already a ring for splicing");
    }
}
