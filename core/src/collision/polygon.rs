//! Polygon-polygon narrow-phase collision: SAT reference-face selection plus
//! Sutherland-Hodgman clipping of the incident edge.

use arrayvec::ArrayVec;

use super::{Contact, Manifold};
use crate::constants::MAX_VERTEX_COUNT;
use crate::shape::Shape;
use crate::vec2::{Transform, Vec2};

#[derive(Debug, Clone, Copy)]
struct Edge {
    data: [Vec2; 2],
    indexes: [usize; 2],
}

/// Finds the vertex index of `shape` (at `tx`) that extends furthest along
/// `direction_world`.
fn support_point_index(shape: &Shape, tx: Transform, direction_world: Vec2) -> usize {
    let vertices = shape.polygon_vertices();
    let direction_local = Vec2::new(
        direction_world.x * tx.cos + direction_world.y * tx.sin,
        -direction_world.x * tx.sin + direction_world.y * tx.cos,
    );

    let mut best_index = 0;
    let mut best_dot = f32::MIN;
    for (i, v) in vertices.iter().enumerate() {
        let d = v.dot(direction_local);
        if d > best_dot {
            best_dot = d;
            best_index = i;
        }
    }
    best_index
}

/// Finds the world-space separation (and its axis index) of `shape2` against
/// every face normal of `shape1`. A non-negative return means `shape1`'s
/// normal at that index is a separating axis.
fn separating_axis_index(
    shape1: &Shape,
    tx1: Transform,
    shape2: &Shape,
    tx2: Transform,
) -> (f32, usize) {
    let vertices1 = shape1.polygon_vertices();
    let normals1 = shape1.polygon_normals();
    let vertices2 = shape2.polygon_vertices();

    let mut max_depth = f32::MIN;
    let mut max_index = 0;

    for i in 0..vertices1.len() {
        let normal_world = normals1[i].rotate_tx(tx1);
        let support_index = support_point_index(shape2, tx2, -normal_world);
        let support_world = vertices2[support_index].transform(tx2);
        let vertex_world = vertices1[i].transform(tx1);

        let depth = normal_world.dot(support_world - vertex_world);
        if depth > max_depth {
            max_depth = depth;
            max_index = i;
        }
    }

    (max_depth, max_index)
}

/// Picks the edge of `shape` (at `tx`) most face-on to `direction_world`: the
/// edge adjacent to the support vertex whose own direction is closest to
/// perpendicular with `direction_world`.
fn get_contact_edge(shape: &Shape, tx: Transform, direction_world: Vec2) -> Edge {
    let vertices = shape.polygon_vertices();
    let n = vertices.len();

    let support_index = support_point_index(shape, tx, direction_world);
    let prev_index = if support_index == 0 { n - 1 } else { support_index - 1 };
    let next_index = (support_index + 1) % n;

    let direction_local = Vec2::new(
        direction_world.x * tx.cos + direction_world.y * tx.sin,
        -direction_world.x * tx.sin + direction_world.y * tx.cos,
    );

    let v = vertices[support_index];
    let prev_edge = v - vertices[prev_index];
    let next_edge = vertices[next_index] - v;

    if prev_edge.dot(direction_local).abs() <= next_edge.dot(direction_local).abs() {
        Edge {
            data: [
                vertices[prev_index].transform(tx),
                v.transform(tx),
            ],
            indexes: [prev_index, support_index],
        }
    } else {
        Edge {
            data: [v.transform(tx), vertices[next_index].transform(tx)],
            indexes: [support_index, next_index],
        }
    }
}

/// Clips `edge` against the half-plane `dot(p, normal) >= offset`, keeping
/// one or both endpoints (interpolating a new vertex at the plane) or
/// rejecting the edge entirely if both endpoints fall outside.
fn clip_edge(edge: &Edge, normal: Vec2, offset: f32) -> Option<Edge> {
    let dot1 = edge.data[0].dot(normal) - offset;
    let dot2 = edge.data[1].dot(normal) - offset;

    if dot1 >= 0.0 && dot2 >= 0.0 {
        return Some(*edge);
    }

    let t = dot1 / (dot1 - dot2);
    let mid = edge.data[0] + (edge.data[1] - edge.data[0]) * t;

    if dot1 > 0.0 && dot2 < 0.0 {
        Some(Edge {
            data: [edge.data[0], mid],
            indexes: edge.indexes,
        })
    } else if dot1 < 0.0 && dot2 > 0.0 {
        Some(Edge {
            data: [edge.data[1], mid],
            indexes: [edge.indexes[1], edge.indexes[0]],
        })
    } else {
        None
    }
}

/// Collision between two polygon shapes via separating-axis reference-face
/// selection and Sutherland-Hodgman clipping of the incident edge against the
/// reference edge's side planes.
pub fn collide_polygons(
    shape1: &Shape,
    tx1: Transform,
    shape2: &Shape,
    tx2: Transform,
) -> Option<Manifold> {
    let (depth1, face1) = separating_axis_index(shape1, tx1, shape2, tx2);
    if depth1 >= 0.0 {
        return None;
    }

    let (depth2, face2) = separating_axis_index(shape2, tx2, shape1, tx1);
    if depth2 >= 0.0 {
        return None;
    }

    let flip = depth2 > depth1;

    let (ref_shape, ref_tx, ref_face, inc_shape, inc_tx) = if !flip {
        (shape1, tx1, face1, shape2, tx2)
    } else {
        (shape2, tx2, face2, shape1, tx1)
    };

    let ref_normal_world = ref_shape.polygon_normal(ref_face).rotate_tx(ref_tx);

    let ref_edge = get_contact_edge(ref_shape, ref_tx, ref_normal_world);
    let inc_edge = get_contact_edge(inc_shape, inc_tx, -ref_normal_world);

    let ref_edge_vector = (ref_edge.data[1] - ref_edge.data[0]).normalize();

    let clipped = clip_edge(&inc_edge, ref_edge_vector, ref_edge_vector.dot(ref_edge.data[0]))?;
    let clipped = clip_edge(
        &clipped,
        -ref_edge_vector,
        -ref_edge_vector.dot(ref_edge.data[1]),
    )?;

    let ref_edge_normal = ref_edge_vector.right_normal();
    let max_depth = ref_edge.data[0].dot(ref_edge_normal);

    let mut contacts: ArrayVec<Contact, 2> = ArrayVec::new();

    for i in 0..2 {
        let separation = clipped.data[i].dot(ref_edge_normal) - max_depth;
        if separation <= 0.0 {
            let id = if flip {
                clipped.indexes[i] as i32
            } else {
                MAX_VERTEX_COUNT as i32 + clipped.indexes[i] as i32
            };
            contacts.push(Contact {
                point: clipped.data[i],
                depth: -separation,
                id,
            });
        }
    }

    if contacts.is_empty() {
        return None;
    }

    let direction = if !flip {
        ref_normal_world
    } else {
        -ref_normal_world
    };

    Some(Manifold { direction, contacts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Material;
    use approx::assert_relative_eq;

    #[test]
    fn overlapping_squares_produce_two_contacts() {
        let a = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let b = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let tx1 = Transform::new(Vec2::new(0.0, 0.0), 0.0);
        let tx2 = Transform::new(Vec2::new(1.5, 0.0), 0.0);

        let manifold = collide_polygons(&a, tx1, &b, tx2).expect("should collide");
        assert!(manifold.direction.x > 0.0);
        assert!(!manifold.contacts.is_empty());
        assert!(manifold.contacts.iter().all(|c| c.depth > 0.0));
    }

    #[test]
    fn separated_squares_do_not_collide() {
        let a = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let b = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let tx1 = Transform::new(Vec2::new(0.0, 0.0), 0.0);
        let tx2 = Transform::new(Vec2::new(10.0, 0.0), 0.0);

        assert!(collide_polygons(&a, tx1, &b, tx2).is_none());
    }

    #[test]
    fn corner_overlap_produces_at_least_one_contact() {
        let a = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let b = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let tx1 = Transform::new(Vec2::new(0.0, 0.0), 0.0);
        let tx2 = Transform::new(Vec2::new(1.8, 1.8), 0.0);

        let manifold = collide_polygons(&a, tx1, &b, tx2).expect("corners should overlap");
        assert!(!manifold.contacts.is_empty());
    }

    /// Converts a pixel measurement to simulation units, matching the seed
    /// scenarios' `PR_GEOMETRY_PIXELS_PER_UNIT = 16`.
    fn px(value: f32) -> f32 {
        value / 16.0
    }

    fn px_vec(x: f32, y: f32) -> Vec2 {
        Vec2::new(px(x), px(y))
    }

    fn rect(width_px: f32, height_px: f32) -> Shape {
        Shape::rectangle(Material::default(), px(width_px), px(height_px)).unwrap()
    }

    /// Seed scenario 1: two head-on overlapping axis-aligned boxes.
    #[test]
    fn seed_scenario_head_on_overlapping_boxes() {
        let s1 = rect(150.0, 100.0);
        let s2 = rect(150.0, 50.0);
        let tx1 = Transform::new(px_vec(-50.0, 0.0), 0.0);
        let tx2 = Transform::new(px_vec(50.0, 0.0), 0.0);

        let manifold = collide_polygons(&s1, tx1, &s2, tx2).expect("boxes should overlap");
        assert_eq!(manifold.contacts.len(), 2);
        assert_relative_eq!(manifold.direction.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(manifold.direction.y, 0.0, epsilon = 1e-4);

        let expected_depth = px(50.0);
        let expected_y = px(25.0);
        for contact in manifold.contacts.iter() {
            assert_relative_eq!(contact.point.x, px(-25.0), epsilon = 1e-3);
            assert_relative_eq!(contact.point.y.abs(), expected_y, epsilon = 1e-3);
            assert_relative_eq!(contact.depth, expected_depth, epsilon = 1e-3);
        }
    }

    /// Seed scenario 2: overlapping boxes staggered vertically.
    #[test]
    fn seed_scenario_vertically_staggered_boxes() {
        let s1 = rect(150.0, 100.0);
        let s2 = rect(150.0, 200.0);
        let tx1 = Transform::new(px_vec(-50.0, 0.0), 0.0);
        let tx2 = Transform::new(px_vec(40.0, 20.0), 0.0);

        let manifold = collide_polygons(&s1, tx1, &s2, tx2).expect("boxes should overlap");
        assert_eq!(manifold.contacts.len(), 2);
        assert_relative_eq!(manifold.direction.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(manifold.direction.y, 0.0, epsilon = 1e-4);

        let expected_depth = px(60.0);
        let expected_y = px(50.0);
        for contact in manifold.contacts.iter() {
            assert_relative_eq!(contact.point.x, px(-35.0), epsilon = 1e-3);
            assert_relative_eq!(contact.point.y.abs(), expected_y, epsilon = 1e-3);
            assert_relative_eq!(contact.depth, expected_depth, epsilon = 1e-3);
        }
    }

    /// Seed scenario 5/6: a small rotated box resting on a long thin floor.
    /// Swapping the call order should swap which polygon supplies the
    /// reference face, flipping `direction` and changing the contact count.
    #[test]
    fn seed_scenario_resting_box_incident_edge_swaps_with_call_order() {
        let floor = rect(450.0, 50.0);
        let box_ = rect(50.0, 50.0);
        let floor_tx = Transform::new(px_vec(0.0, 80.0), 0.0);
        let box_tx = Transform::new(px_vec(40.0, 32.0), 15f32.to_radians());

        let forward = collide_polygons(&floor, floor_tx, &box_, box_tx)
            .expect("resting box should overlap the floor");
        assert_eq!(forward.contacts.len(), 1);
        assert_relative_eq!(forward.direction.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(forward.direction.y, -1.0, epsilon = 1e-3);

        let reversed = collide_polygons(&box_, box_tx, &floor, floor_tx)
            .expect("reversed call order should still detect the overlap");
        assert_eq!(reversed.contacts.len(), 2);
        assert_relative_eq!(reversed.direction.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(reversed.direction.y, 1.0, epsilon = 1e-3);
    }
}
