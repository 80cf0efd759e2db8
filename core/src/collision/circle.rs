//! Circle-circle and circle-polygon narrow-phase collision.

use arrayvec::ArrayVec;

use super::{Contact, Manifold};
use crate::shape::Shape;
use crate::vec2::{Transform, Vec2};

/// Collision between two circles. `direction` points from circle 1 toward
/// circle 2.
pub fn collide_circles(pos1: Vec2, r1: f32, pos2: Vec2, r2: f32) -> Option<Manifold> {
    let delta = pos2 - pos1;
    let distance = delta.magnitude();
    let radius_sum = r1 + r2;

    if distance >= radius_sum {
        return None;
    }

    let direction = if distance > 0.0 {
        delta * (1.0 / distance)
    } else {
        Vec2::new(1.0, 0.0)
    };

    let depth = if distance > 0.0 {
        radius_sum - distance
    } else {
        r1
    };

    let point = pos1 + direction * r1;

    let mut contacts = ArrayVec::new();
    contacts.push(Contact {
        point,
        depth,
        id: 0,
    });

    Some(Manifold { direction, contacts })
}

/// Collision between a circle (at `circle_pos`, radius `radius`) and a
/// polygon shape at `poly_tx`. `direction` points from the circle toward the
/// polygon.
pub fn collide_circle_polygon(
    circle_pos: Vec2,
    radius: f32,
    polygon: &Shape,
    poly_tx: Transform,
) -> Option<Manifold> {
    let vertices = polygon.polygon_vertices();
    let normals = polygon.polygon_normals();
    let n = vertices.len();

    let local_center = poly_tx.to_local(circle_pos);

    let mut separation = f32::MIN;
    let mut face_index = 0;
    for i in 0..n {
        let s = normals[i].dot(local_center - vertices[i]);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face_index = i;
        }
    }

    // `normals[face_index]` is the outward normal of the edge running from
    // `vertices[prev]` to `vertices[face_index]`.
    let prev_index = if face_index == 0 { n - 1 } else { face_index - 1 };
    let v1 = vertices[prev_index];
    let v2 = vertices[face_index];

    let (direction_local, depth, point_local) = if separation < f32::EPSILON {
        // Circle center lies inside the polygon.
        let normal = normals[face_index];
        (-normal, radius - separation, local_center - normal * separation)
    } else {
        let dot1 = (local_center - v1).dot(v2 - v1);
        let dot2 = (local_center - v2).dot(v1 - v2);

        if dot1 <= 0.0 {
            let dist = local_center.distance(v1);
            if dist > radius {
                return None;
            }
            ((v1 - local_center).normalize(), radius - dist, v1)
        } else if dot2 <= 0.0 {
            let dist = local_center.distance(v2);
            if dist > radius {
                return None;
            }
            ((v2 - local_center).normalize(), radius - dist, v2)
        } else {
            let normal = normals[face_index];
            let dist = normal.dot(local_center - v1);
            if dist > radius {
                return None;
            }
            (-normal, radius - dist, local_center - normal * dist)
        }
    };

    let mut direction = direction_local.rotate_tx(poly_tx);
    let point = poly_tx.to_world(point_local);

    if direction.dot(poly_tx.position - circle_pos) < 0.0 {
        direction = -direction;
    }

    let mut contacts = ArrayVec::new();
    contacts.push(Contact {
        point,
        depth,
        id: 0,
    });

    Some(Manifold { direction, contacts })
}
