//! Ray casting against circles and polygons.

use crate::shape::Shape;
use crate::vec2::{Transform, Vec2};

/// A ray cast query: an origin, a direction (normalized internally), and a
/// maximum travel distance.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
    pub max_distance: f32,
}

/// The nearest intersection of a [`Ray`] against a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

/// Casts `ray` against `shape` at `tx`, returning the nearest hit within
/// `ray.max_distance`, if any. A ray originating inside a polygon reports no
/// hit (the near edge is never crossed from inside).
pub fn raycast_shape(shape: &Shape, tx: Transform, ray: &Ray) -> Option<RayHit> {
    match shape {
        Shape::Circle { radius, .. } => raycast_circle(tx.position, *radius, ray),
        Shape::Polygon { .. } => raycast_polygon(shape, tx, ray),
    }
}

fn raycast_circle(center: Vec2, radius: f32, ray: &Ray) -> Option<RayHit> {
    let direction = ray.direction.normalize();
    let to_center = center - ray.origin;

    let projection = to_center.dot(direction);
    let perp_sqr = to_center.magnitude_sqr() - projection * projection;
    let radius_sqr = radius * radius;

    if perp_sqr > radius_sqr {
        return None;
    }

    let half_chord = (radius_sqr - perp_sqr).sqrt();

    let mut t = projection - half_chord;
    if t < 0.0 {
        t = projection + half_chord;
    }

    if t < 0.0 || t > ray.max_distance {
        return None;
    }

    let point = ray.origin + direction * t;
    let normal = (ray.origin - point).left_normal();

    Some(RayHit {
        point,
        normal,
        distance: t,
    })
}

fn raycast_polygon(shape: &Shape, tx: Transform, ray: &Ray) -> Option<RayHit> {
    let vertices = shape.polygon_vertices();
    let n = vertices.len();
    if n == 0 {
        return None;
    }

    let direction = ray.direction.normalize();
    let p = ray.origin;
    let r = direction * ray.max_distance;

    let mut closest_t = f32::MAX;
    let mut hit_index = None;
    let mut intersection_count = 0;

    for i in 0..n {
        let j = if i == 0 { n - 1 } else { i - 1 };
        let a = vertices[j].transform(tx);
        let b = vertices[i].transform(tx);

        if let Some((t, _u)) = segment_intersection(p, r, a, b - a) {
            intersection_count += 1;
            if t < closest_t {
                closest_t = t;
                hit_index = Some(i);
            }
        }
    }

    // A ray whose origin is inside the polygon crosses an odd number of
    // edges; that isn't reported as a hit.
    let inside = intersection_count % 2 != 0;
    let hit_index = hit_index?;
    if inside {
        return None;
    }

    let point = p + r * closest_t;
    let normal = shape.polygon_normal(hit_index).rotate_tx(tx);

    Some(RayHit {
        point,
        normal,
        distance: closest_t * ray.max_distance,
    })
}

/// Intersects segment `p -> p + r` with segment `q -> q + s`, returning the
/// parametric `(t, u)` pair when both fall within `[0, 1]`. Parallel segments
/// (including colinear ones) are reported as non-intersecting.
fn segment_intersection(p: Vec2, r: Vec2, q: Vec2, s: Vec2) -> Option<(f32, f32)> {
    let r_cross_s = r.cross(s);

    if r_cross_s.abs() < f32::EPSILON {
        return None;
    }

    let qp = q - p;
    let t = qp.cross(s) / r_cross_s;
    let u = qp.cross(r) / r_cross_s;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}
