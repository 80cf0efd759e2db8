//! Narrow-phase collision detection between shape pairs, and ray casting.

mod circle;
mod polygon;
mod raycast;

use arrayvec::ArrayVec;

use crate::shape::Shape;
use crate::vec2::{Transform, Vec2};

pub use raycast::{raycast_shape, Ray, RayHit};

/// A single point of contact between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub point: Vec2,
    pub depth: f32,
    /// An identifier stable across steps for the same physical contact
    /// feature, used to carry warm-start impulses forward between frames.
    pub id: i32,
}

/// A collision manifold: the separating direction (pointing from the first
/// shape toward the second) and up to two contact points.
#[derive(Debug, Clone)]
pub struct Manifold {
    pub direction: Vec2,
    pub contacts: ArrayVec<Contact, 2>,
}

impl Manifold {
    fn flipped(mut self) -> Self {
        self.direction = -self.direction;
        self
    }
}

/// Computes the collision manifold between `shape1` (at `tx1`) and `shape2`
/// (at `tx2`), or `None` if they don't overlap. The manifold's direction
/// points from `shape1` toward `shape2`.
pub fn compute_collision(
    shape1: &Shape,
    tx1: Transform,
    shape2: &Shape,
    tx2: Transform,
) -> Option<Manifold> {
    match (shape1, shape2) {
        (Shape::Circle { radius: r1, .. }, Shape::Circle { radius: r2, .. }) => {
            circle::collide_circles(tx1.position, *r1, tx2.position, *r2)
        }
        (Shape::Circle { radius, .. }, Shape::Polygon { .. }) => {
            circle::collide_circle_polygon(tx1.position, *radius, shape2, tx2)
        }
        (Shape::Polygon { .. }, Shape::Circle { radius, .. }) => {
            circle::collide_circle_polygon(tx2.position, *radius, shape1, tx1).map(Manifold::flipped)
        }
        (Shape::Polygon { .. }, Shape::Polygon { .. }) => {
            polygon::collide_polygons(shape1, tx1, shape2, tx2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Material, Shape};

    #[test]
    fn overlapping_circles_collide_with_direction_from_first_to_second() {
        let s1 = Shape::circle(Material::default(), 1.0).unwrap();
        let s2 = Shape::circle(Material::default(), 1.0).unwrap();
        let tx1 = Transform::new(Vec2::new(0.0, 0.0), 0.0);
        let tx2 = Transform::new(Vec2::new(1.5, 0.0), 0.0);

        let manifold = compute_collision(&s1, tx1, &s2, tx2).expect("should collide");
        assert!(manifold.direction.x > 0.0);
        assert_eq!(manifold.contacts.len(), 1);
    }

    #[test]
    fn circle_vs_polygon_is_symmetric_under_swap() {
        let circle = Shape::circle(Material::default(), 1.0).unwrap();
        let square = Shape::rectangle(Material::default(), 2.0, 2.0).unwrap();
        let tx_circle = Transform::new(Vec2::new(2.5, 0.0), 0.0);
        let tx_square = Transform::new(Vec2::new(0.0, 0.0), 0.0);

        let a = compute_collision(&circle, tx_circle, &square, tx_square);
        let b = compute_collision(&square, tx_square, &circle, tx_circle);

        match (a, b) {
            (Some(a), Some(b)) => {
                assert!((a.direction.x + b.direction.x).abs() < 1e-4);
            }
            _ => panic!("expected both orderings to detect the collision"),
        }
    }

    #[test]
    fn non_overlapping_shapes_do_not_collide() {
        let s1 = Shape::circle(Material::default(), 1.0).unwrap();
        let s2 = Shape::circle(Material::default(), 1.0).unwrap();
        let tx1 = Transform::new(Vec2::new(0.0, 0.0), 0.0);
        let tx2 = Transform::new(Vec2::new(10.0, 0.0), 0.0);

        assert!(compute_collision(&s1, tx1, &s2, tx2).is_none());
    }
}
