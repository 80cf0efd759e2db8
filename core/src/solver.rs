//! Sequential-impulse contact resolution with Baumgarte stabilization,
//! Coulomb friction and accumulated-impulse warm-starting.

use crate::body::{Body, BodyType};
use crate::constants::{BAUMGARTE_FACTOR, BAUMGARTE_SLOP};
use crate::vec2::Vec2;

/// Per-contact solver state, persisted across solver iterations (and,
/// carried forward by identical `id`, across steps) to warm-start the next
/// impulse computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactConstraint {
    pub point: Vec2,
    pub depth: f32,
    pub id: i32,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
}

impl ContactConstraint {
    pub fn new(point: Vec2, depth: f32, id: i32) -> Self {
        Self {
            point,
            depth,
            id,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        }
    }
}

/// Resolves one pair's contact manifold for a single solver iteration.
///
/// `direction` points from `body1` toward `body2`. `contacts` carries the
/// previous iteration's (or, on the first iteration of a step, the previous
/// step's) accumulated impulses, which this call both consumes as a warm
/// start and updates in place.
pub fn resolve_collision(
    body1: &mut Body,
    body2: &mut Body,
    direction: Vec2,
    contacts: &mut [ContactConstraint],
    friction: f32,
    restitution: f32,
    inverse_dt: f32,
) {
    let inverse_mass_sum = body1.inverse_mass() + body2.inverse_mass();

    if inverse_mass_sum <= 0.0 {
        if body1.body_type() == BodyType::Static {
            body1.set_velocity(Vec2::ZERO);
            body1.set_angular_velocity(0.0);
        }
        if body2.body_type() == BodyType::Static {
            body2.set_velocity(Vec2::ZERO);
            body2.set_angular_velocity(0.0);
        }
        return;
    }

    let tangent = Vec2::new(direction.y, -direction.x);

    for contact in contacts.iter_mut() {
        let rel_pos1 = contact.point - body1.position();
        let rel_pos2 = contact.point - body2.position();

        let rel_velocity = relative_velocity(body1, body2, rel_pos1, rel_pos2);
        let rel_velocity_dot = rel_velocity.dot(direction);

        if rel_velocity_dot > 0.0 {
            continue;
        }

        let rn1 = rel_pos1.cross(direction);
        let rn2 = rel_pos2.cross(direction);
        let normal_mass =
            inverse_mass_sum + body1.inverse_inertia() * rn1 * rn1 + body2.inverse_inertia() * rn2 * rn2;

        if normal_mass <= 0.0 {
            continue;
        }

        let bias = -(BAUMGARTE_FACTOR * inverse_dt) * (-contact.depth + BAUMGARTE_SLOP).min(0.0);

        let normal_scalar = (-(1.0 + restitution) * rel_velocity_dot + bias) / normal_mass;
        let new_normal_impulse = (contact.normal_impulse + normal_scalar).max(0.0);
        let delta_normal = new_normal_impulse - contact.normal_impulse;
        contact.normal_impulse = new_normal_impulse;

        let normal_impulse_vec = direction * delta_normal;
        body1.apply_impulse(-normal_impulse_vec, rel_pos1);
        body2.apply_impulse(normal_impulse_vec, rel_pos2);

        let rel_velocity = relative_velocity(body1, body2, rel_pos1, rel_pos2);

        let rt1 = rel_pos1.cross(tangent);
        let rt2 = rel_pos2.cross(tangent);
        let tangent_mass =
            inverse_mass_sum + body1.inverse_inertia() * rt1 * rt1 + body2.inverse_inertia() * rt2 * rt2;

        if tangent_mass <= 0.0 {
            continue;
        }

        let tangent_scalar = -rel_velocity.dot(tangent) / tangent_mass;
        let max_friction = friction * new_normal_impulse;
        let new_tangent_impulse =
            (contact.tangent_impulse + tangent_scalar).clamp(-max_friction, max_friction);
        let delta_tangent = new_tangent_impulse - contact.tangent_impulse;
        contact.tangent_impulse = new_tangent_impulse;

        let tangent_impulse_vec = tangent * delta_tangent;
        body1.apply_impulse(-tangent_impulse_vec, rel_pos1);
        body2.apply_impulse(tangent_impulse_vec, rel_pos2);
    }
}

fn relative_velocity(body1: &Body, body2: &Body, rel_pos1: Vec2, rel_pos2: Vec2) -> Vec2 {
    let v1 = body1.velocity() + rel_pos1.left_normal() * body1.angular_velocity();
    let v2 = body2.velocity() + rel_pos2.left_normal() * body2.angular_velocity();
    v2 - v1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Material, Shape};
    use std::rc::Rc;

    fn body(body_type: BodyType, pos: Vec2) -> Body {
        let shape = Rc::new(Shape::circle(Material::default(), 0.5).unwrap());
        let mut b = Body::new(body_type, shape);
        b.set_position(pos);
        b
    }

    #[test]
    fn resting_circle_on_static_ground_loses_approach_velocity() {
        let mut ground = body(BodyType::Static, Vec2::new(0.0, 1.0));
        let mut ball = body(BodyType::Dynamic, Vec2::new(0.0, 0.0));
        ball.set_velocity(Vec2::new(0.0, 1.0));

        let direction = Vec2::new(0.0, 1.0);
        let mut contacts = [ContactConstraint::new(Vec2::new(0.0, 0.5), 0.05, 0)];

        resolve_collision(&mut ball, &mut ground, direction, &mut contacts, 0.2, 0.0, 60.0);

        assert!(ball.velocity().y <= 1.0);
    }

    #[test]
    fn separating_contact_is_left_untouched() {
        let mut a = body(BodyType::Dynamic, Vec2::new(0.0, 0.0));
        let mut b = body(BodyType::Dynamic, Vec2::new(0.0, 1.0));
        a.set_velocity(Vec2::new(0.0, -1.0));
        b.set_velocity(Vec2::new(0.0, 1.0));

        let direction = Vec2::new(0.0, 1.0);
        let mut contacts = [ContactConstraint::new(Vec2::new(0.0, 0.5), 0.05, 0)];

        resolve_collision(&mut a, &mut b, direction, &mut contacts, 0.2, 0.0, 60.0);

        assert_eq!(a.velocity(), Vec2::new(0.0, -1.0));
        assert_eq!(b.velocity(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn static_pair_zeroes_static_velocity_and_skips_resolution() {
        let mut a = body(BodyType::Static, Vec2::ZERO);
        a.set_velocity(Vec2::new(5.0, 0.0));
        let mut b = body(BodyType::Static, Vec2::new(1.0, 0.0));

        let direction = Vec2::new(1.0, 0.0);
        let mut contacts = [ContactConstraint::new(Vec2::new(0.5, 0.0), 0.1, 0)];

        resolve_collision(&mut a, &mut b, direction, &mut contacts, 0.2, 0.0, 60.0);

        assert_eq!(a.velocity(), Vec2::ZERO);
    }
}
