//! Rigid bodies: motion state, mass properties, force application and
//! integration.

use std::rc::Rc;

use crate::collision::{raycast_shape, Ray, RayHit};
use crate::shape::{Aabb, Shape};
use crate::vec2::{Transform, Vec2};

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyType {
    /// Infinite mass, never moves, but still collides.
    Static,
    /// Moves under its own velocity but is unaffected by forces or impulses.
    Kinematic,
    #[default]
    Dynamic,
}

/// Per-body overrides to the default mass/inertia derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyFlags {
    /// Treat the body as having infinite mass regardless of its shape's density.
    pub infinite_mass: bool,
    /// Treat the body as having infinite rotational inertia regardless of its
    /// shape's density.
    pub infinite_inertia: bool,
}

/// Velocity, force accumulators, and the derived mass/inertia of a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionData {
    pub mass: f32,
    pub inverse_mass: f32,
    pub inertia: f32,
    pub inverse_inertia: f32,
    pub gravity_scale: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub force: Vec2,
    pub torque: f32,
}

impl MotionData {
    fn with_gravity_scale(gravity_scale: f32) -> Self {
        Self {
            gravity_scale,
            ..Default::default()
        }
    }
}

/// A rigid body: a shape plus the motion state that drives its transform.
#[derive(Debug, Clone)]
pub struct Body {
    body_type: BodyType,
    flags: BodyFlags,
    shape: Rc<Shape>,
    tx: Transform,
    motion: MotionData,
    aabb: Aabb,
    user_data: Option<u64>,
}

impl Body {
    /// Creates a body of the given type, at the origin, with no shape attached
    /// yet. Mass properties are only meaningful once [`Body::set_shape`] is
    /// called with something other than a zero-area placeholder.
    pub fn new(body_type: BodyType, shape: Rc<Shape>) -> Self {
        let mut body = Self {
            body_type,
            flags: BodyFlags::default(),
            shape,
            tx: Transform::default(),
            motion: MotionData::with_gravity_scale(1.0),
            aabb: Aabb::default(),
            user_data: None,
        };
        body.recompute_mass();
        body.recompute_aabb();
        body
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
        self.recompute_mass();
    }

    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: BodyFlags) {
        self.flags = flags;
        self.recompute_mass();
    }

    pub fn shape(&self) -> &Rc<Shape> {
        &self.shape
    }

    pub fn set_shape(&mut self, shape: Rc<Shape>) {
        self.shape = shape;
        self.recompute_mass();
        self.recompute_aabb();
    }

    pub fn transform(&self) -> Transform {
        self.tx
    }

    /// Sets position and angle together, refreshing the cached world AABB
    /// once instead of twice. Re-derives `tx`'s sin/cos from its angle rather
    /// than trusting the caller's cache.
    pub fn set_transform(&mut self, tx: Transform) {
        self.tx = Transform::new(tx.position, tx.angle);
        self.recompute_aabb();
    }

    pub fn position(&self) -> Vec2 {
        self.tx.position
    }

    pub fn angle(&self) -> f32 {
        self.tx.angle
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.tx.position = position;
        self.recompute_aabb();
    }

    /// Sets the body's orientation, normalizing the angle and refreshing the
    /// cached sine/cosine and world-space AABB.
    pub fn set_angle(&mut self, angle: f32) {
        self.tx.set_angle(angle);
        self.recompute_aabb();
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Tests whether world-space `point` lies within this body's shape.
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.shape.contains_point(self.tx, point)
    }

    /// Casts `ray` against this body's shape at its current transform.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        raycast_shape(&self.shape, self.tx, ray)
    }

    pub fn mass(&self) -> f32 {
        self.motion.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.motion.inverse_mass
    }

    pub fn inertia(&self) -> f32 {
        self.motion.inertia
    }

    pub fn inverse_inertia(&self) -> f32 {
        self.motion.inverse_inertia
    }

    pub fn gravity_scale(&self) -> f32 {
        self.motion.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.motion.gravity_scale = scale;
    }

    pub fn velocity(&self) -> Vec2 {
        self.motion.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.motion.velocity = velocity;
    }

    pub fn angular_velocity(&self) -> f32 {
        self.motion.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.motion.angular_velocity = angular_velocity;
    }

    pub fn user_data(&self) -> Option<u64> {
        self.user_data
    }

    pub fn set_user_data(&mut self, user_data: Option<u64>) {
        self.user_data = user_data;
    }

    pub fn clear_forces(&mut self) {
        self.motion.force = Vec2::ZERO;
        self.motion.torque = 0.0;
    }

    /// Accumulates a force at the body's center of mass. No-op on a body with
    /// no inverse mass (static, or explicitly infinite-mass).
    pub fn apply_force(&mut self, force: Vec2) {
        if self.motion.inverse_mass <= 0.0 {
            return;
        }
        self.motion.force += force;
    }

    /// Accumulates gravity as a force proportional to mass and gravity scale.
    /// No-op on a body with non-positive mass.
    pub fn apply_gravity(&mut self, gravity: Vec2) {
        if self.motion.mass <= 0.0 {
            return;
        }
        self.motion.force += gravity * (self.motion.mass * self.motion.gravity_scale);
    }

    /// Applies an instantaneous impulse at `contact_point`, updating velocity
    /// and angular velocity directly. No-op on a body with no inverse mass.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_point: Vec2) {
        if self.motion.inverse_mass <= 0.0 {
            return;
        }

        self.motion.velocity += impulse * self.motion.inverse_mass;
        self.motion.angular_velocity += self.motion.inverse_inertia * contact_point.cross(impulse);
    }

    /// Integrates the force accumulator into velocity via semi-implicit Euler.
    /// No-op on a body with no inverse mass or a non-positive `dt`.
    pub fn integrate_velocity(&mut self, dt: f32) {
        if self.motion.inverse_mass <= 0.0 || dt <= 0.0 {
            return;
        }

        self.motion.velocity += self.motion.force * (self.motion.inverse_mass * dt);
        self.motion.angular_velocity += self.motion.torque * self.motion.inverse_inertia * dt;
    }

    /// Integrates velocity into position and orientation. No-op on a static
    /// body or a non-positive `dt`.
    pub fn integrate_position(&mut self, dt: f32) {
        if self.body_type == BodyType::Static || dt <= 0.0 {
            return;
        }

        let position = self.tx.position + self.motion.velocity * dt;
        let angle = self.tx.angle + self.motion.angular_velocity * dt;

        self.tx.position = position;
        self.set_angle(angle);
    }

    fn recompute_mass(&mut self) {
        if self.body_type != BodyType::Dynamic {
            self.motion.mass = 0.0;
            self.motion.inverse_mass = 0.0;
            self.motion.inertia = 0.0;
            self.motion.inverse_inertia = 0.0;
            self.motion.velocity = Vec2::ZERO;
            self.motion.angular_velocity = 0.0;
            return;
        }

        let mass = if self.flags.infinite_mass {
            0.0
        } else {
            self.shape.mass()
        };
        let inertia = if self.flags.infinite_inertia {
            0.0
        } else {
            self.shape.inertia()
        };

        self.motion.mass = mass;
        self.motion.inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        self.motion.inertia = inertia;
        self.motion.inverse_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
    }

    fn recompute_aabb(&mut self) {
        self.aabb = self.shape.aabb(self.tx);
    }
}
