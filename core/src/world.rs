//! The simulation owner: bodies, broad phase, contact cache, and the
//! fixed-step loop that drives them.

use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::body::Body;
use crate::broadphase::SpatialHash;
use crate::collision::{compute_collision, raycast_shape, Ray, RayHit};
use crate::constants::{DEFAULT_GRAVITY, ITERATION_COUNT, MAX_OBJECT_COUNT};
use crate::error::PhysicsError;
use crate::shape::Aabb;
use crate::solver::{resolve_collision, ContactConstraint};
use crate::vec2::Vec2;

/// An unordered pair of body indices, always stored with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyPair {
    pub first: usize,
    pub second: usize,
}

impl BodyPair {
    fn new(a: usize, b: usize) -> Self {
        if a < b {
            BodyPair { first: a, second: b }
        } else {
            BodyPair { first: b, second: a }
        }
    }
}

/// The persisted, solver-ready state of one colliding pair: the separating
/// direction and combined material terms from [`Manifold`](crate::collision::Manifold)
/// generation, plus per-contact accumulated impulses carried forward for
/// warm-starting.
///
/// A [`CollisionHandler::pre_step`] callback may clear `contacts` to cancel
/// resolution for this tick, mirroring the source's `manifold.count = 0`.
#[derive(Debug, Clone)]
pub struct PairState {
    pub direction: Vec2,
    pub friction: f32,
    pub restitution: f32,
    pub contacts: ArrayVec<ContactConstraint, 2>,
}

/// A capability the world dispatches to at the pre-step and post-step points
/// of [`World::step`], in place of the source's function-pointer-plus-context
/// callbacks.
#[derive(Default)]
pub struct CollisionHandler {
    pre_step: Option<Box<dyn FnMut(BodyPair, &mut PairState)>>,
    post_step: Option<Box<dyn FnMut(BodyPair, &PairState)>>,
}

impl CollisionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the pre-step callback, invoked once per cached pair after
    /// cache reconciliation and before velocity integration.
    pub fn on_pre_step(mut self, f: impl FnMut(BodyPair, &mut PairState) + 'static) -> Self {
        self.pre_step = Some(Box::new(f));
        self
    }

    /// Installs the post-step callback, invoked once per cached pair after
    /// position integration.
    pub fn on_post_step(mut self, f: impl FnMut(BodyPair, &PairState) + 'static) -> Self {
        self.post_step = Some(Box::new(f));
        self
    }
}

/// Owns the body population, the broad-phase hash, and the contact cache; runs
/// the fixed-step pipeline described in the crate's module overview.
pub struct World {
    gravity: Vec2,
    bodies: Vec<Body>,
    spatial_hash: SpatialHash,
    contact_cache: HashMap<BodyPair, PairState>,
    collision_handler: CollisionHandler,
    accumulator: f32,
    timestamp: Option<f64>,
}

impl World {
    /// Creates an empty world. `cell_size` must be positive (forwarded to the
    /// broad-phase [`SpatialHash`]).
    pub fn new(gravity: Vec2, cell_size: f32) -> Result<Self, PhysicsError> {
        Ok(Self {
            gravity,
            bodies: Vec::new(),
            spatial_hash: SpatialHash::new(cell_size)?,
            contact_cache: HashMap::new(),
            collision_handler: CollisionHandler::default(),
            accumulator: 0.0,
            timestamp: None,
        })
    }

    /// Creates a world with [`DEFAULT_GRAVITY`] and the given cell size.
    pub fn with_default_gravity(cell_size: f32) -> Result<Self, PhysicsError> {
        Self::new(DEFAULT_GRAVITY, cell_size)
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_collision_handler(&mut self, handler: CollisionHandler) {
        self.collision_handler = handler;
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn get_body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn get_body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Adds `body` to the world, returning its index. Fails once the world
    /// already holds [`MAX_OBJECT_COUNT`] bodies.
    pub fn add_body(&mut self, body: Body) -> Result<usize, PhysicsError> {
        if self.bodies.len() >= MAX_OBJECT_COUNT {
            log::debug!("add_body rejected: world at capacity ({MAX_OBJECT_COUNT})");
            return Err(PhysicsError::WorldFull);
        }

        self.bodies.push(body);
        let index = self.bodies.len() - 1;
        log::trace!("added body {index}");
        Ok(index)
    }

    /// Removes the body at `index` in O(1) via swap-with-last. Any cache
    /// entry keyed directly on `index` is dropped immediately; an entry that
    /// referenced the body formerly at the last slot is left for the next
    /// `step` to reconcile, since that slot's occupant has changed identity.
    pub fn remove_body(&mut self, index: usize) -> Result<Body, PhysicsError> {
        if index >= self.bodies.len() {
            return Err(PhysicsError::BodyNotFound);
        }

        self.contact_cache
            .retain(|pair, _| pair.first != index && pair.second != index);
        log::trace!("removed body {index}");
        Ok(self.bodies.swap_remove(index))
    }

    /// Drops every body and resets the cache, hash, and accumulator to an
    /// empty world.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.contact_cache.clear();
        self.spatial_hash.clear();
        self.accumulator = 0.0;
        self.timestamp = None;
    }

    /// Advances the simulation by exactly one logical step of `dt` seconds.
    /// No-op when `dt` is not positive.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        log::trace!("step dt={dt}");

        self.discover_pairs();
        self.dispatch_pre_step();

        for body in self.bodies.iter_mut() {
            body.apply_gravity(self.gravity);
            body.integrate_velocity(dt);
        }

        self.warm_start();

        let inverse_dt = 1.0 / dt;
        for _ in 0..ITERATION_COUNT {
            self.resolve_iteration(inverse_dt);
        }

        for body in self.bodies.iter_mut() {
            body.integrate_position(dt);
        }

        self.dispatch_post_step();

        for body in self.bodies.iter_mut() {
            body.clear_forces();
        }
        self.spatial_hash.clear();
    }

    /// Drains real elapsed time (computed from the caller-supplied monotonic
    /// `now`, in seconds) into `step(dt)` calls, at most one logical step per
    /// `dt` worth of accumulated time. `now` is an externally sourced clock;
    /// the core never reads the system clock itself.
    pub fn update(&mut self, dt: f32, now: f64) {
        if dt <= 0.0 {
            return;
        }

        let elapsed = match self.timestamp {
            Some(previous) => (now - previous).max(0.0) as f32,
            None => 0.0,
        };
        self.timestamp = Some(now);
        self.accumulator += elapsed;

        while self.accumulator >= dt {
            self.step(dt);
            self.accumulator -= dt;
        }
    }

    /// Casts `ray` against every body's current shape, invoking `callback`
    /// once per hit with the body's index, in no particular order. Rebuilds
    /// a scratch spatial hash rather than the world's own, so this may be
    /// called between steps but is not reentrant with an in-progress `step`.
    pub fn raycast(&self, ray: &Ray, mut callback: impl FnMut(usize, RayHit)) {
        let Ok(mut scratch) = SpatialHash::new(self.spatial_hash.cell_size()) else {
            return;
        };

        for (index, body) in self.bodies.iter().enumerate() {
            scratch.insert(body.aabb(), index);
        }

        let direction = ray.direction.normalize();
        let end = ray.origin + direction * ray.max_distance;
        let min = Vec2::new(ray.origin.x.min(end.x), ray.origin.y.min(end.y));
        let max = Vec2::new(ray.origin.x.max(end.x), ray.origin.y.max(end.y));
        let traversal_aabb = Aabb {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        };

        let mut candidates = Vec::new();
        scratch.query(traversal_aabb, |index| candidates.push(index));

        for index in candidates {
            let body = &self.bodies[index];
            if let Some(hit) = raycast_shape(body.shape(), body.transform(), ray) {
                callback(index, hit);
            }
        }
    }

    /// Tests whether `point` lies within the body at `index`'s shape.
    pub fn body_contains_point(&self, index: usize, point: Vec2) -> bool {
        self.bodies
            .get(index)
            .is_some_and(|body| body.contains_point(point))
    }

    fn discover_pairs(&mut self) {
        self.spatial_hash.clear();
        for (index, body) in self.bodies.iter().enumerate() {
            self.spatial_hash.insert(body.aabb(), index);
        }

        let count = self.bodies.len();
        for first in 0..count {
            let aabb = self.bodies[first].aabb();
            let mut candidates = Vec::new();
            self.spatial_hash.query(aabb, |index| candidates.push(index));

            for second in candidates {
                if second <= first {
                    continue;
                }

                let inverse_mass_sum =
                    self.bodies[first].inverse_mass() + self.bodies[second].inverse_mass();
                if inverse_mass_sum <= 0.0 {
                    continue;
                }

                let pair = BodyPair::new(first, second);
                let manifold = compute_collision(
                    self.bodies[first].shape(),
                    self.bodies[first].transform(),
                    self.bodies[second].shape(),
                    self.bodies[second].transform(),
                );

                match manifold {
                    None => {
                        if self.contact_cache.remove(&pair).is_some() {
                            log::trace!("evicted cache entry for {pair:?}");
                        }
                    }
                    Some(manifold) => {
                        let prior = self.contact_cache.get(&pair);

                        let (friction, restitution) = match prior {
                            Some(state) => (state.friction, state.restitution),
                            None => {
                                let m1 = self.bodies[first].shape().material();
                                let m2 = self.bodies[second].shape().material();
                                log::trace!("created cache entry for {pair:?}");
                                (
                                    (0.5 * (m1.friction + m2.friction)).max(0.0),
                                    m1.restitution.min(m2.restitution).max(0.0),
                                )
                            }
                        };

                        let mut contacts: ArrayVec<ContactConstraint, 2> = ArrayVec::new();
                        for contact in manifold.contacts.iter() {
                            let carried = prior.and_then(|state| {
                                state.contacts.iter().find(|c| c.id == contact.id)
                            });

                            let mut constraint = ContactConstraint::new(
                                contact.point,
                                contact.depth,
                                contact.id,
                            );
                            if let Some(carried) = carried {
                                constraint.normal_impulse = carried.normal_impulse;
                                constraint.tangent_impulse = carried.tangent_impulse;
                            }
                            contacts.push(constraint);
                        }

                        self.contact_cache.insert(
                            pair,
                            PairState {
                                direction: manifold.direction,
                                friction,
                                restitution,
                                contacts,
                            },
                        );
                    }
                }
            }
        }
    }

    fn dispatch_pre_step(&mut self) {
        let Some(handler) = self.collision_handler.pre_step.as_mut() else {
            return;
        };
        for (&pair, state) in self.contact_cache.iter_mut() {
            handler(pair, state);
        }
    }

    fn dispatch_post_step(&mut self) {
        let Some(handler) = self.collision_handler.post_step.as_mut() else {
            return;
        };
        for (&pair, state) in self.contact_cache.iter() {
            handler(pair, state);
        }
    }

    fn warm_start(&mut self) {
        for (pair, state) in self.contact_cache.iter() {
            let tangent = Vec2::new(state.direction.y, -state.direction.x);
            let (body1, body2) = two_bodies_mut(&mut self.bodies, pair.first, pair.second);

            for contact in state.contacts.iter() {
                let impulse =
                    state.direction * contact.normal_impulse + tangent * contact.tangent_impulse;
                let rel1 = contact.point - body1.position();
                let rel2 = contact.point - body2.position();
                body1.apply_impulse(-impulse, rel1);
                body2.apply_impulse(impulse, rel2);
            }
        }
    }

    fn resolve_iteration(&mut self, inverse_dt: f32) {
        for (pair, state) in self.contact_cache.iter_mut() {
            let (body1, body2) = two_bodies_mut(&mut self.bodies, pair.first, pair.second);
            resolve_collision(
                body1,
                body2,
                state.direction,
                state.contacts.as_mut_slice(),
                state.friction,
                state.restitution,
                inverse_dt,
            );
        }
    }
}

/// Borrows the bodies at two distinct indices mutably at once. `first` must
/// be strictly less than `second` (always true for a [`BodyPair`]).
fn two_bodies_mut(bodies: &mut [Body], first: usize, second: usize) -> (&mut Body, &mut Body) {
    let (left, right) = bodies.split_at_mut(second);
    (&mut left[first], &mut right[0])
}
