//! Core library for impulse2d: a 2D impulse-based rigid-body physics engine.
//!
//! The pipeline is `World` owning a [`broadphase::SpatialHash`] for candidate
//! pair discovery, [`collision`] for exact manifold generation, [`solver`] for
//! sequential-impulse resolution, and [`body`]/[`shape`] for the per-object
//! state the rest of the crate operates on.

pub mod body;
pub mod broadphase;
pub mod collision;
pub mod constants;
pub mod error;
pub mod shape;
pub mod solver;
pub mod vec2;
pub mod world;

pub use body::{Body, BodyFlags, BodyType, MotionData};
pub use broadphase::SpatialHash;
pub use collision::{compute_collision, raycast_shape, Contact, Manifold, Ray, RayHit};
pub use error::PhysicsError;
pub use shape::{Aabb, Material, Shape, ShapeType};
pub use solver::ContactConstraint;
pub use vec2::{Transform, Vec2};
pub use world::{BodyPair, CollisionHandler, PairState, World};
