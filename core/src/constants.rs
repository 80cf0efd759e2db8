//! Compile-time tunables for the simulation.

use crate::vec2::Vec2;

/// Maximum vertex count for a convex polygon shape.
pub const MAX_VERTEX_COUNT: usize = 8;

/// Conversion factor between pixels and simulation units.
pub const PIXELS_PER_UNIT: f32 = 16.0;

/// Baumgarte position-bias factor applied to the normal impulse.
pub const BAUMGARTE_FACTOR: f32 = 0.24;

/// Penetration slop tolerated before the Baumgarte bias kicks in.
pub const BAUMGARTE_SLOP: f32 = 0.01;

/// Number of sequential-impulse solver iterations per step.
pub const ITERATION_COUNT: usize = 12;

/// Maximum number of bodies a single `World` may hold.
pub const MAX_OBJECT_COUNT: usize = 4096;

/// Default gravity vector for a newly created `World`.
pub const DEFAULT_GRAVITY: Vec2 = Vec2 { x: 0.0, y: 9.8 };
