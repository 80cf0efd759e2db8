//! Error taxonomy for the handful of operations that are genuinely fallible.
//!
//! Everything else in this crate follows the source's no-op / sentinel / zero-default
//! convention instead of threading a `Result` through every accessor.

use thiserror::Error;

/// Failure modes surfaced from construction and world-mutation entry points.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// A shape constructor was called with invalid parameters (non-positive radius or
    /// dimensions, fewer than 3 polygon vertices, too many polygon vertices).
    #[error("invalid shape parameters")]
    InvalidShape,

    /// A spatial hash or world was constructed with a non-positive cell size.
    #[error("cell size must be positive")]
    InvalidCellSize,

    /// `World::add_body` was called while the world already holds `MAX_OBJECT_COUNT` bodies.
    #[error("world is at capacity")]
    WorldFull,

    /// An operation referenced a body handle that does not exist in the world.
    #[error("body not found")]
    BodyNotFound,
}
