use thiserror::Error;

/// Errors raised while building profiles and running the geometry filters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("profile has no points")]
    EmptyProfile,

    #[error("profile point at position {position} has id {id}; ids must be contiguous from 0")]
    NonContiguousId { position: usize, id: usize },

    #[error("{kind} profile needs at least {required} points, got {actual}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("extrusion resolution must be at least 1")]
    InvalidResolution,

    #[error("tube needs at least 3 sides and a positive radius (sides = {sides}, radius = {radius})")]
    InvalidTube { sides: u32, radius: f32 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
