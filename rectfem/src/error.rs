//! Error type for mesh setup, assembly and task loading

use solvers::{LuError, SolverError};
use thiserror::Error;

/// Fatal conditions raised while building or solving a task
///
/// Non-convergence of an iterative solve is not an error; it is reported in
/// the solve report.
#[derive(Debug, Error)]
pub enum FemError {
    #[error(
        "Boundary condition {num} spans x {x1}..{x2}, y {y1}..{y2}: it must be degenerate in exactly one axis"
    )]
    MalformedBoundary {
        num: usize,
        x1: usize,
        x2: usize,
        y1: usize,
        y2: usize,
    },
    #[error("Boundary condition {num} has unknown type {kind}")]
    UnknownBoundaryType { num: usize, kind: u8 },
    #[error("Hermite elements need a uniform mesh, the {axis} axis is not uniform")]
    NonUniformHermite { axis: char },
    #[error("Unsupported combination: {0}")]
    Unsupported(String),
    #[error("Invalid {axis} axis: {reason}")]
    InvalidAxis { axis: char, reason: String },
    #[error("Refinement of the {axis} axis has {got} entries for {expected} intervals")]
    RefinementMismatch {
        axis: char,
        expected: usize,
        got: usize,
    },
    #[error("Subdomain {num} references coarse index {index} outside the {axis} axis")]
    SubdomainOutOfRange { num: usize, axis: char, index: usize },
    #[error("Sample values have {got} entries, the source mesh has {expected} nodes")]
    SampleMismatch { expected: usize, got: usize },
    #[error("Sensor ({x}, {y}) lies outside the mesh")]
    SensorOutsideMesh { x: f64, y: f64 },
    #[error("Invalid fit: {0}")]
    InvalidFit(String),
    #[error("Failed to read task file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse task: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("Direct solve failed: {0}")]
    Lu(#[from] LuError),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FemError>;
