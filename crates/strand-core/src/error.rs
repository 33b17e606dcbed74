//! Error types for strand extraction and fiber synthesis.

use thiserror::Error;

/// Errors reported by the engine. Every variant aborts the whole batch:
/// nothing is written to a destination when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum HairError {
    /// The batch was invoked without any source shape.
    #[error("no source shape selected")]
    NoSourceSelected,

    /// None of the sources carried a marked boundary edge.
    #[error("could not find any marked edges")]
    NoMarkedGeometryFound,

    /// Two strands of the same batch have a different number of steps.
    #[error("some strands have a different number of vertices: expected {expected}, found {found}")]
    InconsistentStrandLength {
        /// Step count of the first accepted strand.
        expected: usize,
        /// Step count of the offending strand.
        found: usize,
    },

    /// Strands must be at least two faces long.
    #[error("strands must be at least two faces long, got {steps} steps")]
    StrandTooShort {
        /// Step count of the strands in the batch.
        steps: usize,
    },

    /// The batch would create more fibers than allowed.
    #[error("trying to create {requested} fibers, the limit is {limit}; try to increase the spacing")]
    FiberCountExceeded {
        /// Total number of fibers requested by the batch.
        requested: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// A curve or surface cannot be converted into a marked ribbon mesh.
    #[error("unsupported source shape: {0}")]
    UnsupportedSourceShape(String),

    /// The polygon description is not a valid mesh.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A randomization or extraction parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, HairError>;
