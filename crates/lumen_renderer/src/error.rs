//! Errors for the few fatal precondition violations of scene setup.
//!
//! Numerical edge cases during rendering (misses, grazing angles,
//! zero-probability samples) never surface here; they resolve to zero
//! contribution at the point where they occur.

use thiserror::Error;

/// Errors that can occur while building the spatial accelerator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcceleratorError {
    #[error("Cannot build an accelerator over an empty primitive set")]
    EmptyPrimitiveSet,

    #[error("Primitive {index} has no bounding box and cannot be placed in the tree")]
    UnboundedPrimitive { index: usize },
}

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Scene has no light sources")]
    NoLights,

    #[error("Accelerator construction failed: {0}")]
    Accelerator(#[from] AcceleratorError),
}

pub type SceneResult<T> = Result<T, SceneError>;
