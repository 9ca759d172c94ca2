//! Procedural path generators for the space-filling and number-sequence
//! demos. Both produce plain points; drawing them is the renderer's job.

pub mod hilbert;
pub mod recaman;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("hilbert curve order must be between 1 and {max}, got {order}")]
    InvalidOrder { order: u32, max: u32 },
}
