//! Structured rectangular meshes
//!
//! Provides the refined coordinate axes, the region and boundary records
//! and the [`RectMesh`] that ties them together.

mod rect;
mod refinement;
mod types;

pub use rect::*;
pub use refinement::*;
pub use types::*;
