//! Finite element basis functions
//!
//! Bilinear Lagrange and bicubic Hermite functions on the unit reference
//! cell [0, 1]², plus the element-to-dof maps of the rectangular mesh.

mod hermite;
mod lagrange;
mod shape;

pub use hermite::*;
pub use lagrange::*;
pub use shape::*;
