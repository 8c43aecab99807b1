//! Finite element system assembly
//!
//! Element stiffness, mass and load integrals are built per cell and
//! scattered into a band or general sparse global matrix.

mod assembler;
mod cell;
mod mass;
mod stiffness;

pub use assembler::*;
pub use cell::*;
pub use mass::*;
pub use stiffness::*;
