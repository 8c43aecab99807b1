//! Numerical quadrature rules for finite element integration
//!
//! Provides Gauss-Legendre rules on [-1, 1] and their tensor products mapped
//! onto the unit square used by the rectangular elements.

mod gauss;
mod rules;

pub use gauss::*;
pub use rules::*;
