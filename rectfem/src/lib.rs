//! Finite elements on structured rectangular meshes
//!
//! This crate solves `-div(λ ∇u) + γ u = f` on a rectangle cut into
//! subdomains, in Cartesian or axisymmetric coordinates, and hands the
//! assembled system to the solvers of `rectfem-solvers`.
//!
//! # Features
//!
//! - **Meshes**: coarse axes refined by split counts and stretch ratios,
//!   doubled between generations
//! - **Elements**: bilinear Lagrange and bicubic Hermite
//! - **Matrices**: 9-point band storage or general sparse rows
//! - **Boundary conditions**: Dirichlet, Neumann, Robin
//! - **Solvers**: CG and BiCGSTAB on the host or an accelerator, dense LU
//! - **Splines**: smoothing bicubic fits through a solution
//! - **Inverse fits**: one coefficient recovered from measured fields
//!
//! # Example
//!
//! ```
//! use rectfem::assembly::{Assembler, MatrixFormat};
//! use rectfem::basis::ElementFamily;
//! use rectfem::coords::CoordSystem;
//! use rectfem::mesh::{AxisRefinement, RectMesh, RefineParams};
//! use rectfem::problem::BuiltinTask;
//! use rectfem::solver::{SolverConfig, solve};
//!
//! let mut mesh = RectMesh::rectangle(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
//! mesh.refine(&RefineParams {
//!     x: AxisRefinement::uniform(1, 8),
//!     y: AxisRefinement::uniform(1, 8),
//! })
//! .unwrap();
//!
//! let assembler = Assembler::new(MatrixFormat::Diag, ElementFamily::Bilinear, CoordSystem::Cartesian);
//! let slae = assembler.assemble(&mesh, &BuiltinTask::Linear).unwrap();
//! let solution = solve(&slae, &SolverConfig::default()).unwrap();
//! assert!(solution.converged);
//! ```

pub mod assembly;
pub mod basis;
pub mod boundary;
pub mod config;
pub mod coords;
pub mod driver;
pub mod error;
pub mod inverse;
pub mod mesh;
pub mod postprocess;
pub mod problem;
pub mod quadrature;
pub mod solver;
pub mod spline;

pub use error::{FemError, Result};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
