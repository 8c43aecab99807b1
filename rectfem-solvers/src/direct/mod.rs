//! Direct solvers for linear systems
//!
//! - [`lu_solve`]: dense LU decomposition with partial pivoting

mod lu;

pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve};
