//! Cubic Hermite basis functions
//!
//! The 1D functions on [0, 1] interpolate, in order: the value at 0, the
//! derivative at 0, the value at 1, the derivative at 1. The bicubic element
//! is their tensor product with 4 dofs per node (value, ∂x, ∂y, ∂xy) and
//! 16 per element; local functions 0..8 belong to the lower node row and
//! 8..16 to the upper one.

/// Number of dofs carried by a Hermite node
pub const HERMITE_DOFS_PER_NODE: usize = 4;

/// Number of dofs of a bicubic Hermite element
pub const HERMITE_DOFS_PER_ELEMENT: usize = 16;

/// Evaluate the four cubic Hermite functions at `a`
pub fn cubic_1d(a: f64) -> [f64; 4] {
    let a2 = a * a;
    let a3 = a2 * a;
    [
        1.0 - 3.0 * a2 + 2.0 * a3,
        a - 2.0 * a2 + a3,
        3.0 * a2 - 2.0 * a3,
        -a2 + a3,
    ]
}

/// Derivatives of [`cubic_1d`] with respect to `a`
pub fn cubic_1d_grad(a: f64) -> [f64; 4] {
    let a2 = a * a;
    [
        -6.0 * a + 6.0 * a2,
        1.0 - 4.0 * a + 3.0 * a2,
        6.0 * a - 6.0 * a2,
        -2.0 * a + 3.0 * a2,
    ]
}

/// 1D factors `(mu, nu)` of local bicubic function `i`
#[inline]
pub fn bicubic_factors(i: usize) -> (usize, usize) {
    let mu = 2 * (i / 4 % 2) + i % 2;
    let nu = 2 * (i / 8) + (i / 2) % 2;
    (mu, nu)
}

/// Evaluate the 16 bicubic Hermite functions at (xi, eta) on [0, 1]²
pub fn bicubic(xi: f64, eta: f64) -> [f64; HERMITE_DOFS_PER_ELEMENT] {
    let fx = cubic_1d(xi);
    let fy = cubic_1d(eta);
    std::array::from_fn(|i| {
        let (mu, nu) = bicubic_factors(i);
        fx[mu] * fy[nu]
    })
}

/// Reference gradients of the 16 bicubic Hermite functions
pub fn bicubic_grad(xi: f64, eta: f64) -> [[f64; 2]; HERMITE_DOFS_PER_ELEMENT] {
    let fx = cubic_1d(xi);
    let fy = cubic_1d(eta);
    let gx = cubic_1d_grad(xi);
    let gy = cubic_1d_grad(eta);
    std::array::from_fn(|i| {
        let (mu, nu) = bicubic_factors(i);
        [gx[mu] * fy[nu], fx[mu] * gy[nu]]
    })
}
