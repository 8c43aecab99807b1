//! Lagrange basis functions on the unit reference cell
//!
//! Local node order of the bilinear element: 0 = (x0, y0), 1 = (x1, y0),
//! 2 = (x0, y1), 3 = (x1, y1), matching the row-major node numbering of the
//! rectangular mesh.

/// Evaluate the two linear basis functions on [0, 1]
pub fn linear_line(t: f64) -> [f64; 2] {
    [1.0 - t, t]
}

/// Evaluate Q1 basis functions at (xi, eta) on [0, 1]²
pub fn q1_unit_square(xi: f64, eta: f64) -> [f64; 4] {
    [
        (1.0 - xi) * (1.0 - eta),
        xi * (1.0 - eta),
        (1.0 - xi) * eta,
        xi * eta,
    ]
}

/// Evaluate Q1 basis gradients at (xi, eta) on [0, 1]²
/// Returns [[dN/dxi, dN/deta]; 4] in reference scaling
pub fn q1_unit_square_grad(xi: f64, eta: f64) -> [[f64; 2]; 4] {
    [
        [-(1.0 - eta), -(1.0 - xi)],
        [1.0 - eta, -xi],
        [-eta, 1.0 - xi],
        [eta, xi],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q1_partition_of_unity() {
        for &(xi, eta) in &[(0.0, 0.0), (0.3, 0.7), (1.0, 0.5), (0.25, 0.25)] {
            let sum: f64 = q1_unit_square(xi, eta).iter().sum();
            assert!((sum - 1.0).abs() < 1e-14);

            let grad = q1_unit_square_grad(xi, eta);
            let gx: f64 = grad.iter().map(|g| g[0]).sum();
            let gy: f64 = grad.iter().map(|g| g[1]).sum();
            assert!(gx.abs() < 1e-14);
            assert!(gy.abs() < 1e-14);
        }
    }

    #[test]
    fn test_q1_kronecker_at_nodes() {
        let nodes = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        for (i, &(xi, eta)) in nodes.iter().enumerate() {
            let vals = q1_unit_square(xi, eta);
            for (j, v) in vals.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_linear_line() {
        assert_eq!(linear_line(0.25), [0.75, 0.25]);
    }
}
