//! Element mass matrix and load vector
//!
//! M_ij = ∫ γ φ_i φ_j J dΩ and b_i = ∫ f φ_i J dΩ over one cell.
//!
//! For bilinear elements the source enters through its bilinear
//! interpolant of the corner values, so a Cartesian cell gets the classic
//! `hx·hy/36 · (4f1 + 2f2 + 2f3 + f4)` pattern. Hermite elements sample the
//! source at the quadrature points.

use super::cell::CellQuadrature;
use crate::basis::{ElementFamily, q1_unit_square};
use crate::problem::Coefficients;
use ndarray::{Array1, Array2};

/// Local mass matrix of a cell
pub fn local_mass<C>(cell: &CellQuadrature, coeffs: &C) -> Array2<f64>
where
    C: Coefficients + ?Sized,
{
    let n = cell.dofs();
    let mut m_local = Array2::zeros((n, n));

    for qp in &cell.points {
        let [x, y] = qp.physical;
        let scale = coeffs.gamma(cell.region, x, y) * qp.weight;
        let phi = &qp.shape.values;

        for i in 0..n {
            for j in 0..n {
                m_local[[i, j]] += scale * phi[i] * phi[j];
            }
        }
    }

    m_local
}

/// Local load vector of a cell
pub fn local_load<C>(family: ElementFamily, cell: &CellQuadrature, coeffs: &C) -> Array1<f64>
where
    C: Coefficients + ?Sized,
{
    let n = cell.dofs();
    let mut b_local = Array1::zeros(n);

    let corner_f = match family {
        ElementFamily::Bilinear => Some(
            cell.corners()
                .map(|[x, y]| coeffs.source(cell.region, x, y)),
        ),
        ElementFamily::Hermite => None,
    };

    for qp in &cell.points {
        let f = match corner_f {
            Some(corner_f) => {
                let [xi, eta] = qp.reference;
                q1_unit_square(xi, eta)
                    .iter()
                    .zip(corner_f)
                    .map(|(w, f)| w * f)
                    .sum::<f64>()
            }
            None => coeffs.source(cell.region, qp.physical[0], qp.physical[1]),
        };

        let scale = f * qp.weight;
        for (b, phi) in b_local.iter_mut().zip(&qp.shape.values) {
            *b += scale * phi;
        }
    }

    b_local
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordSystem;
    use crate::problem::{BuiltinTask, Coefficients};
    use crate::quadrature::QuadratureRule;
    use approx::assert_relative_eq;

    /// f = x y + 1, γ = 1 everywhere
    struct ProductSource;

    impl Coefficients for ProductSource {
        fn lambda(&self, _: usize, _: f64, _: f64) -> f64 {
            1.0
        }
        fn gamma(&self, _: usize, _: f64, _: f64) -> f64 {
            1.0
        }
        fn source(&self, _: usize, x: f64, y: f64) -> f64 {
            x * y + 1.0
        }
        fn dirichlet(&self, _: usize, _: f64, _: f64) -> f64 {
            0.0
        }
        fn neumann(&self, _: usize, _: f64, _: f64) -> f64 {
            0.0
        }
        fn robin_beta(&self, _: usize) -> f64 {
            0.0
        }
        fn robin_value(&self, _: usize, _: f64, _: f64) -> f64 {
            0.0
        }
    }

    fn cell(p0: [f64; 2], p1: [f64; 2]) -> CellQuadrature {
        CellQuadrature::new(
            ElementFamily::Bilinear,
            CoordSystem::Cartesian,
            &QuadratureRule::order5(),
            p0,
            p1,
            0,
        )
    }

    #[test]
    fn test_bilinear_mass_closed_form() {
        let (hx, hy) = (2.0, 0.5);
        let m = local_mass(&cell([0.0, 0.0], [hx, hy]), &BuiltinTask::Linear);
        let area = hx * hy;
        assert_relative_eq!(m[[0, 0]], area / 9.0, epsilon = 1e-14);
        assert_relative_eq!(m[[0, 1]], area / 18.0, epsilon = 1e-14);
        assert_relative_eq!(m[[0, 3]], area / 36.0, epsilon = 1e-14);
        assert_relative_eq!(m.sum(), area, epsilon = 1e-13);
    }

    #[test]
    fn test_load_matches_corner_pattern() {
        let (p0, p1) = ([1.0, 2.0], [1.5, 3.0]);
        let c = cell(p0, p1);
        let b = local_load(ElementFamily::Bilinear, &c, &ProductSource);

        let f = c.corners().map(|[x, y]| x * y + 1.0);
        let s = 0.5 * 1.0 / 36.0;
        let expected = [
            s * (4.0 * f[0] + 2.0 * f[1] + 2.0 * f[2] + f[3]),
            s * (2.0 * f[0] + 4.0 * f[1] + f[2] + 2.0 * f[3]),
            s * (2.0 * f[0] + f[1] + 4.0 * f[2] + 2.0 * f[3]),
            s * (f[0] + 2.0 * f[1] + 2.0 * f[2] + 4.0 * f[3]),
        ];
        for i in 0..4 {
            assert_relative_eq!(b[i], expected[i], epsilon = 1e-13);
        }
    }

    #[test]
    fn test_hermite_load_of_constant() {
        let c = CellQuadrature::new(
            ElementFamily::Hermite,
            CoordSystem::Cartesian,
            &QuadratureRule::order5(),
            [0.0, 0.0],
            [1.0, 1.0],
            0,
        );
        // u = x² + y² with λ = 1 has the constant source -4
        let b = local_load(ElementFamily::Hermite, &c, &BuiltinTask::Quadratic);
        // value functions integrate to 1/4 each, so they carry -1
        for i in [0, 4, 8, 12] {
            assert_relative_eq!(b[i], -1.0, epsilon = 1e-13);
        }
    }
}
