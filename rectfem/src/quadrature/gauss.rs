//! Gauss-Legendre quadrature points and weights
//!
//! 1D rules live on [-1, 1]; the tensor rules used by the rectangular
//! elements are mapped onto the unit square [0, 1]², so their weights sum
//! to one and an integral over a physical cell is `Σ w f · hx · hy`.

/// A single quadrature point with weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    /// Reference coordinates (xi, eta)
    pub coords: [f64; 2],
    /// Integration weight
    pub weight: f64,
}

impl QuadraturePoint {
    pub fn new_1d(xi: f64, weight: f64) -> Self {
        Self {
            coords: [xi, 0.0],
            weight,
        }
    }

    pub fn new_2d(xi: f64, eta: f64, weight: f64) -> Self {
        Self {
            coords: [xi, eta],
            weight,
        }
    }

    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }
}

/// 1D Gauss-Legendre quadrature on [-1, 1]
///
/// An `order`-point rule integrates polynomials up to degree `2 * order - 1`
/// exactly. Orders above 5 fall back to the 5-point rule.
pub fn gauss_legendre_1d(order: usize) -> Vec<QuadraturePoint> {
    match order {
        0 | 1 => vec![QuadraturePoint::new_1d(0.0, 2.0)],
        2 => {
            let x = 1.0 / 3.0_f64.sqrt();
            vec![
                QuadraturePoint::new_1d(-x, 1.0),
                QuadraturePoint::new_1d(x, 1.0),
            ]
        }
        3 => {
            let x = 0.6_f64.sqrt();
            vec![
                QuadraturePoint::new_1d(-x, 5.0 / 9.0),
                QuadraturePoint::new_1d(0.0, 8.0 / 9.0),
                QuadraturePoint::new_1d(x, 5.0 / 9.0),
            ]
        }
        4 => {
            let a = (3.0 / 7.0 - 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
            let b = (3.0 / 7.0 + 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
            let wa = (18.0 + 30.0_f64.sqrt()) / 36.0;
            let wb = (18.0 - 30.0_f64.sqrt()) / 36.0;
            vec![
                QuadraturePoint::new_1d(-b, wb),
                QuadraturePoint::new_1d(-a, wa),
                QuadraturePoint::new_1d(a, wa),
                QuadraturePoint::new_1d(b, wb),
            ]
        }
        _ => {
            let a = (5.0 - 2.0 * (10.0 / 7.0_f64).sqrt()).sqrt() / 3.0;
            let b = (5.0 + 2.0 * (10.0 / 7.0_f64).sqrt()).sqrt() / 3.0;
            let wa = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
            let wb = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
            vec![
                QuadraturePoint::new_1d(-b, wb),
                QuadraturePoint::new_1d(-a, wa),
                QuadraturePoint::new_1d(0.0, 128.0 / 225.0),
                QuadraturePoint::new_1d(a, wa),
                QuadraturePoint::new_1d(b, wb),
            ]
        }
    }
}

/// 1D Gauss-Legendre quadrature mapped onto [0, 1]
pub fn gauss_unit_interval(order: usize) -> Vec<QuadraturePoint> {
    gauss_legendre_1d(order)
        .into_iter()
        .map(|p| QuadraturePoint::new_1d(0.5 * (p.xi() + 1.0), 0.5 * p.weight))
        .collect()
}

/// Tensor-product Gauss rule on the unit square [0, 1]²
///
/// Points are ordered with `xi` varying slowest.
pub fn gauss_unit_square(order: usize) -> Vec<QuadraturePoint> {
    let line = gauss_unit_interval(order);
    let mut points = Vec::with_capacity(line.len() * line.len());
    for px in &line {
        for py in &line {
            points.push(QuadraturePoint::new_2d(
                px.xi(),
                py.xi(),
                px.weight * py.weight,
            ));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauss_1d_integrates_polynomials() {
        // 2-point rule should exactly integrate up to degree 3
        let pts = gauss_legendre_1d(2);

        // Integrate x^2 from -1 to 1 = 2/3
        let integral: f64 = pts.iter().map(|p| p.xi().powi(2) * p.weight).sum();
        assert!((integral - 2.0 / 3.0).abs() < 1e-14);

        // Integrate x^3 from -1 to 1 = 0
        let integral: f64 = pts.iter().map(|p| p.xi().powi(3) * p.weight).sum();
        assert!(integral.abs() < 1e-14);
    }

    #[test]
    fn test_three_point_rule_is_exact_to_degree_five() {
        let pts = gauss_unit_interval(3);
        for degree in 0..=5 {
            let integral: f64 = pts.iter().map(|p| p.xi().powi(degree) * p.weight).sum();
            let exact = 1.0 / (degree as f64 + 1.0);
            assert!(
                (integral - exact).abs() < 1e-14,
                "degree {degree}: {integral} vs {exact}"
            );
        }
    }

    #[test]
    fn test_unit_square_weights_sum() {
        for order in 1..=5 {
            let pts = gauss_unit_square(order);
            assert_eq!(pts.len(), order * order);
            let sum: f64 = pts.iter().map(|p| p.weight).sum();
            // Weights should sum to 1 (area of [0,1]^2)
            assert!(
                (sum - 1.0).abs() < 1e-14,
                "Order {} failed: sum = {}",
                order,
                sum
            );
            assert!(
                pts.iter()
                    .all(|p| (0.0..=1.0).contains(&p.xi()) && (0.0..=1.0).contains(&p.eta()))
            );
        }
    }

    #[test]
    fn test_unit_square_bilinear_moment() {
        // ∫∫ x y (1 - x) dx dy over the unit square = 1/6 * 1/2
        let integral: f64 = gauss_unit_square(3)
            .iter()
            .map(|p| p.xi() * p.eta() * (1.0 - p.xi()) * p.weight)
            .sum();
        assert!((integral - 1.0 / 12.0).abs() < 1e-14);
    }
}
