//! Coordinate systems of the 2D problem
//!
//! The assembler only needs the volume weight of a point: `1` on the
//! Cartesian `(x, y)` plane, `r` on the axisymmetric `(r, z)` half-plane.

use serde::{Deserialize, Serialize};

/// Volume weight of a point `(a, b)`
pub type Jacobian = fn(f64, f64) -> f64;

fn cartesian(_x: f64, _y: f64) -> f64 {
    1.0
}

fn axisymmetric(r: f64, _z: f64) -> f64 {
    r
}

/// Coordinate system the equation is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSystem {
    /// (x, y)
    #[default]
    Cartesian,
    /// (r, z), the first axis is the radius
    #[serde(alias = "rz")]
    Axisymmetric,
}

impl CoordSystem {
    /// The Jacobian of this system
    pub fn jacobian(self) -> Jacobian {
        match self {
            CoordSystem::Cartesian => cartesian,
            CoordSystem::Axisymmetric => axisymmetric,
        }
    }

    /// Evaluate the Jacobian at a point
    #[inline]
    pub fn weight(self, a: f64, b: f64) -> f64 {
        (self.jacobian())(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(CoordSystem::Cartesian.weight(3.0, 4.0), 1.0);
        assert_eq!(CoordSystem::Axisymmetric.weight(3.0, 4.0), 3.0);
    }

    #[test]
    fn test_deserialize_names() {
        let rz: CoordSystem = serde_json::from_str("\"rz\"").unwrap();
        assert_eq!(rz, CoordSystem::Axisymmetric);
        let xy: CoordSystem = serde_json::from_str("\"cartesian\"").unwrap();
        assert_eq!(xy, CoordSystem::Cartesian);
    }
}
