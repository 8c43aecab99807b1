//! Shape function evaluation for rectangular elements
//!
//! Provides a unified interface for evaluating basis functions and their
//! physical gradients at reference points of a cell.

use super::hermite::{
    HERMITE_DOFS_PER_ELEMENT, HERMITE_DOFS_PER_NODE, bicubic, bicubic_grad,
};
use super::lagrange::{q1_unit_square, q1_unit_square_grad};
use serde::{Deserialize, Serialize};

/// Element family used by the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementFamily {
    /// Bilinear Lagrange, one dof per node
    #[default]
    Bilinear,
    /// Bicubic Hermite, four dofs per node
    Hermite,
}

impl ElementFamily {
    /// Degrees of freedom per mesh node
    pub fn dofs_per_node(self) -> usize {
        match self {
            ElementFamily::Bilinear => 1,
            ElementFamily::Hermite => HERMITE_DOFS_PER_NODE,
        }
    }

    /// Degrees of freedom per element
    pub fn dofs_per_element(self) -> usize {
        match self {
            ElementFamily::Bilinear => 4,
            ElementFamily::Hermite => HERMITE_DOFS_PER_ELEMENT,
        }
    }

    /// Global dofs of element `(xi, yi)` on a mesh with `width` nodes per row
    ///
    /// Bilinear: `[a, a+1, a+W, a+W+1]` with `a = yi*W + xi`. Hermite: the
    /// 8 dofs of the two lower nodes, then the 8 of the two upper nodes.
    pub fn element_dofs(self, xi: usize, yi: usize, width: usize) -> Vec<usize> {
        match self {
            ElementFamily::Bilinear => {
                let a = yi * width + xi;
                vec![a, a + 1, a + width, a + width + 1]
            }
            ElementFamily::Hermite => {
                let per_node = HERMITE_DOFS_PER_NODE;
                let lower = yi * width * per_node + xi * per_node;
                let upper = (yi + 1) * width * per_node + xi * per_node;
                (0..2 * per_node)
                    .map(|i| lower + i)
                    .chain((0..2 * per_node).map(|i| upper + i))
                    .collect()
            }
        }
    }
}

/// Shape functions evaluated at a point
#[derive(Debug, Clone)]
pub struct ShapeValues {
    /// Basis function values [N_0, N_1, ..., N_n]
    pub values: Vec<f64>,
    /// Physical gradients [[dN_i/dx, dN_i/dy], ...]
    pub gradients: Vec<[f64; 2]>,
}

/// Evaluate shape functions at reference point `(xi, eta)` of a cell of size `hx × hy`
///
/// Reference gradients are divided by the cell size. Hermite derivative
/// dofs stay in reference scaling.
pub fn evaluate_shape(family: ElementFamily, xi: f64, eta: f64, hx: f64, hy: f64) -> ShapeValues {
    let scale = |g: [f64; 2]| [g[0] / hx, g[1] / hy];
    match family {
        ElementFamily::Bilinear => ShapeValues {
            values: q1_unit_square(xi, eta).to_vec(),
            gradients: q1_unit_square_grad(xi, eta).into_iter().map(scale).collect(),
        },
        ElementFamily::Hermite => ShapeValues {
            values: bicubic(xi, eta).to_vec(),
            gradients: bicubic_grad(xi, eta).into_iter().map(scale).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_shape_bilinear() {
        let shape = evaluate_shape(ElementFamily::Bilinear, 0.25, 0.25, 2.0, 0.5);
        assert_eq!(shape.values.len(), 4);
        assert_eq!(shape.gradients.len(), 4);

        // Partition of unity
        let sum: f64 = shape.values.iter().sum();
        assert!((sum - 1.0).abs() < 1e-14);

        // d/dx of node 1 is (1 - eta) / hx
        assert!((shape.gradients[1][0] - 0.375).abs() < 1e-14);
        // d/dy of node 2 is (1 - xi) / hy
        assert!((shape.gradients[2][1] - 1.5).abs() < 1e-14);
    }

    #[test]
    fn test_evaluate_shape_hermite() {
        let shape = evaluate_shape(ElementFamily::Hermite, 0.5, 0.5, 1.0, 1.0);
        assert_eq!(shape.values.len(), 16);
        assert_eq!(shape.gradients.len(), 16);
    }

    #[test]
    fn test_element_dofs() {
        assert_eq!(
            ElementFamily::Bilinear.element_dofs(1, 2, 4),
            vec![9, 10, 13, 14]
        );

        let dofs = ElementFamily::Hermite.element_dofs(1, 0, 3);
        assert_eq!(dofs[..8], [4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(dofs[8..], [16, 17, 18, 19, 20, 21, 22, 23]);
    }
}
