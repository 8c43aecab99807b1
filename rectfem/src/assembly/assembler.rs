//! Global system assembler
//!
//! Element matrices are computed independently (in parallel with the
//! `rayon` feature) and scattered into the global matrix in row-major
//! element order, so both storage formats receive identical sums.

use super::cell::CellQuadrature;
use super::mass::{local_load, local_mass};
use super::stiffness::local_stiffness;
use crate::basis::ElementFamily;
use crate::boundary::apply_boundary_conditions;
use crate::coords::CoordSystem;
use crate::error::{FemError, Result};
use crate::mesh::RectMesh;
use crate::problem::Coefficients;
use crate::quadrature::{ELEMENT_ORDER, QuadratureRule};
use ndarray::{Array1, Array2};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use solvers::{DiagMatrix, GlobalMatrix, MsrMatrix, SparseMatrix};
use std::time::Instant;

/// Storage format of the assembled matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixFormat {
    /// 9-point bands, bilinear elements only
    #[default]
    Diag,
    /// General sparse rows
    Msr,
}

/// An assembled linear system `A x = b`
#[derive(Debug, Clone)]
pub struct Slae {
    pub matrix: SparseMatrix,
    pub rhs: Vec<f64>,
}

impl Slae {
    /// Number of unknowns
    pub fn size(&self) -> usize {
        self.rhs.len()
    }
}

/// Element matrix and load with their global dofs
struct ElementContribution {
    dofs: Vec<usize>,
    matrix: Array2<f64>,
    load: Array1<f64>,
}

/// Assembles `-div(λ ∇u) + γ u = f` on a rectangular mesh
#[derive(Debug, Clone)]
pub struct Assembler {
    pub format: MatrixFormat,
    pub family: ElementFamily,
    pub coords: CoordSystem,
    rule: QuadratureRule,
}

impl Assembler {
    pub fn new(format: MatrixFormat, family: ElementFamily, coords: CoordSystem) -> Self {
        Self {
            format,
            family,
            coords,
            rule: QuadratureRule::new(ELEMENT_ORDER),
        }
    }

    /// Replace the element quadrature rule
    pub fn with_rule(mut self, rule: QuadratureRule) -> Self {
        self.rule = rule;
        self
    }

    /// Number of unknowns on `mesh`
    pub fn dof_count(&self, mesh: &RectMesh) -> usize {
        mesh.node_count() * self.family.dofs_per_node()
    }

    /// Reject combinations the assembler cannot build
    pub fn check(&self, mesh: &RectMesh) -> Result<()> {
        if self.family == ElementFamily::Hermite {
            if self.format == MatrixFormat::Diag {
                return Err(FemError::Unsupported(
                    "Hermite elements need the msr matrix format".to_string(),
                ));
            }
            if !mesh.boundaries().is_empty() {
                return Err(FemError::Unsupported(
                    "boundary conditions are only implemented for bilinear elements".to_string(),
                ));
            }
            mesh.ensure_uniform()?;
        }
        Ok(())
    }

    /// Empty matrix with the pattern of `mesh`
    pub fn allocate(&self, mesh: &RectMesh) -> SparseMatrix {
        match self.format {
            MatrixFormat::Diag => DiagMatrix::for_grid(mesh.width(), mesh.height()).into(),
            MatrixFormat::Msr => {
                let width = mesh.width();
                let maps: Vec<Vec<usize>> = mesh
                    .elements()
                    .map(|(xi, yi)| self.family.element_dofs(xi, yi, width))
                    .collect();
                MsrMatrix::from_element_dofs(
                    self.dof_count(mesh),
                    maps.iter().map(|d| d.as_slice()),
                )
                .into()
            }
        }
    }

    /// Build the global system including boundary conditions
    pub fn assemble<C>(&self, mesh: &RectMesh, coeffs: &C) -> Result<Slae>
    where
        C: Coefficients + ?Sized,
    {
        self.check(mesh)?;
        let start = Instant::now();

        let mut matrix = self.allocate(mesh);
        let mut rhs = vec![0.0; self.dof_count(mesh)];

        let elements: Vec<(usize, usize)> = mesh.elements().collect();
        #[cfg(feature = "rayon")]
        let contributions: Vec<Option<ElementContribution>> = elements
            .par_iter()
            .map(|&(xi, yi)| self.element_contribution(mesh, coeffs, xi, yi))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let contributions: Vec<Option<ElementContribution>> = elements
            .iter()
            .map(|&(xi, yi)| self.element_contribution(mesh, coeffs, xi, yi))
            .collect();

        let mut skipped = 0;
        for contribution in contributions {
            let Some(c) = contribution else {
                skipped += 1;
                continue;
            };
            match &mut matrix {
                SparseMatrix::Msr(m) => m.scatter(&c.dofs, &c.matrix),
                SparseMatrix::Diag(m) => {
                    for (i, &row) in c.dofs.iter().enumerate() {
                        for (j, &col) in c.dofs.iter().enumerate() {
                            m.add(row, col, c.matrix[[i, j]]);
                        }
                    }
                }
            }
            for (&row, &b) in c.dofs.iter().zip(c.load.iter()) {
                rhs[row] += b;
            }
        }

        let fixed = fix_zero_diagonal(&mut matrix, &mut rhs);
        log::debug!(
            "{} elements outside every region, {} empty rows pinned to zero",
            skipped,
            fixed
        );

        apply_boundary_conditions(mesh, coeffs, &mut matrix, &mut rhs)?;

        log::info!(
            "Assembled {} unknowns ({:?}, {:?}) in {:.1}ms",
            rhs.len(),
            self.family,
            self.format,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Slae { matrix, rhs })
    }

    fn element_contribution<C>(
        &self,
        mesh: &RectMesh,
        coeffs: &C,
        xi: usize,
        yi: usize,
    ) -> Option<ElementContribution>
    where
        C: Coefficients + ?Sized,
    {
        let region = mesh.subdomain_at_element(xi, yi)?;
        let (p0, p1) = mesh.element_bounds(xi, yi);
        let cell = CellQuadrature::new(self.family, self.coords, &self.rule, p0, p1, region);

        let matrix = local_stiffness(&cell, coeffs) + local_mass(&cell, coeffs);
        let load = local_load(self.family, &cell, coeffs);
        Some(ElementContribution {
            dofs: self.family.element_dofs(xi, yi, mesh.width()),
            matrix,
            load,
        })
    }
}

/// Rows no element touched get a unit diagonal and a zero rhs
fn fix_zero_diagonal<M>(matrix: &mut M, rhs: &mut [f64]) -> usize
where
    M: GlobalMatrix + ?Sized,
{
    let mut fixed = 0;
    for (row, d) in matrix.diagonal_mut().iter_mut().enumerate() {
        if *d == 0.0 {
            *d = 1.0;
            rhs[row] = 0.0;
            fixed += 1;
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{AxisRefinement, BoundaryCondition, RefineParams, Subdomain};
    use crate::problem::BuiltinTask;
    use approx::assert_relative_eq;

    fn square(n: usize) -> RectMesh {
        let mut mesh = RectMesh::rectangle(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        mesh.refine(&RefineParams {
            x: AxisRefinement::uniform(1, n),
            y: AxisRefinement::uniform(1, n),
        })
        .unwrap();
        mesh
    }

    #[test]
    fn test_formats_agree() {
        let mesh = square(3);
        let task = BuiltinTask::Linear;
        let diag = Assembler::new(MatrixFormat::Diag, ElementFamily::Bilinear, CoordSystem::Cartesian)
            .assemble(&mesh, &task)
            .unwrap();
        let msr = Assembler::new(MatrixFormat::Msr, ElementFamily::Bilinear, CoordSystem::Cartesian)
            .assemble(&mesh, &task)
            .unwrap();

        assert_eq!(diag.matrix.enumerate_nonzero(), msr.matrix.enumerate_nonzero());
        assert_eq!(diag.rhs, msr.rhs);
    }

    #[test]
    fn test_mass_sum_is_area() {
        // with λ = 1, stiffness rows sum to zero, so A·1 sums to γ·area
        let mesh = square(4);
        let slae = Assembler::new(MatrixFormat::Diag, ElementFamily::Bilinear, CoordSystem::Cartesian)
            .assemble(&mesh, &BuiltinTask::Linear)
            .unwrap();
        let ones = vec![1.0; slae.size()];
        let total: f64 = slae.matrix.multiply(&ones).iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uncovered_nodes_are_pinned() {
        // region covers only the left half
        let mesh = RectMesh::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            vec![Subdomain {
                num: 0,
                x1: 0,
                x2: 1,
                y1: 0,
                y2: 1,
            }],
            vec![],
        )
        .unwrap();
        let slae = Assembler::new(MatrixFormat::Msr, ElementFamily::Bilinear, CoordSystem::Cartesian)
            .assemble(&mesh, &BuiltinTask::Linear)
            .unwrap();
        for row in [2, 5] {
            assert_eq!(slae.matrix.get(row, row), 1.0);
            assert_eq!(slae.rhs[row], 0.0);
        }
        assert!(slae.matrix.get(0, 0) > 0.0);
    }

    #[test]
    fn test_hermite_restrictions() {
        let mesh = square(2);
        let diag = Assembler::new(MatrixFormat::Diag, ElementFamily::Hermite, CoordSystem::Cartesian);
        assert!(matches!(
            diag.assemble(&mesh, &BuiltinTask::Quadratic),
            Err(FemError::Unsupported(_))
        ));

        let with_bc = RectMesh::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![],
            vec![BoundaryCondition {
                num: 0,
                kind: 1,
                x1: 0,
                x2: 0,
                y1: 0,
                y2: 1,
            }],
        )
        .unwrap();
        let msr = Assembler::new(MatrixFormat::Msr, ElementFamily::Hermite, CoordSystem::Cartesian);
        assert!(matches!(
            msr.assemble(&with_bc, &BuiltinTask::Quadratic),
            Err(FemError::Unsupported(_))
        ));

        let slae = msr.assemble(&mesh, &BuiltinTask::Quadratic).unwrap();
        assert_eq!(slae.size(), 9 * 4);
    }
}
