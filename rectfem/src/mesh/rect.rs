//! Structured rectangular mesh
//!
//! Nodes are numbered row by row: node `(xi, yi)` has index `yi * W + xi`
//! with `W` the number of nodes along x. Element `(xi, yi)` is the cell
//! between nodes `xi..=xi+1` and `yi..=yi+1`.

use super::refinement::{Axis, RefineParams};
use super::types::{BoundaryCondition, Point, Subdomain};
use crate::error::{FemError, Result};

/// Tolerance on step lengths when testing a mesh for uniformity
pub const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Rectangular mesh with subdomains and boundary records
#[derive(Debug, Clone, PartialEq)]
pub struct RectMesh {
    x: Axis,
    y: Axis,
    subdomains: Vec<Subdomain>,
    boundaries: Vec<BoundaryCondition>,
}

impl RectMesh {
    /// Create a mesh from coarse axes, regions and boundary records
    pub fn new(
        x_axis: Vec<f64>,
        y_axis: Vec<f64>,
        subdomains: Vec<Subdomain>,
        boundaries: Vec<BoundaryCondition>,
    ) -> Result<Self> {
        let x = Axis::new('x', x_axis)?;
        let y = Axis::new('y', y_axis)?;

        for s in &subdomains {
            check_coarse(s.num, 'x', &x, [s.x1, s.x2])?;
            check_coarse(s.num, 'y', &y, [s.y1, s.y2])?;
        }
        for bc in &boundaries {
            check_coarse(bc.num, 'x', &x, [bc.x1, bc.x2])?;
            check_coarse(bc.num, 'y', &y, [bc.y1, bc.y2])?;
        }

        Ok(Self {
            x,
            y,
            subdomains,
            boundaries,
        })
    }

    /// Mesh covering its whole rectangle with region 0 and no boundary records
    pub fn rectangle(x_axis: Vec<f64>, y_axis: Vec<f64>) -> Result<Self> {
        let whole = Subdomain {
            num: 0,
            x1: 0,
            x2: x_axis.len().saturating_sub(1),
            y1: 0,
            y2: y_axis.len().saturating_sub(1),
        };
        Self::new(x_axis, y_axis, vec![whole], Vec::new())
    }

    /// Refined x axis
    pub fn x(&self) -> &Axis {
        &self.x
    }

    /// Refined y axis
    pub fn y(&self) -> &Axis {
        &self.y
    }

    /// Regions, in lookup order
    pub fn subdomains(&self) -> &[Subdomain] {
        &self.subdomains
    }

    /// Boundary condition records
    pub fn boundaries(&self) -> &[BoundaryCondition] {
        &self.boundaries
    }

    /// Nodes per mesh row (`W`)
    pub fn width(&self) -> usize {
        self.x.len()
    }

    /// Number of mesh rows
    pub fn height(&self) -> usize {
        self.y.len()
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Total number of elements
    pub fn element_count(&self) -> usize {
        self.x.intervals() * self.y.intervals()
    }

    /// Global index of node `(xi, yi)`
    #[inline]
    pub fn node_index(&self, xi: usize, yi: usize) -> usize {
        yi * self.width() + xi
    }

    /// Coordinates of node `(xi, yi)`
    pub fn node(&self, xi: usize, yi: usize) -> Point {
        Point::new(self.x.nodes()[xi], self.y.nodes()[yi])
    }

    /// Lower-left and upper-right corners of element `(xi, yi)`
    pub fn element_bounds(&self, xi: usize, yi: usize) -> ([f64; 2], [f64; 2]) {
        let x = self.x.nodes();
        let y = self.y.nodes();
        ([x[xi], y[yi]], [x[xi + 1], y[yi + 1]])
    }

    /// Element coordinates `(xi, yi)` in row-major order
    pub fn elements(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let nx = self.x.intervals();
        (0..self.y.intervals()).flat_map(move |yi| (0..nx).map(move |xi| (xi, yi)))
    }

    /// Region of element `(xi, yi)`, first match wins
    pub fn subdomain_at_element(&self, xi: usize, yi: usize) -> Option<usize> {
        self.subdomains
            .iter()
            .find(|s| {
                xi >= self.x.refined_index(s.x1)
                    && xi < self.x.refined_index(s.x2)
                    && yi >= self.y.refined_index(s.y1)
                    && yi < self.y.refined_index(s.y2)
            })
            .map(|s| s.num)
    }

    /// Region of a physical point, first match on the closed coarse rectangles
    pub fn subdomain_at_point(&self, x: f64, y: f64) -> Option<usize> {
        let cx = self.x.coarse();
        let cy = self.y.coarse();
        self.subdomains
            .iter()
            .find(|s| x >= cx[s.x1] && x <= cx[s.x2] && y >= cy[s.y1] && y <= cy[s.y2])
            .map(|s| s.num)
    }

    /// Element containing a physical point
    pub fn locate_element(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((self.x.locate(x)?, self.y.locate(y)?))
    }

    /// Rebuild both refined axes from the coarse points
    pub fn refine(&mut self, params: &RefineParams) -> Result<()> {
        self.x.refine(&params.x)?;
        self.y.refine(&params.y)?;
        log::info!(
            "Mesh refined to {}x{} nodes, {} elements",
            self.width(),
            self.height(),
            self.element_count()
        );
        Ok(())
    }

    /// Halve every step along both axes
    pub fn double(&mut self) -> Result<()> {
        self.x.double()?;
        self.y.double()?;
        log::info!(
            "Mesh doubled to {}x{} nodes, {} elements",
            self.width(),
            self.height(),
            self.element_count()
        );
        Ok(())
    }

    /// Fail unless both axes have equal steps
    pub fn ensure_uniform(&self) -> Result<()> {
        for axis in [&self.x, &self.y] {
            if !axis.is_uniform(UNIFORM_TOLERANCE) {
                return Err(FemError::NonUniformHermite { axis: axis.name() });
            }
        }
        Ok(())
    }
}

fn check_coarse(num: usize, name: char, axis: &Axis, indices: [usize; 2]) -> Result<()> {
    match indices.into_iter().find(|&i| i >= axis.coarse().len()) {
        Some(index) => Err(FemError::SubdomainOutOfRange {
            num,
            axis: name,
            index,
        }),
        None => Ok(()),
    }
}
