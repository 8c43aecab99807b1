//! Task description loaded from JSON
//!
//! ```json
//! {
//!   "mesh": { "x_axis": [0.0, 1.0], "y_axis": [0.0, 1.0] },
//!   "subdomains": [{ "num": 0, "x1": 0, "x2": 1, "y1": 0, "y2": 1 }],
//!   "boundary_conditions": [{ "num": 0, "type": 1, "x1": 0, "x2": 0, "y1": 0, "y2": 1 }],
//!   "refine": { "x": { "split_count": [4], "stretch_ratio": [1.0] },
//!               "y": { "split_count": [4], "stretch_ratio": [1.0] } },
//!   "generations": 3,
//!   "task": "linear",
//!   "solver": { "backend": "host", "method": "cg" }
//! }
//! ```
//!
//! Missing sections take their defaults. Without subdomains the whole
//! rectangle is region 0.

use crate::assembly::{Assembler, MatrixFormat};
use crate::basis::ElementFamily;
use crate::coords::CoordSystem;
use crate::error::Result;
use crate::mesh::{AxisRefinement, BoundaryCondition, Point, RectMesh, RefineParams, Subdomain};
use crate::problem::BuiltinTask;
use crate::solver::SolverConfig;
use crate::spline::SplineParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coarse points of both axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    #[serde(alias = "XAxis")]
    pub x_axis: Vec<f64>,
    #[serde(alias = "YAxis")]
    pub y_axis: Vec<f64>,
}

/// Element family, matrix format and coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub format: MatrixFormat,
    pub family: ElementFamily,
    /// Coordinate system, the task's own when absent
    pub coords: Option<CoordSystem>,
}

/// Spline fitted through each solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineConfig {
    #[serde(flatten)]
    pub params: SplineParams,
    /// Uniform target mesh
    pub mesh: MeshConfig,
    /// Target elements per coarse interval along x and y
    #[serde(default = "default_split")]
    pub split: [usize; 2],
}

fn default_split() -> [usize; 2] {
    [1, 1]
}

fn default_generations() -> usize {
    1
}

impl SplineConfig {
    /// Target mesh of the spline
    pub fn build_mesh(&self) -> Result<RectMesh> {
        let mut mesh = RectMesh::rectangle(self.mesh.x_axis.clone(), self.mesh.y_axis.clone())?;
        let [nx, ny] = self.split;
        mesh.refine(&RefineParams {
            x: AxisRefinement::uniform(mesh.x().coarse().len() - 1, nx),
            y: AxisRefinement::uniform(mesh.y().coarse().len() - 1, ny),
        })?;
        Ok(mesh)
    }
}

/// A complete task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub mesh: MeshConfig,
    #[serde(default)]
    pub subdomains: Vec<Subdomain>,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryCondition>,
    /// Initial refinement, none keeps the coarse mesh
    #[serde(default)]
    pub refine: Option<RefineParams>,
    /// Number of solves, the mesh is doubled between two of them
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default)]
    pub task: BuiltinTask,
    #[serde(default)]
    pub assembly: AssemblyConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub spline: Option<SplineConfig>,
    /// Points where value and gradient are reported
    #[serde(default)]
    pub probes: Vec<Point>,
}

impl TaskConfig {
    /// Load a task from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Coordinate system used for assembly
    pub fn coords(&self) -> CoordSystem {
        self.assembly.coords.unwrap_or_else(|| self.task.coords())
    }

    pub fn assembler(&self) -> Assembler {
        Assembler::new(self.assembly.format, self.assembly.family, self.coords())
    }

    /// Mesh of the first generation
    pub fn build_mesh(&self) -> Result<RectMesh> {
        let (x, y) = (self.mesh.x_axis.clone(), self.mesh.y_axis.clone());
        let subdomains = if self.subdomains.is_empty() {
            vec![Subdomain {
                num: 0,
                x1: 0,
                x2: x.len().saturating_sub(1),
                y1: 0,
                y2: y.len().saturating_sub(1),
            }]
        } else {
            self.subdomains.clone()
        };
        let mut mesh = RectMesh::new(x, y, subdomains, self.boundary_conditions.clone())?;
        if let Some(refine) = &self.refine {
            mesh.refine(refine)?;
        }
        Ok(mesh)
    }
}
