//! Axis refinement by per-interval split counts and stretch ratios
//!
//! Every coarse interval `i` is cut into `n_i` steps forming a geometric
//! progression of ratio `q_i`. The coarse points are kept exactly, so the
//! refined axis always contains the coarse one and `coarse_to_refined`
//! maps each coarse index to its position among the refined nodes.

use crate::error::{FemError, Result};
use serde::{Deserialize, Serialize};

/// Split counts and stretch ratios of one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRefinement {
    /// Number of steps per coarse interval (at least 1)
    #[serde(alias = "SplitCount")]
    pub split_count: Vec<usize>,
    /// Ratio between consecutive steps per coarse interval (positive)
    #[serde(alias = "StretchRatio")]
    pub stretch_ratio: Vec<f64>,
}

impl AxisRefinement {
    /// No refinement of `intervals` coarse intervals
    pub fn identity(intervals: usize) -> Self {
        Self {
            split_count: vec![1; intervals],
            stretch_ratio: vec![1.0; intervals],
        }
    }

    /// Uniform split of every interval into `n` equal steps
    pub fn uniform(intervals: usize, n: usize) -> Self {
        Self {
            split_count: vec![n; intervals],
            stretch_ratio: vec![1.0; intervals],
        }
    }

    /// Halve every step: split counts double, ratios become their square roots
    pub fn doubled(&self) -> Self {
        Self {
            split_count: self.split_count.iter().map(|n| n * 2).collect(),
            stretch_ratio: self.stretch_ratio.iter().map(|q| q.sqrt()).collect(),
        }
    }

    fn validate(&self, axis: char, intervals: usize) -> Result<()> {
        for got in [self.split_count.len(), self.stretch_ratio.len()] {
            if got != intervals {
                return Err(FemError::RefinementMismatch {
                    axis,
                    expected: intervals,
                    got,
                });
            }
        }
        if let Some(i) = self.split_count.iter().position(|&n| n == 0) {
            return Err(FemError::InvalidAxis {
                axis,
                reason: format!("split count of interval {i} is zero"),
            });
        }
        if let Some(i) = self
            .stretch_ratio
            .iter()
            .position(|&q| !(q > 0.0 && q.is_finite()))
        {
            return Err(FemError::InvalidAxis {
                axis,
                reason: format!("stretch ratio of interval {i} is not positive"),
            });
        }
        Ok(())
    }
}

/// Refinement parameters of both axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineParams {
    pub x: AxisRefinement,
    pub y: AxisRefinement,
}

/// Length of the first step when `gap` is cut into `n` steps of ratio `q`
pub fn first_step_size(stretch: f64, n: usize, gap: f64) -> f64 {
    let sum = if stretch != 1.0 {
        (1.0 - stretch.powi(n as i32)) / (1.0 - stretch)
    } else {
        n as f64
    };
    gap / sum
}

/// One refined coordinate axis
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: char,
    coarse: Vec<f64>,
    nodes: Vec<f64>,
    coarse_to_refined: Vec<usize>,
    refinement: AxisRefinement,
}

impl Axis {
    /// Create an unrefined axis from strictly increasing coarse points
    pub fn new(name: char, coarse: Vec<f64>) -> Result<Self> {
        if coarse.len() < 2 {
            return Err(FemError::InvalidAxis {
                axis: name,
                reason: format!("{} points, at least 2 are needed", coarse.len()),
            });
        }
        if let Some(i) = coarse.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(FemError::InvalidAxis {
                axis: name,
                reason: format!("points {i} and {} are not strictly increasing", i + 1),
            });
        }

        let intervals = coarse.len() - 1;
        Ok(Self {
            name,
            nodes: coarse.clone(),
            coarse_to_refined: (0..coarse.len()).collect(),
            coarse,
            refinement: AxisRefinement::identity(intervals),
        })
    }

    /// Axis name used in error messages
    pub fn name(&self) -> char {
        self.name
    }

    /// Coarse points the axis was built from
    pub fn coarse(&self) -> &[f64] {
        &self.coarse
    }

    /// Refined node coordinates
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Number of refined nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: an axis has at least two nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of refined intervals
    pub fn intervals(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Refined index of coarse point `coarse_index`
    pub fn refined_index(&self, coarse_index: usize) -> usize {
        self.coarse_to_refined[coarse_index]
    }

    /// Map from coarse index to refined index
    pub fn coarse_to_refined(&self) -> &[usize] {
        &self.coarse_to_refined
    }

    /// Current refinement parameters
    pub fn refinement(&self) -> &AxisRefinement {
        &self.refinement
    }

    /// Length of refined interval `i`
    pub fn step(&self, i: usize) -> f64 {
        self.nodes[i + 1] - self.nodes[i]
    }

    /// Rebuild the refined nodes from the coarse points
    pub fn refine(&mut self, refinement: &AxisRefinement) -> Result<()> {
        refinement.validate(self.name, self.coarse.len() - 1)?;

        let total: usize = refinement.split_count.iter().sum();
        let mut nodes = Vec::with_capacity(total + 1);
        let mut map = Vec::with_capacity(self.coarse.len());
        nodes.push(self.coarse[0]);
        map.push(0);

        for (i, w) in self.coarse.windows(2).enumerate() {
            let n = refinement.split_count[i];
            let q = refinement.stretch_ratio[i];
            let h0 = first_step_size(q, n, w[1] - w[0]);
            let start = w[0];

            let mut q_n = q;
            for j in 0..n - 1 {
                let offset = if q != 1.0 {
                    h0 * (q_n - 1.0) / (q - 1.0)
                } else {
                    h0 * (j + 1) as f64
                };
                nodes.push(start + offset);
                q_n *= q;
            }
            map.push(nodes.len());
            nodes.push(w[1]);
        }

        log::debug!(
            "{} axis: {} coarse points refined to {} nodes",
            self.name,
            self.coarse.len(),
            nodes.len()
        );
        self.nodes = nodes;
        self.coarse_to_refined = map;
        self.refinement = refinement.clone();
        Ok(())
    }

    /// Halve every step of the current refinement
    pub fn double(&mut self) -> Result<()> {
        let doubled = self.refinement.doubled();
        self.refine(&doubled)
    }

    /// Whether all refined steps are equal within a relative tolerance
    pub fn is_uniform(&self, rel_tol: f64) -> bool {
        let h = self.step(0);
        (1..self.intervals()).all(|i| (self.step(i) - h).abs() <= rel_tol * h)
    }

    /// Refined interval containing `t`, the last interval for the end point
    pub fn locate(&self, t: f64) -> Option<usize> {
        let first = self.nodes[0];
        let last = self.nodes[self.nodes.len() - 1];
        if !(first..=last).contains(&t) {
            return None;
        }
        let upper = self.nodes.partition_point(|&v| v <= t);
        Some(upper.saturating_sub(1).min(self.intervals() - 1))
    }
}
