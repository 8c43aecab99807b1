//! Records describing regions and boundaries of a rectangular mesh
//!
//! All rectangles are given in coarse-axis indices; the mesh translates them
//! to refined indices when they are used.

use crate::error::{FemError, Result};
use serde::{Deserialize, Serialize};

/// A point of the 2D domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Point::new(p.0, p.1)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

/// Axis-aligned region `[x1, x2] × [y1, y2]` tagged with a region number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdomain {
    /// Region number handed to the coefficient supplier
    pub num: usize,
    pub x1: usize,
    pub x2: usize,
    pub y1: usize,
    pub y2: usize,
}

/// Boundary condition class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Type 1: prescribed value
    Dirichlet,
    /// Type 2: prescribed flux
    Neumann,
    /// Type 3: flux proportional to the value
    Robin,
}

impl BoundaryKind {
    /// Decode a numeric type tag (1, 2 or 3)
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(BoundaryKind::Dirichlet),
            2 => Some(BoundaryKind::Neumann),
            3 => Some(BoundaryKind::Robin),
            _ => None,
        }
    }

    /// Numeric type tag
    pub fn tag(self) -> u8 {
        match self {
            BoundaryKind::Dirichlet => 1,
            BoundaryKind::Neumann => 2,
            BoundaryKind::Robin => 3,
        }
    }
}

/// Which way a boundary segment runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAxis {
    /// `x1 == x2`: the segment runs along y
    AlongY,
    /// `y1 == y2`: the segment runs along x
    AlongX,
}

/// A boundary condition record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    /// Boundary number handed to the coefficient supplier
    pub num: usize,
    /// Type tag: 1 Dirichlet, 2 Neumann, 3 Robin
    #[serde(rename = "type")]
    pub kind: u8,
    pub x1: usize,
    pub x2: usize,
    pub y1: usize,
    pub y2: usize,
}

impl BoundaryCondition {
    /// Decoded type tag
    pub fn boundary_kind(&self) -> Result<BoundaryKind> {
        BoundaryKind::from_tag(self.kind).ok_or(FemError::UnknownBoundaryType {
            num: self.num,
            kind: self.kind,
        })
    }

    /// Direction of the segment
    ///
    /// A point (degenerate in both axes) counts as running along y. An
    /// extent degenerate in neither axis is malformed.
    pub fn segment_axis(&self) -> Result<SegmentAxis> {
        if self.x1 == self.x2 {
            Ok(SegmentAxis::AlongY)
        } else if self.y1 == self.y2 {
            Ok(SegmentAxis::AlongX)
        } else {
            Err(FemError::MalformedBoundary {
                num: self.num,
                x1: self.x1,
                x2: self.x2,
                y1: self.y1,
                y2: self.y2,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_kind_tags() {
        for tag in 1..=3 {
            assert_eq!(BoundaryKind::from_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(BoundaryKind::from_tag(0), None);
        assert_eq!(BoundaryKind::from_tag(4), None);
    }

    #[test]
    fn test_segment_axis() {
        let bc = |x1, x2, y1, y2| BoundaryCondition {
            num: 0,
            kind: 1,
            x1,
            x2,
            y1,
            y2,
        };
        assert_eq!(bc(0, 0, 0, 3).segment_axis().unwrap(), SegmentAxis::AlongY);
        assert_eq!(bc(0, 2, 1, 1).segment_axis().unwrap(), SegmentAxis::AlongX);
        assert!(matches!(
            bc(0, 2, 0, 3).segment_axis(),
            Err(FemError::MalformedBoundary { .. })
        ));
    }

    #[test]
    fn test_boundary_condition_json() {
        let bc: BoundaryCondition =
            serde_json::from_str(r#"{"num": 2, "type": 3, "x1": 0, "x2": 4, "y1": 1, "y2": 1}"#)
                .unwrap();
        assert_eq!(bc.boundary_kind().unwrap(), BoundaryKind::Robin);

        let bad = BoundaryCondition { kind: 7, ..bc };
        assert!(matches!(
            bad.boundary_kind(),
            Err(FemError::UnknownBoundaryType { num: 2, kind: 7 })
        ));
    }
}
