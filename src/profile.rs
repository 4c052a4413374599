//! # Profile Module
//!
//! A profile is the 2D cross-section that gets swept around the Z axis.
//! Points are stored in order; the connectivity says whether they form an
//! open polyline or a closed polygon.

use cgmath::Point3;
use serde::Serialize;

use crate::error::{GeometryError, Result};

/// A single profile point with its sequential identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub id: usize,
    pub position: Point3<f32>,
}

/// How the profile points are connected.
///
/// Closure is carried by the variant alone and is never inferred from the
/// point count or from coincident end points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Connectivity {
    /// Open polyline through every point in order (a line cell).
    Polyline,
    /// Closed polygon through every point in order (an area cell).
    Polygon,
}

impl Connectivity {
    fn min_points(self) -> usize {
        match self {
            Connectivity::Polyline => 2,
            Connectivity::Polygon => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Connectivity::Polyline => "polyline",
            Connectivity::Polygon => "polygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    points: Vec<ProfilePoint>,
    connectivity: Connectivity,
}

impl Profile {
    /// Build a profile from `(id, [x, y, z])` tuples.
    ///
    /// Identifiers must equal their position in the list.
    pub fn from_points(data: &[(usize, [f32; 3])], connectivity: Connectivity) -> Result<Self> {
        let points = data
            .iter()
            .map(|&(id, coords)| ProfilePoint {
                id,
                position: Point3::from(coords),
            })
            .collect();
        Self::new(points, connectivity)
    }

    pub fn new(points: Vec<ProfilePoint>, connectivity: Connectivity) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::EmptyProfile);
        }
        if let Some((position, point)) = points.iter().enumerate().find(|(i, p)| p.id != *i) {
            return Err(GeometryError::NonContiguousId {
                position,
                id: point.id,
            });
        }
        if points.len() < connectivity.min_points() {
            return Err(GeometryError::TooFewPoints {
                kind: connectivity.name(),
                required: connectivity.min_points(),
                actual: points.len(),
            });
        }

        Ok(Self {
            points,
            connectivity,
        })
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.points.iter().map(|p| p.position)
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.connectivity == Connectivity::Polygon
    }

    /// Line-cell segments. A polygon is an area cell and has none.
    pub fn line_segments(&self) -> Vec<[usize; 2]> {
        match self.connectivity {
            Connectivity::Polyline => (1..self.points.len()).map(|i| [i - 1, i]).collect(),
            Connectivity::Polygon => Vec::new(),
        }
    }

    /// Edges swept by the rotational extrusion: the polyline segments, or
    /// the closed boundary of the polygon.
    pub fn boundary_edges(&self) -> Vec<[usize; 2]> {
        let n = self.points.len();
        match self.connectivity {
            Connectivity::Polyline => self.line_segments(),
            Connectivity::Polygon => (0..n).map(|i| [i, (i + 1) % n]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(usize, [f32; 3])> {
        vec![
            (0, [1.0, 0.0, 0.0]),
            (1, [2.0, 0.0, 0.0]),
            (2, [2.0, 0.0, 1.0]),
            (3, [1.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn polygon_boundary_wraps_around() {
        let profile = Profile::from_points(&square(), Connectivity::Polygon).unwrap();
        assert!(profile.is_closed());
        assert!(profile.line_segments().is_empty());
        assert_eq!(
            profile.boundary_edges(),
            vec![[0, 1], [1, 2], [2, 3], [3, 0]]
        );
    }

    #[test]
    fn polyline_stays_open_even_when_ends_coincide() {
        let mut data = square();
        data.push((4, [1.0, 0.0, 0.0]));
        let profile = Profile::from_points(&data, Connectivity::Polyline).unwrap();
        assert!(!profile.is_closed());
        assert_eq!(profile.line_segments().len(), 4);
        assert_eq!(profile.boundary_edges(), profile.line_segments());
    }

    #[test]
    fn rejects_out_of_order_ids() {
        let mut data = square();
        data.swap(1, 2);
        let err = Profile::from_points(&data, Connectivity::Polyline).unwrap_err();
        assert_eq!(err, GeometryError::NonContiguousId { position: 1, id: 2 });
    }

    #[test]
    fn rejects_degenerate_polygon() {
        let err = Profile::from_points(&square()[..2], Connectivity::Polygon).unwrap_err();
        assert!(matches!(err, GeometryError::TooFewPoints { required: 3, actual: 2, .. }));
        assert_eq!(
            Profile::from_points(&[], Connectivity::Polyline).unwrap_err(),
            GeometryError::EmptyProfile
        );
    }
}
