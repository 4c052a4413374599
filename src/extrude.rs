//! # Rotational Extrusion Module
//!
//! Sweeps a profile around the Z axis. Each step rotates the profile by
//! `angle / resolution` degrees and can also move it along the axis
//! (`translation`) and push it away from the axis (`delta_radius`). The
//! translation and radius change are totals over the whole sweep.
//!
//! Polyline profiles become open bands. Polygon profiles become closed tubes,
//! capped at both ends unless the sweep is a pure full revolution.

use cgmath::prelude::*;
use cgmath::{Point3, Vector3};
use serde::Serialize;

use crate::error::{GeometryError, Result};
use crate::mesh::TriMesh;
use crate::profile::Profile;

const ORIENTATION_EPSILON: f32 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RotationalExtrusion {
    /// Number of angular steps over the whole sweep.
    pub resolution: u32,
    /// Sweep angle in degrees.
    pub angle: f32,
    /// Axial distance covered by the whole sweep.
    pub translation: f32,
    /// Radius change over the whole sweep.
    pub delta_radius: f32,
    /// Close polygon sweeps with end caps.
    pub capping: bool,
}

impl Default for RotationalExtrusion {
    fn default() -> Self {
        Self {
            resolution: 12,
            angle: 360.0,
            translation: 0.0,
            delta_radius: 0.0,
            capping: true,
        }
    }
}

impl RotationalExtrusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn with_translation(mut self, translation: f32) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_delta_radius(mut self, delta_radius: f32) -> Self {
        self.delta_radius = delta_radius;
        self
    }

    pub fn with_capping(mut self, capping: bool) -> Self {
        self.capping = capping;
        self
    }

    /// A plain 360 degree turn that ends where it started.
    pub fn is_full_revolution(&self) -> bool {
        self.angle.abs() == 360.0 && self.translation == 0.0 && self.delta_radius == 0.0
    }

    /// Position of `p` after `step` of `resolution` sweep steps.
    pub fn sweep_point(&self, p: Point3<f32>, step: u32) -> Point3<f32> {
        let t = step as f32 / self.resolution as f32;
        let theta = (self.angle * t).to_radians();
        let radius = (p.x * p.x + p.y * p.y).sqrt() + self.delta_radius * t;
        let psi = p.y.atan2(p.x);
        let (sin, cos) = (theta + psi).sin_cos();
        Point3::new(radius * cos, radius * sin, p.z + self.translation * t)
    }

    pub fn apply(&self, profile: &Profile) -> Result<TriMesh> {
        if self.resolution == 0 {
            return Err(GeometryError::InvalidResolution);
        }

        let n = profile.len();
        let res = self.resolution as usize;
        // A full revolution reuses the first ring as the last one.
        let seamless = self.is_full_revolution();
        let rings = if seamless { res } else { res + 1 };

        let mut positions = Vec::with_capacity(rings * n);
        for step in 0..rings {
            positions.extend(profile.positions().map(|p| self.sweep_point(p, step as u32)));
        }

        let index = |step: usize, i: usize| ((step % rings) * n + i) as u32;
        let flip = self.needs_flip(profile);

        let edges = profile.boundary_edges();
        let mut triangles = Vec::with_capacity(edges.len() * res * 2);
        for step in 0..res {
            for &[a, b] in &edges {
                let (a0, a1) = (index(step, a), index(step + 1, a));
                let (b0, b1) = (index(step, b), index(step + 1, b));
                if flip {
                    triangles.push([a0, b0, a1]);
                    triangles.push([b0, b1, a1]);
                } else {
                    triangles.push([a0, a1, b0]);
                    triangles.push([b0, a1, b1]);
                }
            }
        }

        if self.capping && profile.is_closed() && !seamless {
            let last = rings - 1;
            for k in 1..n - 1 {
                let (s0, s1, s2) = (index(0, 0), index(0, k), index(0, k + 1));
                let (e0, e1, e2) = (index(last, 0), index(last, k), index(last, k + 1));
                if flip {
                    triangles.push([s0, s2, s1]);
                    triangles.push([e0, e1, e2]);
                } else {
                    triangles.push([s0, s1, s2]);
                    triangles.push([e0, e2, e1]);
                }
            }
        }

        log::debug!(
            "rotational extrusion: {} points x {} rings -> {} triangles",
            n,
            rings,
            triangles.len()
        );

        Ok(TriMesh::new(positions, triangles))
    }

    /// Whether the default winding would face inward.
    ///
    /// Polylines only depend on the sweep direction. Polygons compare their
    /// own normal with the direction the first step moves the centroid, so
    /// that the start cap faces backwards along the sweep.
    fn needs_flip(&self, profile: &Profile) -> bool {
        let reversed = self.angle < 0.0;
        if !profile.is_closed() {
            return reversed;
        }

        let points: Vec<Point3<f32>> = profile.positions().collect();
        let normal = newell_normal(&points);
        let centroid = Point3::centroid(&points);
        let travel = self.sweep_point(centroid, 1) - self.sweep_point(centroid, 0);

        let facing = normal.dot(travel);
        if facing.abs() > ORIENTATION_EPSILON {
            facing > 0.0
        } else {
            reversed
        }
    }
}

/// Polygon normal by Newell's method; robust for slightly non-planar loops.
fn newell_normal(points: &[Point3<f32>]) -> Vector3<f32> {
    let mut normal = Vector3::zero();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Connectivity;
    use approx::assert_relative_eq;

    fn segment() -> Profile {
        Profile::from_points(
            &[(0, [1.0, 0.0, 0.0]), (1, [1.0, 0.0, 1.0])],
            Connectivity::Polyline,
        )
        .unwrap()
    }

    fn square(reverse: bool) -> Profile {
        let mut coords = vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 0.0, 1.0], [1.0, 0.0, 1.0]];
        if reverse {
            coords.reverse();
        }
        let data: Vec<_> = coords.into_iter().enumerate().collect();
        Profile::from_points(&data, Connectivity::Polygon).unwrap()
    }

    /// Every face normal should point away from the sweep's core circle.
    fn assert_outward(mesh: &TriMesh, core: impl Fn(Point3<f32>) -> Point3<f32>) {
        for t in &mesh.triangles {
            let n = mesh.face_normal(t);
            if n.magnitude() < 1e-6 {
                continue;
            }
            let [a, b, c] = mesh.triangle_points(t);
            let center = Point3::centroid(&[a, b, c]);
            assert!(n.dot(center - core(center)) > 0.0, "inward face {:?}", t);
        }
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = RotationalExtrusion::new().with_resolution(0).apply(&segment());
        assert_eq!(err, Err(GeometryError::InvalidResolution));
    }

    #[test]
    fn full_turn_of_segment_is_a_seamless_cylinder() {
        let mesh = RotationalExtrusion::new().with_resolution(8).apply(&segment()).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 16);
        // Only the top and bottom rims stay open.
        assert_eq!(mesh.open_edge_count(), 16);
        assert_outward(&mesh, |p| Point3::new(0.0, 0.0, p.z));
    }

    #[test]
    fn negative_angle_keeps_faces_outward() {
        let mesh = RotationalExtrusion::new()
            .with_resolution(8)
            .with_angle(-360.0)
            .apply(&segment())
            .unwrap();
        assert_outward(&mesh, |p| Point3::new(0.0, 0.0, p.z));
    }

    #[test]
    fn partial_sweep_of_polygon_is_capped_and_closed() {
        for reverse in [false, true] {
            let mesh = RotationalExtrusion::new()
                .with_resolution(6)
                .with_angle(90.0)
                .apply(&square(reverse))
                .unwrap();
            assert_eq!(mesh.vertex_count(), 4 * 7);
            assert_eq!(mesh.triangle_count(), 4 * 6 * 2 + 2 * 2);
            assert_eq!(mesh.open_edge_count(), 0);

            // Signed volume of a closed, outward-facing mesh is positive.
            let volume: f32 = mesh
                .triangles
                .iter()
                .map(|t| {
                    let [a, b, c] = mesh.triangle_points(t);
                    a.to_vec().dot(b.to_vec().cross(c.to_vec())) / 6.0
                })
                .sum();
            assert!(volume > 0.0, "volume {} for reverse = {}", volume, reverse);
        }
    }

    #[test]
    fn full_revolution_of_polygon_has_no_caps() {
        let mesh = RotationalExtrusion::new().with_resolution(10).apply(&square(false)).unwrap();
        assert_eq!(mesh.triangle_count(), 4 * 10 * 2);
        assert_eq!(mesh.open_edge_count(), 0);
    }

    #[test]
    fn capping_can_be_disabled() {
        let mesh = RotationalExtrusion::new()
            .with_resolution(4)
            .with_angle(180.0)
            .with_capping(false)
            .apply(&square(false))
            .unwrap();
        assert_eq!(mesh.triangle_count(), 4 * 4 * 2);
    }

    #[test]
    fn translation_and_delta_radius_are_totals() {
        let sweep = RotationalExtrusion::new()
            .with_resolution(4)
            .with_angle(720.0)
            .with_translation(2.0)
            .with_delta_radius(0.5);
        let p = sweep.sweep_point(Point3::new(1.0, 0.0, 0.0), 4);
        assert_relative_eq!(p.x, 1.5, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 2.0);

        let half = sweep.sweep_point(Point3::new(1.0, 0.0, 0.0), 1);
        assert_relative_eq!(half.x, -1.125, epsilon = 1e-5);
        assert_relative_eq!(half.z, 0.5);
    }
}
