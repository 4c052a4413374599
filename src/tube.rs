//! # Tube Module
//!
//! Wraps polylines in tubes with a circular cross-section, for drawing
//! curves as solid geometry. The cross-section frame slides along the line
//! (each normal is the previous one projected onto the new cross-section
//! plane), which keeps the tube from twisting at bends.

use std::f32::consts::TAU;

use cgmath::prelude::*;
use cgmath::{Point3, Vector3};
use serde::Serialize;

use crate::error::{GeometryError, Result};
use crate::mesh::TriMesh;
use crate::stripper::Polyline;

const MIN_SEGMENT_LENGTH: f32 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TubeFilter {
    pub sides: u32,
    pub radius: f32,
    /// Close open tubes with flat end discs.
    pub capping: bool,
}

impl Default for TubeFilter {
    fn default() -> Self {
        Self {
            sides: 3,
            radius: 0.5,
            capping: false,
        }
    }
}

impl TubeFilter {
    pub fn new(sides: u32, radius: f32) -> Self {
        Self {
            sides,
            radius,
            ..Default::default()
        }
    }

    pub fn with_capping(mut self, capping: bool) -> Self {
        self.capping = capping;
        self
    }

    pub fn apply(&self, lines: &[Polyline]) -> Result<TriMesh> {
        if self.sides < 3 || !(self.radius > 0.0) {
            return Err(GeometryError::InvalidTube {
                sides: self.sides,
                radius: self.radius,
            });
        }

        let mut mesh = TriMesh {
            normals: Some(Vec::new()),
            ..Default::default()
        };
        for line in lines {
            self.tube_polyline(line, &mut mesh);
        }

        log::debug!(
            "tube filter: {} polylines -> {} vertices, {} triangles",
            lines.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    fn tube_polyline(&self, line: &Polyline, mesh: &mut TriMesh) {
        let mut points = drop_repeated_points(&line.points);
        // The wrap segment of a closed line must not be zero-length either
        if line.closed {
            while points.len() > 1
                && (points[points.len() - 1] - points[0]).magnitude() < MIN_SEGMENT_LENGTH
            {
                points.pop();
            }
        }
        if points.len() < line.points.len() {
            log::warn!(
                "tube filter: skipped {} zero-length segments",
                line.points.len() - points.len()
            );
        }
        if points.len() < 2 {
            log::warn!("tube filter: polyline with fewer than two distinct points ignored");
            return;
        }
        let closed = line.closed && points.len() > 2;

        let tangents = tangents(&points, closed);
        let normals = sliding_normals(&tangents);
        let sides = self.sides as usize;
        let base = mesh.positions.len() as u32;

        for ((&p, &t), &n) in points.iter().zip(&tangents).zip(&normals) {
            let w = t.cross(n);
            for k in 0..sides {
                let (sin, cos) = (TAU * k as f32 / sides as f32).sin_cos();
                let dir = w * cos + n * sin;
                mesh.positions.push(p + dir * self.radius);
                push_normal(mesh, dir);
            }
        }

        let ring = |i: usize, k: usize| base + ((i % points.len()) * sides + k % sides) as u32;
        let bands = if closed { points.len() } else { points.len() - 1 };
        for i in 0..bands {
            for k in 0..sides {
                let (a, b) = (ring(i, k), ring(i, k + 1));
                let (c, d) = (ring(i + 1, k), ring(i + 1, k + 1));
                mesh.triangles.push([a, c, b]);
                mesh.triangles.push([b, c, d]);
            }
        }

        if self.capping && !closed {
            let last = points.len() - 1;
            self.cap(mesh, points[0], -tangents[0], ring(0, 0), false);
            self.cap(mesh, points[last], tangents[last], ring(last, 0), true);
        }
    }

    /// Flat disc over the ring starting at `first`, facing `facing`.
    fn cap(
        &self,
        mesh: &mut TriMesh,
        center: Point3<f32>,
        facing: Vector3<f32>,
        first: u32,
        at_end: bool,
    ) {
        let sides = self.sides as usize;
        let hub = mesh.positions.len() as u32;
        mesh.positions.push(center);
        push_normal(mesh, facing);
        for k in 0..sides {
            let p = mesh.positions[first as usize + k];
            mesh.positions.push(p);
            push_normal(mesh, facing);
        }
        for k in 0..sides {
            let (a, b) = (hub + 1 + k as u32, hub + 1 + ((k + 1) % sides) as u32);
            if at_end {
                mesh.triangles.push([hub, b, a]);
            } else {
                mesh.triangles.push([hub, a, b]);
            }
        }
    }
}

fn push_normal(mesh: &mut TriMesh, n: Vector3<f32>) {
    if let Some(normals) = mesh.normals.as_mut() {
        normals.push(n);
    }
}

fn drop_repeated_points(points: &[Point3<f32>]) -> Vec<Point3<f32>> {
    let mut kept: Vec<Point3<f32>> = Vec::with_capacity(points.len());
    for &p in points {
        match kept.last() {
            Some(&q) if (p - q).magnitude() < MIN_SEGMENT_LENGTH => {}
            _ => kept.push(p),
        }
    }
    kept
}

/// Unit tangent per point: the average of the adjacent segment directions.
fn tangents(points: &[Point3<f32>], closed: bool) -> Vec<Vector3<f32>> {
    let n = points.len();
    let segment = |i: usize| (points[(i + 1) % n] - points[i]).normalize();

    (0..n)
        .map(|i| {
            let before = if i > 0 {
                Some(segment(i - 1))
            } else if closed {
                Some(segment(n - 1))
            } else {
                None
            };
            let after = if i + 1 < n || closed { Some(segment(i)) } else { None };

            match (before, after) {
                (Some(b), Some(a)) => {
                    let sum = a + b;
                    if sum.magnitude() < MIN_SEGMENT_LENGTH {
                        a
                    } else {
                        sum.normalize()
                    }
                }
                (Some(b), None) => b,
                (None, Some(a)) => a,
                (None, None) => Vector3::unit_z(),
            }
        })
        .collect()
}

/// Any unit vector perpendicular to `axis`.
fn perpendicular(axis: Vector3<f32>) -> Vector3<f32> {
    if axis.x.abs() > 0.5 || axis.y.abs() > 0.5 {
        Vector3::new(axis.y, -axis.x, 0.0).normalize()
    } else {
        Vector3::new(0.0, axis.z, -axis.y).normalize()
    }
}

fn sliding_normals(tangents: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
    let mut normals = Vec::with_capacity(tangents.len());
    let mut previous = perpendicular(tangents[0]);
    for &t in tangents {
        let projected = previous - t * previous.dot(t);
        let n = if projected.magnitude() < MIN_SEGMENT_LENGTH {
            perpendicular(t)
        } else {
            projected.normalize()
        };
        normals.push(n);
        previous = n;
    }
    normals
}
