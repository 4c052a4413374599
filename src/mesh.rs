//! # Mesh Module
//!
//! CPU-side triangle meshes shared by every geometry stage. Each filter
//! takes a mesh (or a profile) by reference and returns a new `TriMesh`.

use cgmath::prelude::*;
use cgmath::{Point3, Vector3};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Point3<f32>>,
    /// Per-vertex normals, parallel to `positions` when present.
    pub normals: Option<Vec<Vector3<f32>>>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn new(positions: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            normals: None,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.positions.iter().copied())
    }

    pub fn triangle_points(&self, triangle: &[u32; 3]) -> [Point3<f32>; 3] {
        [
            self.positions[triangle[0] as usize],
            self.positions[triangle[1] as usize],
            self.positions[triangle[2] as usize],
        ]
    }

    /// Unnormalized face normal; its length is twice the triangle area.
    pub fn face_normal(&self, triangle: &[u32; 3]) -> Vector3<f32> {
        let [a, b, c] = self.triangle_points(triangle);
        (b - a).cross(c - a)
    }

    pub fn surface_area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|t| self.face_normal(t).magnitude() * 0.5)
            .sum()
    }

    /// Count of edges used by exactly one triangle. Zero for a closed surface.
    pub fn open_edge_count(&self) -> usize {
        let mut edges = std::collections::HashMap::new();
        for t in &self.triangles {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_insert(0usize) += 1;
            }
        }
        edges.values().filter(|&&count| count == 1).count()
    }

    pub fn summary(&self) -> MeshSummary {
        let bounds = self.bounds();
        MeshSummary {
            vertices: self.vertex_count(),
            triangles: self.triangle_count(),
            has_normals: self.has_normals(),
            bounds_min: bounds.min.into(),
            bounds_max: bounds.max.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub has_normals: bool,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points<I: IntoIterator<Item = Point3<f32>>>(points: I) -> Self {
        points.into_iter().fold(Self::empty(), |mut b, p| {
            b.include(p);
            b
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include(&mut self, p: Point3<f32>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        if other.is_empty() {
            return *self;
        }
        let mut b = *self;
        b.include(other.min);
        b.include(other.max);
        b
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Radius of the sphere through the box corners.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).magnitude() * 0.5
    }
}
