//! # Normals Module
//!
//! Per-vertex normals for smooth shading. Faces meeting at a vertex are
//! grouped into fans: two faces share a fan when they share an edge through
//! the vertex and their normals differ by no more than the feature angle.
//! Each fan gets its own copy of the vertex, so sharp edges stay sharp.

use cgmath::prelude::*;
use cgmath::Vector3;
use serde::Serialize;

use crate::mesh::TriMesh;

const DEGENERATE_AREA: f32 = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PolyDataNormals {
    /// Dihedral angle, in degrees, above which an edge is treated as sharp.
    pub feature_angle: f32,
    /// Duplicate vertices along sharp edges.
    pub splitting: bool,
    /// Reverse triangle winding and normals.
    pub flip_normals: bool,
}

impl Default for PolyDataNormals {
    fn default() -> Self {
        Self {
            feature_angle: 30.0,
            splitting: true,
            flip_normals: false,
        }
    }
}

impl PolyDataNormals {
    pub fn with_feature_angle(feature_angle: f32) -> Self {
        Self {
            feature_angle,
            ..Default::default()
        }
    }

    pub fn with_splitting(mut self, splitting: bool) -> Self {
        self.splitting = splitting;
        self
    }

    pub fn with_flip_normals(mut self, flip: bool) -> Self {
        self.flip_normals = flip;
        self
    }

    pub fn apply(&self, mesh: &TriMesh) -> TriMesh {
        let face_normals: Vec<Option<Vector3<f32>>> = mesh
            .triangles
            .iter()
            .map(|t| {
                let n = mesh.face_normal(t);
                if n.magnitude2() > DEGENERATE_AREA {
                    Some(n.normalize())
                } else {
                    None
                }
            })
            .collect();

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); mesh.vertex_count()];
        for (f, t) in mesh.triangles.iter().enumerate() {
            for &v in t {
                let faces = &mut incident[v as usize];
                if faces.last() != Some(&f) {
                    faces.push(f);
                }
            }
        }

        let cos_feature = self.feature_angle.to_radians().cos();
        let mut positions = Vec::with_capacity(mesh.vertex_count());
        let mut normals = Vec::with_capacity(mesh.vertex_count());
        let mut triangles = mesh.triangles.clone();
        let mut split_vertices = 0usize;

        for (v, faces) in incident.iter().enumerate() {
            if faces.is_empty() {
                continue;
            }
            let groups = self.fans(v as u32, faces, mesh, &face_normals, cos_feature);
            let group_count = groups.iter().copied().max().map_or(0, |g| g + 1);
            split_vertices += group_count.saturating_sub(1);

            let base = positions.len() as u32;
            let mut sums = vec![Vector3::zero(); group_count];
            for (&f, &g) in faces.iter().zip(&groups) {
                if let Some(n) = face_normals[f] {
                    sums[g] += n;
                }
                for k in 0..3 {
                    if mesh.triangles[f][k] == v as u32 {
                        triangles[f][k] = base + g as u32;
                    }
                }
            }
            for sum in sums {
                let n = if sum.magnitude2() > DEGENERATE_AREA {
                    sum.normalize()
                } else {
                    Vector3::unit_z()
                };
                positions.push(mesh.positions[v]);
                normals.push(if self.flip_normals { -n } else { n });
            }
        }

        if self.flip_normals {
            for t in &mut triangles {
                t.swap(1, 2);
            }
        }

        log::debug!(
            "normals: feature angle {}, {} vertices -> {} ({} split)",
            self.feature_angle,
            mesh.vertex_count(),
            positions.len(),
            split_vertices
        );

        TriMesh {
            positions,
            normals: Some(normals),
            triangles,
        }
    }

    /// Fan index for each face around vertex `v`, numbered from 0.
    fn fans(
        &self,
        v: u32,
        faces: &[usize],
        mesh: &TriMesh,
        face_normals: &[Option<Vector3<f32>>],
        cos_feature: f32,
    ) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..faces.len()).collect();

        for i in 0..faces.len() {
            for j in i + 1..faces.len() {
                let joined = match (face_normals[faces[i]], face_normals[faces[j]]) {
                    (Some(a), Some(b)) => {
                        !self.splitting
                            || (shares_edge_through(v, &mesh.triangles[faces[i]], &mesh.triangles[faces[j]])
                                && a.dot(b) >= cos_feature)
                    }
                    _ => !self.splitting,
                };
                if joined {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }

        // Degenerate faces ride along with the first real fan.
        let anchor = (0..faces.len()).find(|&i| face_normals[faces[i]].is_some());
        for i in 0..faces.len() {
            if face_normals[faces[i]].is_none() {
                if let Some(a) = anchor {
                    let ra = find(&mut parent, a);
                    parent[i] = ra;
                }
            }
        }

        let mut labels = Vec::new();
        let mut groups = Vec::with_capacity(faces.len());
        for i in 0..faces.len() {
            let root = find(&mut parent, i);
            let label = match labels.iter().position(|&r| r == root) {
                Some(l) => l,
                None => {
                    labels.push(root);
                    labels.len() - 1
                }
            };
            groups.push(label);
        }
        groups
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn shares_edge_through(v: u32, a: &[u32; 3], b: &[u32; 3]) -> bool {
    a.iter().any(|&x| x != v && b.contains(&x))
}
