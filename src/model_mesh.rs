//! # Mesh Model Module
//!
//! GPU-side actors. Each scene actor becomes a `MeshModel`: a vertex and
//! index buffer plus a material uniform bound at group 1.
//!
//! Key components:
//! - `ModelVertex`: position and normal, as the shader reads them
//! - `MaterialUniform`: color and Phong coefficients for one actor
//! - `MeshModel`: buffers and bind group for one actor
//! - `DrawModel` trait: rendering abstraction over `wgpu::RenderPass`

use cgmath::prelude::*;
use wgpu::util::DeviceExt;

use crate::mesh::TriMesh;
use crate::scene::{Actor, Material};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A common trait for all vertex types that can be used with WGPU rendering.
pub trait Vertex {
    /// Returns the buffer layout description for this vertex type
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    // rgb + unused
    pub color: [f32; 4],
    // ambient, diffuse, specular, specular power
    pub coefficients: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        let [r, g, b] = material.color.to_array();
        Self {
            color: [r, g, b, 1.0],
            coefficients: [
                material.ambient,
                material.diffuse,
                material.specular,
                material.specular_power,
            ],
        }
    }
}

/// Vertices and indices ready for upload.
///
/// Meshes with normals are uploaded as-is. Meshes without normals are
/// expanded to three vertices per triangle carrying the face normal, which
/// gives flat shading.
pub fn vertex_data(mesh: &TriMesh) -> (Vec<ModelVertex>, Vec<u32>) {
    match &mesh.normals {
        Some(normals) => {
            let vertices = mesh
                .positions
                .iter()
                .zip(normals)
                .map(|(p, n)| ModelVertex {
                    position: (*p).into(),
                    normal: (*n).into(),
                })
                .collect();
            let indices = mesh.triangles.iter().flatten().copied().collect();
            (vertices, indices)
        }
        None => {
            let mut vertices = Vec::with_capacity(mesh.triangles.len() * 3);
            for t in &mesh.triangles {
                let n = mesh.face_normal(t);
                let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
                for p in mesh.triangle_points(t) {
                    vertices.push(ModelVertex {
                        position: p.into(),
                        normal: n.into(),
                    });
                }
            }
            let indices = (0..vertices.len() as u32).collect();
            (vertices, indices)
        }
    }
}

pub struct MeshModel {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
    pub backface_culling: bool,
}

impl MeshModel {
    pub fn new(device: &wgpu::Device, material_layout: &wgpu::BindGroupLayout, actor: &Actor) -> Self {
        let (vertices, indices) = vertex_data(&actor.mesh);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", actor.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", actor.name)),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", actor.name)),
            contents: bytemuck::cast_slice(&[MaterialUniform::from(&actor.material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
            label: Some("material_bind_group"),
        });

        log::debug!(
            "uploaded {:?}: {} vertices, {} indices",
            actor.name,
            vertices.len(),
            indices.len()
        );

        Self {
            name: actor.name.clone(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            material_buffer,
            material_bind_group,
            backface_culling: actor.material.backface_culling,
        }
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh_model(
        &mut self,
        model: &'a MeshModel,
        camera_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_model(
        &mut self,
        model: &'b MeshModel,
        camera_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        self.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]); // Camera and light at group 0
        self.set_bind_group(1, &model.material_bind_group, &[]); // Material at group 1
        self.draw_indexed(0..model.num_elements, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;
    use cgmath::Point3;

    fn triangle() -> TriMesh {
        TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn meshes_without_normals_are_flat_shaded() {
        let (vertices, indices) = vertex_data(&triangle());
        assert_eq!(indices, vec![0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn meshes_with_normals_keep_their_indices() {
        let mut mesh = triangle();
        mesh.normals = Some(vec![cgmath::Vector3::unit_x(); 3]);
        let (vertices, indices) = vertex_data(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].normal, [1.0, 0.0, 0.0]);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn material_uniform_packs_coefficients() {
        let uniform = MaterialUniform::from(&Material::surface(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(uniform.color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniform.coefficients, [0.0, 0.7, 0.4, 20.0]);
    }
}
