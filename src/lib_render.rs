use crate::camera;
use crate::config;
use crate::lib_state::State;
use crate::mesh::Bounds;
use crate::model_mesh::DrawModel;
use cgmath::prelude::*;
use std::iter;

// GPU Uniform Structs

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &camera::Camera, projection: &camera::Projection, bounds: &Bounds) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix(camera, bounds) * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// A white light that sits at the eye and follows it around.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

impl LightUniform {
    pub fn headlight(camera: &camera::Camera) -> Self {
        Self {
            position: camera.position.into(),
            intensity: config::render_config().headlight_intensity,
            color: [1.0, 1.0, 1.0],
            _padding: 0.0,
        }
    }

    pub fn follow(&mut self, camera: &camera::Camera) {
        self.position = camera.position.into();
    }
}

/// Draw every actor of the scene into the next surface texture.
pub fn render(state: &State) -> Result<(), wgpu::SurfaceError> {
    let output = state.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

    // With MSAA we draw into the multisample texture and resolve into the surface
    let (target, resolve_target) = match &state.multisample_texture_view {
        Some(msaa_view) => (msaa_view, Some(&view)),
        None => (&view, None),
    };

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(state.scene.background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &state.depth_texture_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for model in &state.models {
            if model.backface_culling {
                render_pass.set_pipeline(&state.culled_pipeline);
            } else {
                render_pass.set_pipeline(&state.two_sided_pipeline);
            }
            render_pass.draw_mesh_model(model, &state.camera_bind_group);
        }
    }

    state.queue.submit(iter::once(encoder.finish()));
    output.present();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Vector3};

    #[test]
    fn headlight_sits_at_the_eye() {
        let mut camera = camera::Camera::new([0.0, 0.0, 5.0], Point3::origin(), Vector3::unit_y());
        let mut light = LightUniform::headlight(&camera);
        assert_eq!(light.position, [0.0, 0.0, 5.0]);
        camera.azimuth(90.0);
        light.follow(&camera);
        assert!((light.position[0] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn camera_uniform_maps_focal_point_to_screen_center() {
        let camera = camera::Camera::new([0.0, 0.0, 5.0], Point3::origin(), Vector3::unit_y());
        let projection = camera::Projection::new(640, 480);
        let bounds = Bounds::from_points(vec![Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)]);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection, &bounds);

        let m = cgmath::Matrix4::from(uniform.view_proj);
        let clip = m * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }
}
