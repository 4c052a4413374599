//! # Scene Module
//!
//! Everything the viewer needs to draw a frame, held on the CPU:
//! actors (mesh + material), the camera and the window settings. A scene
//! is built once per program run and handed to [`crate::run`].

use serde::Serialize;

use crate::camera::Camera;
use crate::mesh::{Bounds, MeshSummary, TriMesh};
use crate::palette::Color;

/// Surface shading parameters for a single actor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Material {
    pub color: Color,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_power: f32,
    pub backface_culling: bool,
}

impl Material {
    /// The shiny, back-face culled look both demos use.
    pub fn surface(color: Color) -> Self {
        Self {
            color,
            ambient: 0.0,
            diffuse: 0.7,
            specular: 0.4,
            specular_power: 20.0,
            backface_culling: true,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::new(1.0, 1.0, 1.0),
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            specular_power: 1.0,
            backface_culling: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub mesh: TriMesh,
    pub material: Material,
}

impl Actor {
    pub fn new(name: &str, mesh: TriMesh, material: Material) -> Self {
        Self {
            name: String::from(name),
            mesh,
            material,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl WindowSettings {
    pub fn new(width: u32, height: u32, title: &str) -> Self {
        Self {
            width,
            height,
            title: String::from(title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub actors: Vec<Actor>,
    pub background: Color,
    pub camera: Camera,
    pub window: WindowSettings,
}

impl Scene {
    pub fn new(window: WindowSettings, background: Color) -> Self {
        Self {
            actors: Vec::new(),
            background,
            camera: Camera::default(),
            window,
        }
    }

    pub fn add_actor(&mut self, actor: Actor) {
        log::info!(
            "scene {:?}: added actor {:?} ({} vertices, {} triangles)",
            self.window.title,
            actor.name,
            actor.mesh.vertex_count(),
            actor.mesh.triangle_count()
        );
        self.actors.push(actor);
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.name == name)
    }

    /// Union of every actor's bounds.
    pub fn bounds(&self) -> Bounds {
        self.actors
            .iter()
            .fold(Bounds::empty(), |b, a| b.union(&a.mesh.bounds()))
    }

    /// Frame all actors with the camera, keeping its view direction.
    pub fn reset_camera(&mut self) {
        let bounds = self.bounds();
        self.camera.reset(&bounds);
    }

    pub fn describe(&self) -> SceneDescription {
        SceneDescription {
            window: self.window.clone(),
            background: self.background,
            camera_position: self.camera.position.into(),
            camera_focal_point: self.camera.focal_point.into(),
            camera_view_up: self.camera.view_up.into(),
            actors: self
                .actors
                .iter()
                .map(|a| ActorDescription {
                    name: a.name.clone(),
                    material: a.material,
                    mesh: a.mesh.summary(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a scene, used for debug logging.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDescription {
    pub window: WindowSettings,
    pub background: Color,
    pub camera_position: [f32; 3],
    pub camera_focal_point: [f32; 3],
    pub camera_view_up: [f32; 3],
    pub actors: Vec<ActorDescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorDescription {
    pub name: String,
    pub material: Material,
    pub mesh: MeshSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    fn triangle(offset: f32) -> TriMesh {
        TriMesh::new(
            vec![
                Point3::new(offset, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 0.0),
                Point3::new(offset, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn bounds_cover_all_actors() {
        let mut scene = Scene::new(WindowSettings::new(100, 100, "t"), Color::new(0.0, 0.0, 0.0));
        assert!(scene.bounds().is_empty());
        scene.add_actor(Actor::new("a", triangle(0.0), Material::default()));
        scene.add_actor(Actor::new("b", triangle(5.0), Material::default()));
        let b = scene.bounds();
        assert_eq!(b.min.x, 0.0);
        assert_eq!(b.max.x, 6.0);
        assert!(scene.actor("b").is_some());
    }

    #[test]
    fn description_serializes_to_json() {
        let mut scene = Scene::new(WindowSettings::new(10, 20, "Demo"), Color::new(0.0, 0.0, 0.0));
        scene.add_actor(Actor::new("a", triangle(0.0), Material::surface(Color::new(1.0, 0.0, 0.0))));
        let json = serde_json::to_value(scene.describe()).unwrap();
        assert_eq!(json["window"]["title"], "Demo");
        assert_eq!(json["actors"][0]["mesh"]["triangles"], 1);
        assert_eq!(json["actors"][0]["material"]["backface_culling"], true);
    }
}
