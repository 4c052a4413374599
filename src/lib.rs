//! Surfaces of revolution and a small interactive viewer for them.
//!
//! A [`profile::Profile`] is swept around the z axis by
//! [`extrude::RotationalExtrusion`]; the resulting [`mesh::TriMesh`] can be
//! dressed with tubes ([`tube::TubeFilter`]) or smooth normals
//! ([`normals::PolyDataNormals`]), gathered into a [`scene::Scene`] and shown
//! with [`run`].

pub mod camera;
pub mod config;
pub mod demo_geometries;
pub mod error;
pub mod extrude;
pub mod mesh;
pub mod normals;
pub mod palette;
pub mod profile;
pub mod scene;
pub mod stripper;
pub mod tube;

mod lib_app;
mod lib_input;
mod lib_render;
mod lib_state;
mod model_mesh;

pub use error::{GeometryError, Result};
pub use lib_app::run;
pub use lib_state::State;
pub use scene::{Actor, Material, Scene, WindowSettings};
