//! The two demo pipelines: a bottle turned from an open profile and a
//! spring swept from a small circle.

use anyhow::Result;

use crate::extrude::RotationalExtrusion;
use crate::normals::PolyDataNormals;
use crate::palette::color_or_white;
use crate::profile::{Connectivity, Profile};
use crate::scene::{Actor, Material, Scene, WindowSettings};
use crate::stripper::strip_lines;
use crate::tube::TubeFilter;

pub const BACKGROUND_COLOR: &str = "Burlywood";

pub const BOTTLE_PROFILE: [(usize, [f32; 3]); 10] = [
    (0, [0.01, 0.0, 0.0]),
    (1, [1.5, 0.0, 0.0]),
    (2, [1.5, 0.0, 3.5]),
    (3, [1.25, 0.0, 3.75]),
    (4, [0.75, 0.0, 4.00]),
    (5, [0.6, 0.0, 4.35]),
    (6, [0.7, 0.0, 4.65]),
    (7, [1.0, 0.0, 4.75]),
    (8, [1.0, 0.0, 5.0]),
    (9, [0.2, 0.0, 5.0]),
];

pub const SPRING_PROFILE: [(usize, [f32; 3]); 8] = [
    (0, [1.0, 0.0, 0.0]),
    (1, [1.0732, 0.0, -0.1768]),
    (2, [1.25, 0.0, -0.25]),
    (3, [1.4268, 0.0, -0.1768]),
    (4, [1.5, 0.0, 0.00]),
    (5, [1.4268, 0.0, 0.1768]),
    (6, [1.25, 0.0, 0.25]),
    (7, [1.0732, 0.0, 0.1768]),
];

pub fn bottle_profile() -> Result<Profile> {
    Ok(Profile::from_points(&BOTTLE_PROFILE, Connectivity::Polyline)?)
}

pub fn spring_profile() -> Result<Profile> {
    Ok(Profile::from_points(&SPRING_PROFILE, Connectivity::Polygon)?)
}

/// A plain revolution in 120 steps.
pub fn bottle_extrusion() -> RotationalExtrusion {
    RotationalExtrusion::new().with_resolution(120)
}

/// Six turns that climb 6 units and widen by 1.
pub fn spring_extrusion() -> RotationalExtrusion {
    RotationalExtrusion::new()
        .with_resolution(360)
        .with_translation(6.0)
        .with_delta_radius(1.0)
        .with_angle(6.0 * 360.0)
}

pub fn bottle_tube() -> TubeFilter {
    TubeFilter::new(11, 0.05)
}

pub fn spring_normals() -> PolyDataNormals {
    PolyDataNormals::with_feature_angle(60.0)
}

pub fn bottle_scene() -> Result<Scene> {
    let profile = bottle_profile()?;
    log::info!("bottle profile: {} points", profile.len());

    let bottle = bottle_extrusion().apply(&profile)?;
    let strips = strip_lines(&profile);
    let tube = bottle_tube().apply(&strips)?;

    let mut scene = Scene::new(
        WindowSettings::new(640, 480, "Bottle"),
        color_or_white(BACKGROUND_COLOR),
    );
    scene.add_actor(Actor::new("bottle", bottle, Material::surface(color_or_white("Mint"))));
    scene.add_actor(Actor::new("profile", tube, Material::surface(color_or_white("Tomato"))));

    scene.camera.set_position([1.0, 0.0, 0.0]);
    scene.camera.set_focal_point([0.0, 0.0, 0.0]);
    scene.camera.set_view_up([0.0, 0.0, 1.0]);
    scene.reset_camera();
    scene.camera.azimuth(30.0);
    scene.camera.elevation(30.0);

    Ok(scene)
}

pub fn spring_scene() -> Result<Scene> {
    let profile = spring_profile()?;
    log::info!("spring profile: {} points", profile.len());

    let coil = spring_extrusion().apply(&profile)?;
    let coil = spring_normals().apply(&coil);

    let mut scene = Scene::new(
        WindowSettings::new(640, 512, "Spring"),
        color_or_white(BACKGROUND_COLOR),
    );
    scene.add_actor(Actor::new("spring", coil, Material::surface(color_or_white("PowderBlue"))));

    scene.reset_camera();
    scene.camera.azimuth(90.0);

    Ok(scene)
}

