use approx::assert_relative_eq;
use cgmath::{InnerSpace, Point3};
use lathe_viewer::{
    demo_geometries::{self, BACKGROUND_COLOR},
    palette::named_color,
    profile::Connectivity,
    stripper::strip_lines,
};

#[test]
fn bottle_profile_is_a_ten_point_polyline() {
    let profile = demo_geometries::bottle_profile().unwrap();
    assert_eq!(profile.len(), 10);
    assert_eq!(profile.connectivity(), Connectivity::Polyline);
    assert!(!profile.is_closed());
    for (i, point) in profile.points().iter().enumerate() {
        assert_eq!(point.id, i);
    }
    assert_eq!(profile.points()[0].position, Point3::new(0.01, 0.0, 0.0));
    assert_eq!(profile.points()[9].position, Point3::new(0.2, 0.0, 5.0));
}

#[test]
fn bottle_extrusion_parameters() {
    let extrusion = demo_geometries::bottle_extrusion();
    assert_eq!(extrusion.resolution, 120);
    assert_eq!(extrusion.angle, 360.0);
    assert_eq!(extrusion.translation, 0.0);
    assert_eq!(extrusion.delta_radius, 0.0);
    assert!(extrusion.is_full_revolution());
}

#[test]
fn bottle_surface_counts() {
    let profile = demo_geometries::bottle_profile().unwrap();
    let bottle = demo_geometries::bottle_extrusion().apply(&profile).unwrap();

    // 120 rings of 10 points; the seam reuses the first ring
    assert_eq!(bottle.vertex_count(), 1200);
    assert_eq!(bottle.triangle_count(), 2160);
    assert!(!bottle.has_normals());

    let bounds = bottle.bounds();
    assert_relative_eq!(bounds.max.x, 1.5, epsilon = 1e-5);
    assert_relative_eq!(bounds.min.z, 0.0);
    assert_relative_eq!(bounds.max.z, 5.0);
}

#[test]
fn bottle_surface_faces_outward() {
    let profile = demo_geometries::bottle_profile().unwrap();
    let bottle = demo_geometries::bottle_extrusion().apply(&profile).unwrap();

    // Triangles on the straight body wall (z strictly inside 0..3.5) point away from the axis
    let mut checked = 0;
    for t in &bottle.triangles {
        let [a, b, c] = bottle.triangle_points(t);
        let centroid = Point3::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0, (a.z + b.z + c.z) / 3.0);
        if centroid.z > 0.5 && centroid.z < 3.0 {
            let radial = cgmath::Vector3::new(centroid.x, centroid.y, 0.0);
            assert!(bottle.face_normal(t).dot(radial) > 0.0);
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn bottle_profile_tube_counts() {
    let profile = demo_geometries::bottle_profile().unwrap();
    let strips = strip_lines(&profile);
    assert_eq!(strips.len(), 1);
    assert_eq!(strips[0].len(), 10);
    assert!(!strips[0].closed);

    let tube = demo_geometries::bottle_tube().apply(&strips).unwrap();
    assert_eq!(tube.vertex_count(), 110);
    assert_eq!(tube.triangle_count(), 198);
    assert!(tube.has_normals());
}

#[test]
fn bottle_scene_layout() {
    let scene = demo_geometries::bottle_scene().unwrap();
    assert_eq!(scene.window.width, 640);
    assert_eq!(scene.window.height, 480);
    assert_eq!(scene.window.title, "Bottle");
    assert_eq!(scene.actors.len(), 2);
    assert_eq!(Some(scene.background), named_color(BACKGROUND_COLOR));

    let bottle = scene.actor("bottle").unwrap();
    let tube = scene.actor("profile").unwrap();
    assert_eq!(Some(bottle.material.color), named_color("Mint"));
    assert_eq!(Some(tube.material.color), named_color("Tomato"));

    for actor in &scene.actors {
        assert_eq!(actor.material.ambient, 0.0);
        assert_eq!(actor.material.diffuse, 0.7);
        assert_eq!(actor.material.specular, 0.4);
        assert_eq!(actor.material.specular_power, 20.0);
        assert!(actor.material.backface_culling);
    }
}

#[test]
fn bottle_camera_looks_down_from_thirty_degrees() {
    let scene = demo_geometries::bottle_scene().unwrap();
    let camera = &scene.camera;
    let bounds = scene.bounds();

    assert_relative_eq!(camera.focal_point.z, bounds.center().z, epsilon = 1e-5);
    assert_relative_eq!(
        camera.distance(),
        bounds.radius() / 15.0_f32.to_radians().sin(),
        epsilon = 1e-3
    );

    // Eye above the focal point by sin(30) of the distance, turned 30 degrees from +x
    let offset = camera.position - camera.focal_point;
    assert_relative_eq!(offset.z / camera.distance(), 0.5, epsilon = 1e-4);
    assert_relative_eq!(offset.y.atan2(offset.x).to_degrees(), 30.0, epsilon = 1e-2);
}
