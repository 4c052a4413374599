use cgmath::*;
use std::time::Duration;
use winit::dpi::PhysicalPosition;
use winit::event::*;
use winit::keyboard::KeyCode;

use crate::mesh::Bounds;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

// Default camera settings
const DEFAULT_VIEW_ANGLE: f32 = 30.0;
const DEFAULT_SPEED: f32 = 2.0;
const DEFAULT_SENSITIVITY: f32 = 1.0;
const NEAR_PLANE_TOLERANCE: f32 = 0.001;
const MIN_DOLLY_DISTANCE: f32 = 1e-3;
// Degrees of rotation for a drag across the whole viewport
const ORBIT_DEGREES_PER_VIEWPORT: f32 = 200.0;
const DOLLY_BASE: f32 = 1.1;

/// Perspective camera described by eye, focal point and view-up.
///
/// Operations follow the usual visualization-toolkit camera verbs: `azimuth` and
/// `elevation` orbit the focal point, `reset` frames a bounding box while
/// keeping the current view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub focal_point: Point3<f32>,
    pub view_up: Vector3<f32>,
    /// Vertical field of view.
    pub view_angle: Deg<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            focal_point: Point3::origin(),
            view_up: Vector3::unit_y(),
            view_angle: Deg(DEFAULT_VIEW_ANGLE),
        }
    }
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>>(position: V, focal_point: Point3<f32>, view_up: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            focal_point,
            view_up: view_up.normalize(),
            ..Default::default()
        }
    }

    pub fn set_position<V: Into<Point3<f32>>>(&mut self, position: V) {
        self.position = position.into();
    }

    pub fn set_focal_point<V: Into<Point3<f32>>>(&mut self, focal_point: V) {
        self.focal_point = focal_point.into();
    }

    pub fn set_view_up<V: Into<Vector3<f32>>>(&mut self, view_up: V) {
        self.view_up = view_up.into().normalize();
    }

    pub fn distance(&self) -> f32 {
        (self.focal_point - self.position).magnitude()
    }

    /// Unit vector from the eye towards the focal point.
    pub fn direction_of_projection(&self) -> Vector3<f32> {
        let d = self.focal_point - self.position;
        if d.magnitude2() > 0.0 {
            d.normalize()
        } else {
            -Vector3::unit_z()
        }
    }

    /// Screen-right axis in world space.
    pub fn right(&self) -> Vector3<f32> {
        self.direction_of_projection().cross(self.view_up).normalize()
    }

    /// Move the camera back along its view direction until `bounds` fits in view.
    pub fn reset(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            log::warn!("camera reset skipped: nothing visible");
            return;
        }

        let view_plane_normal = -self.direction_of_projection();
        let mut radius = bounds.radius();
        if radius == 0.0 {
            radius = 0.5;
        }
        let distance = radius / (self.view_angle / 2.0).sin();

        if view_plane_normal.cross(self.view_up).magnitude() < 1e-6 {
            log::warn!("view-up parallel to view direction; picking a new view-up");
            self.view_up = any_perpendicular(view_plane_normal);
        }

        self.focal_point = bounds.center();
        self.position = self.focal_point + view_plane_normal * distance;
    }

    /// Rotate the eye about the view-up vector through the focal point.
    pub fn azimuth(&mut self, degrees: f32) {
        let rotation = Matrix3::from_axis_angle(self.view_up.normalize(), Deg(degrees));
        self.position = self.focal_point + rotation * (self.position - self.focal_point);
    }

    /// Rotate the eye up (positive) or down about the screen-left axis
    /// through the focal point. The view-up vector is left untouched.
    pub fn elevation(&mut self, degrees: f32) {
        let axis = -self.right();
        let rotation = Matrix3::from_axis_angle(axis, Deg(degrees));
        self.position = self.focal_point + rotation * (self.position - self.focal_point);
    }

    /// Make view-up perpendicular to the view direction.
    pub fn orthogonalize_view_up(&mut self) {
        let dop = self.direction_of_projection();
        let right = dop.cross(self.view_up);
        if right.magnitude2() > 0.0 {
            self.view_up = right.normalize().cross(dop).normalize();
        }
    }

    /// Move the eye towards (`factor > 1`) or away from the focal point.
    pub fn dolly(&mut self, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        let distance = (self.distance() / factor).max(MIN_DOLLY_DISTANCE);
        self.position = self.focal_point - self.direction_of_projection() * distance;
    }

    /// Shift eye and focal point together in the view plane.
    pub fn pan(&mut self, right_amount: f32, up_amount: f32) {
        let right = self.right();
        let up = right.cross(self.direction_of_projection()).normalize();
        let offset = (right * right_amount + up * up_amount) * self.distance();
        self.position += offset;
        self.focal_point += offset;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.focal_point, self.view_up)
    }

    /// Near and far planes that enclose `bounds`.
    pub fn clipping_range(&self, bounds: &Bounds) -> (f32, f32) {
        if bounds.is_empty() {
            return (0.01, 1000.0);
        }
        let dop = self.direction_of_projection();
        let (mut near, mut far) = (f32::INFINITY, f32::NEG_INFINITY);
        for corner in corners(bounds) {
            let depth = (corner - self.position).dot(dop);
            near = near.min(depth);
            far = far.max(depth);
        }
        let far = (far * 1.01).max(NEAR_PLANE_TOLERANCE);
        let near = (near * 0.99).max(far * NEAR_PLANE_TOLERANCE);
        (near, far)
    }
}

fn corners(bounds: &Bounds) -> [Point3<f32>; 8] {
    let (a, b) = (bounds.min, bounds.max);
    [
        Point3::new(a.x, a.y, a.z),
        Point3::new(b.x, a.y, a.z),
        Point3::new(a.x, b.y, a.z),
        Point3::new(b.x, b.y, a.z),
        Point3::new(a.x, a.y, b.z),
        Point3::new(b.x, a.y, b.z),
        Point3::new(a.x, b.y, b.z),
        Point3::new(b.x, b.y, b.z),
    ]
}

fn any_perpendicular(v: Vector3<f32>) -> Vector3<f32> {
    let candidate = if v.x.abs() < 0.9 { Vector3::unit_x() } else { Vector3::unit_y() };
    candidate.cross(v).normalize()
}

pub struct Projection {
    aspect: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self, camera: &Camera, bounds: &Bounds) -> Matrix4<f32> {
        let (znear, zfar) = camera.clipping_range(bounds);
        OPENGL_TO_WGPU_MATRIX * perspective(camera.view_angle, self.aspect, znear, zfar)
    }
}

/// Trackball-style mouse and keyboard camera control.
///
/// Left drag orbits, middle drag pans, right drag and the wheel dolly.
/// Arrow keys pan.
#[derive(Debug)]
pub struct CameraController {
    // Keyboard panning
    amount_left: f32,
    amount_right: f32,
    amount_up: f32,
    amount_down: f32,

    // Mouse drag since the last update
    mouse_dx: f32,
    mouse_dy: f32,
    is_orbiting: bool,
    is_panning: bool,
    is_dollying: bool,

    scroll: f32,

    speed: f32,
    sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, DEFAULT_SENSITIVITY)
    }
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            mouse_dx: 0.0,
            mouse_dy: 0.0,
            is_orbiting: false,
            is_panning: false,
            is_dollying: false,
            scroll: 0.0,
            speed,
            sensitivity,
        }
    }

    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::ArrowUp => {
                self.amount_up = amount;
                true
            }
            KeyCode::ArrowDown => {
                self.amount_down = amount;
                true
            }
            KeyCode::ArrowLeft => {
                self.amount_left = amount;
                true
            }
            KeyCode::ArrowRight => {
                self.amount_right = amount;
                true
            }
            _ => false,
        }
    }

    pub fn process_mouse(&mut self, mouse_dx: f64, mouse_dy: f64) {
        if self.is_orbiting || self.is_panning || self.is_dollying {
            self.mouse_dx += mouse_dx as f32;
            self.mouse_dy += mouse_dy as f32;
        }
    }

    pub fn process_mouse_button(&mut self, state: ElementState, button: MouseButton) -> bool {
        let pressed = state == ElementState::Pressed;
        let handled = match button {
            MouseButton::Left => {
                self.is_orbiting = pressed;
                true
            }
            MouseButton::Middle => {
                self.is_panning = pressed;
                true
            }
            MouseButton::Right => {
                self.is_dollying = pressed;
                true
            }
            _ => false,
        };
        if handled && !pressed {
            self.mouse_dx = 0.0;
            self.mouse_dy = 0.0;
        }
        handled
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll as f32 * 0.02,
        };
    }

    /// Whether any input is waiting to be applied.
    pub fn is_active(&self) -> bool {
        self.mouse_dx != 0.0
            || self.mouse_dy != 0.0
            || self.scroll != 0.0
            || self.amount_left != self.amount_right
            || self.amount_up != self.amount_down
    }

    /// Apply pending input. `viewport` is the window size in pixels.
    pub fn update_camera(&mut self, camera: &mut Camera, dt: Duration, viewport: (u32, u32)) {
        let dt = dt.as_secs_f32();
        let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);

        let key_pan_right = (self.amount_right - self.amount_left) * self.speed * dt;
        let key_pan_up = (self.amount_up - self.amount_down) * self.speed * dt;
        if key_pan_right != 0.0 || key_pan_up != 0.0 {
            camera.pan(key_pan_right * 0.5, key_pan_up * 0.5);
        }

        let (dx, dy) = (self.mouse_dx * self.sensitivity, self.mouse_dy * self.sensitivity);
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;

        if self.is_orbiting && (dx != 0.0 || dy != 0.0) {
            // Dragging right spins the scene right; dragging up tilts it towards the viewer.
            camera.azimuth(-dx / width * ORBIT_DEGREES_PER_VIEWPORT);
            camera.elevation(dy / height * ORBIT_DEGREES_PER_VIEWPORT);
            camera.orthogonalize_view_up();
        } else if self.is_panning && (dx != 0.0 || dy != 0.0) {
            let scale = 2.0 * (camera.view_angle / 2.0).tan() / height;
            camera.pan(-dx * scale, dy * scale);
        } else if self.is_dollying && dy != 0.0 {
            camera.dolly(DOLLY_BASE.powf(-dy / height * 10.0));
        }

        if self.scroll != 0.0 {
            camera.dolly(DOLLY_BASE.powf(self.scroll * 2.0));
            self.scroll = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Bounds {
        Bounds {
            min: Point3::new(-1.0, -1.0, -1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn reset_frames_bounds_along_current_direction() {
        let mut camera = Camera::new([1.0, 0.0, 0.0], Point3::origin(), Vector3::unit_z());
        let bounds = Bounds {
            min: Point3::new(-1.0, -1.0, 0.0),
            max: Point3::new(1.0, 1.0, 2.0),
        };
        camera.reset(&bounds);

        let expected = 3.0_f32.sqrt() / (15.0_f32).to_radians().sin();
        assert_relative_eq!(camera.focal_point.z, 1.0);
        assert_relative_eq!(camera.distance(), expected, epsilon = 1e-4);
        assert_relative_eq!(camera.position.x, expected, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn azimuth_turns_about_view_up() {
        let mut camera = Camera::new([1.0, 0.0, 0.0], Point3::origin(), Vector3::unit_z());
        camera.azimuth(90.0);
        assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.position.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn elevation_raises_the_eye() {
        let mut camera = Camera::new([1.0, 0.0, 0.0], Point3::origin(), Vector3::unit_z());
        camera.elevation(30.0);
        assert_relative_eq!(camera.position.z, 0.5, epsilon = 1e-6);
        assert_relative_eq!(camera.position.x, 0.75_f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(camera.distance(), 1.0, epsilon = 1e-6);
        // View-up is not touched by elevation.
        assert_eq!(camera.view_up, Vector3::unit_z());
    }

    #[test]
    fn orthogonalized_view_up_is_perpendicular() {
        let mut camera = Camera::new([1.0, 0.0, 0.0], Point3::origin(), Vector3::unit_z());
        camera.elevation(45.0);
        camera.orthogonalize_view_up();
        assert_relative_eq!(camera.view_up.dot(camera.direction_of_projection()), 0.0, epsilon = 1e-6);
        assert!(camera.view_up.z > 0.0);
    }

    #[test]
    fn reset_recovers_from_parallel_view_up() {
        let mut camera = Camera::new([0.0, 0.0, 1.0], Point3::origin(), Vector3::unit_z());
        camera.reset(&unit_box());
        assert!(camera.view_up.cross(camera.direction_of_projection()).magnitude() > 0.5);
    }

    #[test]
    fn clipping_range_encloses_bounds() {
        let mut camera = Camera::default();
        camera.reset(&unit_box());
        let (near, far) = camera.clipping_range(&unit_box());
        let d = camera.distance();
        assert!(near > 0.0 && near < d - 1.0);
        assert!(far > d + 1.0);
    }

    #[test]
    fn dolly_and_pan_keep_the_view_direction() {
        let mut camera = Camera::default();
        camera.dolly(2.0);
        assert_relative_eq!(camera.distance(), 0.5, epsilon = 1e-6);
        let before = camera.direction_of_projection();
        camera.pan(0.5, 0.0);
        assert_relative_eq!(camera.direction_of_projection().dot(before), 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.focal_point.x, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn left_drag_orbits() {
        let mut camera = Camera::new([1.0, 0.0, 0.0], Point3::origin(), Vector3::unit_z());
        let mut controller = CameraController::default();
        controller.process_mouse_button(ElementState::Pressed, MouseButton::Left);
        controller.process_mouse(-64.0, 0.0);
        assert!(controller.is_active());
        controller.update_camera(&mut camera, Duration::from_millis(16), (640, 480));
        assert!(camera.position.y > 0.0);
        assert!(!controller.is_active());
    }
}
