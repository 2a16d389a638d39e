//! Free-fly camera: orientation math, input integration and GPU resources.
//!
//! The camera is a continuous-state object parameterized by yaw/pitch Euler
//! angles (degrees). Its look direction is always derived from those angles,
//! never set directly, and the derived basis (`orientation`, `up`, `right`)
//! stays unit-length and mutually orthogonal across any sequence of calls.
//!
//! Input flows in through [`CameraController`], which buffers key-held state
//! and raw pointer deltas between frames and applies them in one
//! [`CameraController::update`] call, so matrices read afterwards always
//! reflect the full frame's input.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    event::{MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const DEFAULT_POSITION: Point3<f32> = Point3::new(0.0, 0.0, 3.0);
const DEFAULT_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
const DEFAULT_SPEED: f32 = 10.0;
const DEFAULT_SENSITIVITY: f32 = 0.1;
const DEFAULT_FOV: f32 = 45.0;
const DEFAULT_ZNEAR: f32 = 0.1;
const DEFAULT_ZFAR: f32 = 100.0;

/// Pitch must stay strictly off the poles or the view basis degenerates.
const PITCH_LIMIT: f32 = 89.0;
const FOV_MIN: f32 = 1.0;
const FOV_MAX: f32 = 180.0;
/// A stored fov of exactly 180 is representable but not projectable.
const FOV_PROJECTION_MAX: f32 = 179.0;
/// Smallest accepted near-plane distance and near/far separation.
const CLIP_EPSILON: f32 = 1e-4;

/// Closed set of movement directions the keyboard can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// A free-flying first-person camera.
///
/// All scalar settings are clamped on every write path, so the invariants
/// (`pitch` in [-89, 89], `field_of_view` in [1, 180], `0 < znear < zfar`)
/// hold no matter whether a mutation came from input processing or from an
/// external settings panel.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Point3<f32>,
    orientation: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    field_of_view: f32,
    znear: f32,
    zfar: f32,
}

impl Camera {
    /// Create a camera at `position` looking along the direction described by
    /// `yaw`/`pitch` (degrees) relative to the given `up` vector.
    ///
    /// The supplied pitch is clamped and `up` is normalized, then
    /// `orientation` and `right` are derived immediately.
    pub fn new(
        position: impl Into<Point3<f32>>,
        up: impl Into<Vector3<f32>>,
        yaw: impl Into<Deg<f32>>,
        pitch: impl Into<Deg<f32>>,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            orientation: Vector3::new(0.0, 0.0, -1.0),
            up: up.into().normalize(),
            right: Vector3::new(0.0, 0.0, 0.0),
            yaw: yaw.into().0,
            pitch: pitch.into().0.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            field_of_view: DEFAULT_FOV,
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
        };
        camera.update_vectors();
        camera
    }

    /// The look-at view transform for the current position and orientation.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.orientation, self.up)
    }

    /// Right-handed perspective projection from the stored vertical fov and
    /// clip planes. A degenerate aspect ratio falls back to 1.
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let fovy = self.field_of_view.min(FOV_PROJECTION_MAX);
        perspective(Deg(fovy), aspect, self.znear, self.zfar)
    }

    /// Displace the camera along its basis vectors.
    ///
    /// The step is `movement_speed * delta_time` and is applied
    /// instantaneously. A negative or non-finite `delta_time` contributes no
    /// displacement.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.orientation * velocity,
            CameraMovement::Backward => self.position -= self.orientation * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.up * velocity,
            CameraMovement::Down => self.position -= self.up * velocity,
        }
    }

    /// Turn the camera by raw pointer deltas (pixels).
    ///
    /// Offsets are scaled by `mouse_sensitivity`, added to yaw/pitch, and the
    /// pitch is clamped before the basis is re-derived. Non-finite offsets
    /// discard the whole update.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        if !x_offset.is_finite() || !y_offset.is_finite() {
            log::debug!("discarding non-finite mouse delta ({x_offset}, {y_offset})");
            return;
        }
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch =
            (self.pitch + y_offset * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Zoom by decrementing the field of view, then clamp to [1, 180].
    ///
    /// Decrement-then-clamp: one large scroll step may shoot past a bound and
    /// must land exactly on it.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        if !y_offset.is_finite() {
            log::debug!("discarding non-finite scroll delta {y_offset}");
            return;
        }
        self.field_of_view = (self.field_of_view - y_offset).clamp(FOV_MIN, FOV_MAX);
    }

    /// Restore every property to the factory configuration and re-derive the
    /// basis vectors. Calling this twice in a row is the same as once.
    pub fn reset(&mut self) {
        self.position = DEFAULT_POSITION;
        self.up = DEFAULT_UP;
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.movement_speed = DEFAULT_SPEED;
        self.mouse_sensitivity = DEFAULT_SENSITIVITY;
        self.field_of_view = DEFAULT_FOV;
        self.znear = DEFAULT_ZNEAR;
        self.zfar = DEFAULT_ZFAR;
        self.update_vectors();
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Point3<f32>>) {
        self.position = position.into();
    }

    /// Unit look direction. Re-normalized on read so accumulated float error
    /// never leaks out.
    pub fn orientation(&self) -> Vector3<f32> {
        self.orientation.normalize()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Unit right vector, orthogonal to orientation and up. Re-normalized on
    /// read.
    pub fn right(&self) -> Vector3<f32> {
        self.right.normalize()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.movement_speed = speed.max(0.0);
        }
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_finite() {
            self.mouse_sensitivity = sensitivity.max(0.0);
        }
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    pub fn set_field_of_view(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.field_of_view = degrees.clamp(FOV_MIN, FOV_MAX);
        }
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    /// Set the near/far clip distances, keeping `0 < znear < zfar`.
    pub fn set_clip_planes(&mut self, znear: f32, zfar: f32) {
        if !znear.is_finite() || !zfar.is_finite() {
            log::debug!("discarding non-finite clip planes ({znear}, {zfar})");
            return;
        }
        self.znear = znear.max(CLIP_EPSILON);
        self.zfar = zfar.max(self.znear + CLIP_EPSILON);
    }

    /// Re-derive `orientation` from `(yaw, pitch)` and `right` from
    /// `(orientation, up)`.
    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = Rad::from(Deg(self.yaw)).0.sin_cos();
        let (pitch_sin, pitch_cos) = Rad::from(Deg(self.pitch)).0.sin_cos();
        self.orientation =
            Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.orientation.cross(self.up).normalize();
    }
}

impl Default for Camera {
    /// Factory configuration: position (0, 0, 3), up (0, 1, 0), yaw 0,
    /// pitch 0.
    fn default() -> Self {
        Self::new(DEFAULT_POSITION, DEFAULT_UP, Deg(0.0), Deg(0.0))
    }
}

/// Buffers raw input between frames and applies it to a [`Camera`] in one
/// deterministic step per frame.
///
/// The application's event handlers only flip flags and accumulate deltas
/// here; nothing touches the camera until [`update`](Self::update) runs, so a
/// frame's matrices are read strictly after its input.
#[derive(Clone, Debug, Default)]
pub struct CameraController {
    move_forward: bool,
    move_backward: bool,
    move_left: bool,
    move_right: bool,
    move_up: bool,
    move_down: bool,
    rotate_dx: f32,
    rotate_dy: f32,
    scroll: f32,
    reset_pending: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit window event. Key and scroll events are consumed; all
    /// others are ignored.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event: key, .. } => {
                if let PhysicalKey::Code(code) = key.physical_key {
                    self.handle_key(code, key.state.is_pressed());
                }
            }
            WindowEvent::MouseWheel { delta, .. } => self.handle_scroll(delta),
            _ => (),
        }
    }

    /// Track the hold state of the movement keys; Space requests a reset.
    pub fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::KeyW => self.move_forward = pressed,
            KeyCode::KeyS => self.move_backward = pressed,
            KeyCode::KeyA => self.move_left = pressed,
            KeyCode::KeyD => self.move_right = pressed,
            KeyCode::KeyE => self.move_up = pressed,
            KeyCode::KeyQ => self.move_down = pressed,
            KeyCode::Space if pressed => self.reset_pending = true,
            _ => (),
        }
    }

    /// Accumulate a raw pointer delta (winit device coordinates: y grows
    /// downwards).
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_dx += dx as f32;
        self.rotate_dy += dy as f32;
    }

    /// Accumulate a scroll delta in lines; pixel deltas are converted.
    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, lines) => *lines,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
        };
    }

    /// Apply all buffered input to the camera for a frame of length `dt`.
    ///
    /// Order: pending reset, held-key movement, accumulated mouse look,
    /// accumulated zoom. Look input buffered in the same frame as a reset is
    /// applied on top of the reset state.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        if self.reset_pending {
            camera.reset();
            self.reset_pending = false;
        }

        let dt = dt.as_secs_f32();
        if self.move_forward {
            camera.process_keyboard(CameraMovement::Forward, dt);
        }
        if self.move_backward {
            camera.process_keyboard(CameraMovement::Backward, dt);
        }
        if self.move_left {
            camera.process_keyboard(CameraMovement::Left, dt);
        }
        if self.move_right {
            camera.process_keyboard(CameraMovement::Right, dt);
        }
        if self.move_up {
            camera.process_keyboard(CameraMovement::Up, dt);
        }
        if self.move_down {
            camera.process_keyboard(CameraMovement::Down, dt);
        }

        if self.rotate_dx != 0.0 || self.rotate_dy != 0.0 {
            // Screen y grows downwards, pitch grows upwards.
            camera.process_mouse_movement(self.rotate_dx, -self.rotate_dy);
            self.rotate_dx = 0.0;
            self.rotate_dy = 0.0;
        }

        if self.scroll != 0.0 {
            camera.process_mouse_scroll(self.scroll);
            self.scroll = 0.0;
        }
    }
}

/// The camera state uploaded to shaders once per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, aspect: f32) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj =
            (OPENGL_TO_WGPU_MATRIX * camera.projection_matrix(aspect) * camera.view_matrix())
                .into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera plus everything the GPU needs to consume it.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, 1.0);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = Self::layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller: CameraController::new(),
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        })
    }

    /// Refresh the uniform from the camera and upload it.
    pub fn write(&mut self, queue: &wgpu::Queue, aspect: f32) {
        self.uniform.update_view_proj(&self.camera, aspect);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    const EPS: f32 = 1e-5;

    fn closed_form_orientation(yaw: f32, pitch: f32) -> Vector3<f32> {
        let yaw = yaw.to_radians();
        let pitch = pitch.to_radians();
        Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    #[test]
    fn orientation_is_unit_length_across_angle_range() {
        for yaw in (-10_000..=10_000).step_by(509) {
            for pitch in (-89..=89).step_by(13) {
                let camera = Camera::new(
                    (0.0, 0.0, 0.0),
                    (0.0, 1.0, 0.0),
                    Deg(yaw as f32),
                    Deg(pitch as f32),
                );
                assert!(
                    (camera.orientation().magnitude() - 1.0).abs() < EPS,
                    "yaw {yaw} pitch {pitch}"
                );
            }
        }
    }

    #[test]
    fn pitch_clamps_and_clamped_value_is_persisted() {
        let mut camera = Camera::default();
        // sensitivity 0.1 turns a +1000 raw delta into +100 degrees of pitch
        camera.process_mouse_movement(0.0, 1000.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse_movement(0.0, -1000.0);
        // 89 - 100: re-clamped at the other bound, not 89 - 100 from a stale 100
        assert_eq!(camera.pitch(), -11.0);
    }

    #[test]
    fn fov_stays_in_range_under_repeated_scroll() {
        let offsets = [3.0, -1000.0, 17.5, 999.0, -0.25, 1000.0, -1000.0, 44.0];
        let mut camera = Camera::default();
        for offset in offsets {
            camera.process_mouse_scroll(offset);
            assert!(camera.field_of_view() >= FOV_MIN);
            assert!(camera.field_of_view() <= FOV_MAX);
        }
    }

    #[test]
    fn right_is_orthogonal_after_any_mutation() {
        let mut camera = Camera::new((1.0, 2.0, 3.0), (0.0, 1.0, 0.0), Deg(12.0), Deg(-30.0));
        camera.process_mouse_movement(250.0, -75.0);
        camera.process_keyboard(CameraMovement::Left, 0.5);
        camera.process_mouse_scroll(5.0);
        assert!(camera.right().dot(camera.orientation()).abs() < EPS);
        assert!(camera.right().dot(camera.up()).abs() < EPS);

        camera.reset();
        assert!(camera.right().dot(camera.orientation()).abs() < EPS);
        assert!(camera.right().dot(camera.up()).abs() < EPS);
    }

    #[test]
    fn reset_is_idempotent_and_matches_factory_defaults() {
        let mut camera = Camera::new((5.0, -2.0, 9.0), (0.0, 0.0, 1.0), Deg(123.0), Deg(45.0));
        camera.set_movement_speed(77.0);
        camera.set_field_of_view(160.0);
        camera.set_clip_planes(2.0, 20.0);

        camera.reset();
        let once = camera.clone();
        camera.reset();

        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.yaw(), 0.0);
        assert_eq!(camera.pitch(), 0.0);
        assert_eq!(camera.field_of_view(), 45.0);
        assert_eq!(camera.movement_speed(), 10.0);
        assert_eq!(camera.mouse_sensitivity(), 0.1);
        assert_eq!(camera.clip_planes(), (0.1, 100.0));
        assert_eq!(camera.position(), once.position());
        assert_eq!(camera.orientation(), once.orientation());
        assert_eq!(camera.right(), once.right());
    }

    #[test]
    fn construction_derives_orientation_from_supplied_angles() {
        let camera = Camera::new((1.0, 1.0, 1.0), (0.0, 1.0, 0.0), Deg(30.0), Deg(20.0));
        let expected = closed_form_orientation(30.0, 20.0);
        let got = camera.orientation();
        assert!((got - expected).magnitude() < EPS, "{got:?} vs {expected:?}");
    }

    #[test]
    fn forward_step_moves_along_orientation() {
        // yaw -90 gives the canonical (0, 0, -1) look direction
        let mut camera = Camera::new((0.0, 0.0, 3.0), (0.0, 1.0, 0.0), Deg(-90.0), Deg(0.0));
        assert!((camera.orientation() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPS);
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        let got = camera.position();
        assert!((got - Point3::new(0.0, 0.0, -7.0)).magnitude() < EPS, "{got:?}");
    }

    #[test]
    fn scroll_decrements_then_clamps() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.field_of_view(), 35.0);
        camera.process_mouse_scroll(200.0);
        assert_eq!(camera.field_of_view(), 1.0);
        camera.process_mouse_scroll(-1000.0);
        assert_eq!(camera.field_of_view(), 180.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut camera = Camera::default();
        let before = camera.clone();

        camera.process_mouse_movement(f32::NAN, 3.0);
        camera.process_mouse_movement(2.0, f32::INFINITY);
        camera.process_mouse_scroll(f32::NAN);
        camera.process_keyboard(CameraMovement::Forward, f32::NAN);
        camera.process_keyboard(CameraMovement::Forward, -5.0);
        camera.set_field_of_view(f32::NAN);
        camera.set_movement_speed(f32::NEG_INFINITY);
        camera.set_clip_planes(f32::NAN, 10.0);

        assert_eq!(camera.position(), before.position());
        assert_eq!(camera.yaw(), before.yaw());
        assert_eq!(camera.pitch(), before.pitch());
        assert_eq!(camera.field_of_view(), before.field_of_view());
        assert_eq!(camera.movement_speed(), before.movement_speed());
        assert_eq!(camera.clip_planes(), before.clip_planes());
    }

    #[test]
    fn clip_plane_writes_keep_near_below_far() {
        let mut camera = Camera::default();
        camera.set_clip_planes(0.0, 0.0);
        let (near, far) = camera.clip_planes();
        assert!(near > 0.0);
        assert!(far > near);

        camera.set_clip_planes(50.0, 10.0);
        let (near, far) = camera.clip_planes();
        assert_eq!(near, 50.0);
        assert!(far > near);
    }

    #[test]
    fn external_setters_clamp_like_input_paths() {
        let mut camera = Camera::default();
        camera.set_field_of_view(0.0);
        assert_eq!(camera.field_of_view(), 1.0);
        camera.set_field_of_view(500.0);
        assert_eq!(camera.field_of_view(), 180.0);
        camera.set_movement_speed(-3.0);
        assert_eq!(camera.movement_speed(), 0.0);
        camera.set_mouse_sensitivity(-1.0);
        assert_eq!(camera.mouse_sensitivity(), 0.0);
    }

    #[test]
    fn projection_survives_degenerate_aspect_and_wide_fov() {
        let mut camera = Camera::default();
        camera.set_field_of_view(180.0);
        for aspect in [f32::NAN, 0.0, -2.0, 16.0 / 9.0] {
            let proj = camera.projection_matrix(aspect);
            let col: Vector4<f32> = proj.x;
            assert!(col.x.is_finite());
        }
    }

    #[test]
    fn controller_applies_buffered_input_once() {
        let mut camera = Camera::new((0.0, 0.0, 3.0), (0.0, 1.0, 0.0), Deg(-90.0), Deg(0.0));
        let mut controller = CameraController::new();

        controller.handle_key(KeyCode::KeyW, true);
        controller.handle_mouse(10.0, -20.0);
        controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 2.0));
        controller.update(&mut camera, Duration::from_millis(500));

        // speed 10 * 0.5s along -z
        assert!((camera.position().z - -2.0).abs() < 1e-4);
        // dx 10 * sensitivity 0.1, dy inverted
        assert!((camera.yaw() - -89.0).abs() < 1e-4);
        assert!((camera.pitch() - 2.0).abs() < 1e-4);
        assert_eq!(camera.field_of_view(), 43.0);

        // deltas were consumed; a second update only moves
        let yaw = camera.yaw();
        controller.update(&mut camera, Duration::from_millis(500));
        assert_eq!(camera.yaw(), yaw);

        controller.handle_key(KeyCode::KeyW, false);
        let position = camera.position();
        controller.update(&mut camera, Duration::from_millis(500));
        assert_eq!(camera.position(), position);
    }

    #[test]
    fn reset_key_applies_before_buffered_look() {
        let mut camera = Camera::new((9.0, 9.0, 9.0), (0.0, 1.0, 0.0), Deg(50.0), Deg(50.0));
        let mut controller = CameraController::new();

        controller.handle_key(KeyCode::Space, true);
        controller.handle_mouse(100.0, 0.0);
        controller.update(&mut camera, Duration::from_millis(16));

        // factory state plus the buffered 10 degrees of yaw
        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
        assert!((camera.yaw() - 10.0).abs() < 1e-4);
        assert_eq!(camera.pitch(), 0.0);
    }
}
