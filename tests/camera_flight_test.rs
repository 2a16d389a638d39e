//! Drives the camera through a scripted flight session using only the
//! public API, the way the event loop does: buffer input on the controller,
//! apply it once per frame, then read the matrices.

use std::time::Duration;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};
use freefly::camera::{Camera, CameraController, CameraMovement, CameraUniform};
use winit::keyboard::KeyCode;

const EPS: f32 = 1e-4;

fn assert_basis_invariants(camera: &Camera) {
    assert!((camera.orientation().magnitude() - 1.0).abs() < EPS);
    assert!((camera.right().magnitude() - 1.0).abs() < EPS);
    assert!(camera.right().dot(camera.orientation()).abs() < EPS);
    assert!(camera.right().dot(camera.up()).abs() < EPS);
    assert!(camera.pitch() >= -89.0 && camera.pitch() <= 89.0);
    assert!(camera.field_of_view() >= 1.0 && camera.field_of_view() <= 180.0);
}

#[test]
fn default_configuration_matches_the_documented_constants() {
    let camera = Camera::default();
    assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
    assert_eq!(camera.up(), Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(camera.yaw(), 0.0);
    assert_eq!(camera.pitch(), 0.0);
    assert_eq!(camera.movement_speed(), 10.0);
    assert_eq!(camera.mouse_sensitivity(), 0.1);
    assert_eq!(camera.field_of_view(), 45.0);
    assert_eq!(camera.clip_planes(), (0.1, 100.0));
    assert_basis_invariants(&camera);
}

#[test]
fn a_full_flight_session_keeps_every_invariant() {
    let mut camera = Camera::new((0.0, 2.0, 8.0), (0.0, 1.0, 0.0), Deg(-90.0), Deg(-10.0));
    let mut controller = CameraController::new();
    let frame = Duration::from_millis(16);

    // fly forward-left while looking around and zooming
    controller.handle_key(KeyCode::KeyW, true);
    controller.handle_key(KeyCode::KeyA, true);
    for i in 0..120 {
        controller.handle_mouse(3.0, if i % 2 == 0 { -1.5 } else { 1.5 });
        if i % 10 == 0 {
            controller.handle_scroll(&winit::event::MouseScrollDelta::LineDelta(0.0, 1.0));
        }
        controller.update(&mut camera, frame);
        assert_basis_invariants(&camera);
    }
    controller.handle_key(KeyCode::KeyW, false);
    controller.handle_key(KeyCode::KeyA, false);
    assert!(camera.position() != Point3::new(0.0, 2.0, 8.0));
    assert!(camera.field_of_view() < 45.0);

    // vertical strafing
    controller.handle_key(KeyCode::KeyE, true);
    controller.update(&mut camera, Duration::from_secs(1));
    controller.handle_key(KeyCode::KeyE, false);
    controller.handle_key(KeyCode::KeyQ, true);
    controller.update(&mut camera, Duration::from_secs(2));
    controller.handle_key(KeyCode::KeyQ, false);
    assert_basis_invariants(&camera);

    // reset returns to the factory configuration
    controller.handle_key(KeyCode::Space, true);
    controller.update(&mut camera, frame);
    assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
    assert_eq!(camera.field_of_view(), 45.0);
    assert_basis_invariants(&camera);
}

#[test]
fn matrices_read_after_update_reflect_the_frame_input() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    controller.handle_mouse(40.0, 0.0);
    let stale_view = camera.view_matrix();
    controller.update(&mut camera, Duration::from_millis(16));
    let fresh_view = camera.view_matrix();

    assert!(stale_view != fresh_view);
    let expected = Matrix4::look_to_rh(camera.position(), camera.orientation(), camera.up());
    assert_eq!(fresh_view, expected);

    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, 16.0 / 9.0);
}

#[test]
fn held_keys_integrate_displacement_over_frames() {
    // looking straight down -z, speed 10
    let mut camera = Camera::new((0.0, 0.0, 3.0), (0.0, 1.0, 0.0), Deg(-90.0), Deg(0.0));
    let mut controller = CameraController::new();

    controller.handle_key(KeyCode::KeyW, true);
    for _ in 0..100 {
        controller.update(&mut camera, Duration::from_millis(10));
    }

    // 1 second of flight: 10 world units along -z
    let expected = Point3::new(0.0, 0.0, -7.0);
    assert!((camera.position() - expected).magnitude() < 1e-3);
}

#[test]
fn look_input_before_a_reset_never_leaks_stale_orientation() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    // push pitch against the clamp, then reset
    for _ in 0..50 {
        controller.handle_mouse(0.0, -100.0);
        controller.update(&mut camera, Duration::from_millis(16));
    }
    assert_eq!(camera.pitch(), 89.0);

    controller.handle_key(KeyCode::Space, true);
    controller.update(&mut camera, Duration::from_millis(16));
    assert_eq!(camera.pitch(), 0.0);
    assert_eq!(camera.yaw(), 0.0);
    assert_basis_invariants(&camera);
}
