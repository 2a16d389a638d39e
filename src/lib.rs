//! freefly
//!
//! A minimal real-time 3D viewer engine built around a free-flying camera.
//! The crate opens a window, uploads primitive meshes and imported OBJ
//! models, lights them with a single point/directional/spot light and lets
//! an on-screen settings panel tune camera and light parameters live.
//!
//! High-level modules
//! - `camera`: the free-fly camera, its input controller and GPU uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, textures, primitives)
//! - `app`: the event loop and the `Scene` trait for user scenes
//! - `panel`: the on-screen settings panel
//! - `pipelines`: definitions for the render pipelines (basic, light, gui)
//! - `resources`: helpers to load textures/models and create GPU resources
//! - `render`: render composition for efficient pipeline reuse
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
