//! snake-gl
//!
//! A small real-time rendering scaffold for learning graphics programming.
//! It opens a window, drives a free-fly camera from keyboard and mouse input,
//! compiles and links shader programs and generates simple primitive meshes
//! (triangle, quad, cube) with optional texturing.
//!
//! High-level modules
//! - `app`: window bootstrap, the `Scene` trait and the frame loop
//! - `camera`: camera types, controller and uniforms for view/projection
//! - `config`: window and camera settings with environment overrides
//! - `context`: GPU and window context that owns device/queue/surface
//! - `data_structures`: meshes, textures and transforms
//! - `pipelines`: render pipeline construction
//! - `resources`: helpers to load shaders and textures from the asset root
//! - `shader`: shader programs with compile/link diagnostics and uniforms
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod resources;
pub mod shader;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
