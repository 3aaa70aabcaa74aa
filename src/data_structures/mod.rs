//! Data handed to the GPU: meshes, textures and transforms.
//!
//! - `mesh` holds the vertex layout, the primitive generators and GPU buffers
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `transform` holds per-object position, rotation and scale

pub mod mesh;
pub mod texture;
pub mod transform;
