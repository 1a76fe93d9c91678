/// surfgen Core Library - Procedural meshes and transform math
///
/// This library provides the stateless core for the surface demos:
/// 4x4 transform utilities, parametric surface and curve generators,
/// the tube sweep, and the thin scene graph the Piplup model is built on.
/// Presentation crates consume the flat vertex/index buffers and matrices.

pub mod camera;
pub mod curve;
pub mod demos;
pub mod error;
pub mod geometry;
pub mod piplup;
pub mod projection;
pub mod scene;
pub mod surface;
pub mod transform;
pub mod tube;

// Re-export commonly used types
pub use camera::{CameraState, KeyNudge};
pub use demos::DemoScene;
pub use error::{Error, Result};
pub use geometry::{Mesh, Topology, VertexLayout};
pub use piplup::PiplupDetail;
pub use projection::{get_projection, View};
pub use scene::{DrawItem, Material, Part, PartId, Scene, TextureRef};
pub use transform::Mat4;
pub use tube::FrameStrategy;
