/// RTMesh Core Library - Triangle mesh primitive for ray tracing
///
/// This library provides an indexed triangle mesh with optional per-vertex
/// normals and materials, ray intersection with barycentric interpolation of
/// shading data, and the small set of collaborators it needs: rays, the
/// intersection record, materials, transforms, a camera, and an STL loader.

pub mod error;
pub mod face;
pub mod material;
pub mod mesh;
pub mod object;
pub mod projection;
pub mod ray;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use error::{MeshError, MeshResult, StlError, StlResult};
pub use face::{FaceRef, TrimeshFace};
pub use material::Material;
pub use mesh::Trimesh;
pub use object::SceneObject;
pub use projection::{Camera, ProjectionMode};
pub use ray::{FaceId, Isect, Ray, MISS_DISTANCE};
pub use transform::{RotationState, Transform};
