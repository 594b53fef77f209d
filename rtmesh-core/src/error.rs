//! Error types for mesh construction and loading.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Structural problems in a [`Trimesh`](crate::Trimesh).
///
/// These are reported on request (`double_check`, `validate`, `try_add_face`)
/// and never stop further construction or querying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// Per-vertex materials exist but do not match the vertex count.
    #[error("bad trimesh: wrong number of materials ({materials} for {vertices} vertices)")]
    WrongMaterialCount { materials: usize, vertices: usize },

    /// Per-vertex normals exist but do not match the vertex count.
    #[error("bad trimesh: wrong number of normals ({normals} for {vertices} vertices)")]
    WrongNormalCount { normals: usize, vertices: usize },

    /// A face referenced a vertex that has not been added yet.
    #[error("face index {index} out of range (mesh has {vertex_count} vertices)")]
    FaceIndexOutOfRange { index: usize, vertex_count: usize },
}

/// Result type for STL loading.
pub type StlResult<T> = Result<T, StlError>;

/// Errors raised while reading an STL file.
#[derive(Debug, Error)]
pub enum StlError {
    /// Shorter than the 80-byte header plus the triangle count.
    #[error("file too small to be a valid STL ({len} bytes)")]
    TooSmall { len: usize },

    /// Binary body ended before the declared number of facets.
    #[error("unexpected end of file: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// ASCII body did not match the `solid ... endsolid` grammar.
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),

    /// Building the mesh from parsed facets failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
