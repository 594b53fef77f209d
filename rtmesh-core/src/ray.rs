/// Rays and the intersection record filled in by scene objects
use nalgebra::{Point3, Vector2, Vector3};

use crate::material::Material;

/// Parametric distance written into an [`Isect`] when a mesh is missed.
pub const MISS_DISTANCE: f64 = 1000.0;

/// A ray `origin + direction * t`.
///
/// The direction is not required to be unit length; `t` is always measured
/// in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Point reached after travelling `t` along the ray
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

/// Index of a face inside its owning mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

/// Intersection record, mutated in place by `intersect` calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Isect {
    /// Face that produced the hit, if any.
    pub object: Option<FaceId>,
    pub t: f64,
    pub material: Material,
    /// Shading normal, oriented against the incoming ray.
    pub n: Vector3<f64>,
    /// Barycentric weights of the hit for vertices a, b, c.
    pub bary: Vector3<f64>,
    /// Surface coordinate, the (alpha, beta) pair of `bary`.
    pub uv: Vector2<f64>,
}

impl Isect {
    pub fn new() -> Self {
        Self {
            object: None,
            t: 0.0,
            material: Material::default(),
            n: Vector3::zeros(),
            bary: Vector3::zeros(),
            uv: Vector2::zeros(),
        }
    }

    pub fn set_bary(&mut self, alpha: f64, beta: f64, gamma: f64) {
        self.bary = Vector3::new(alpha, beta, gamma);
    }
}

impl Default for Isect {
    fn default() -> Self {
        Self::new()
    }
}
