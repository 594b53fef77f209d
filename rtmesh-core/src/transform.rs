/// Object-to-world transforms and rotation state
use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::ray::Ray;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Affine object-to-world transform with its inverse cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
            inverse: Matrix4::identity(),
        }
    }

    /// Wrap an arbitrary matrix. Returns `None` if it is not invertible.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Option<Self> {
        let inverse = matrix.try_inverse()?;
        Some(Self { matrix, inverse })
    }

    /// Rotation applied in order: Z, Y, X
    pub fn rotation(rotation: &RotationState) -> Self {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        let matrix = rz * ry * rx;
        // Pure rotations are orthonormal
        Self {
            matrix,
            inverse: matrix.transpose(),
        }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(x, y, z)),
            inverse: Matrix4::new_translation(&Vector3::new(-x, -y, -z)),
        }
    }

    /// Non-uniform scale. Returns `None` if any factor is zero.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Option<Self> {
        Self::from_matrix(Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    /// `self` applied after `inner`
    pub fn compose(&self, inner: &Transform) -> Self {
        Self {
            matrix: self.matrix * inner.matrix,
            inverse: inner.inverse * self.inverse,
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix4<f64> {
        &self.inverse
    }

    /// Map a world-space ray into object space.
    ///
    /// The direction is left unnormalized so `t` means the same distance
    /// parameter in both spaces.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point(&ray.origin),
            self.inverse.transform_vector(&ray.direction),
        )
    }

    /// Map an object-space normal to world space (inverse transpose).
    ///
    /// A zero normal stays zero.
    pub fn normal_to_world(&self, n: &Vector3<f64>) -> Vector3<f64> {
        let linear: Matrix3<f64> = self.inverse.fixed_view::<3, 3>(0, 0).transpose();
        (linear * n).try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
