/// Surface material coefficients and their blending arithmetic
use std::ops::{Add, AddAssign, Mul};

use nalgebra::Vector3;

/// Phong-style material.
///
/// Materials only need to be scaled and summed so that per-vertex materials
/// can be blended with barycentric weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Emissive
    pub ke: Vector3<f64>,
    /// Ambient
    pub ka: Vector3<f64>,
    /// Specular
    pub ks: Vector3<f64>,
    /// Diffuse
    pub kd: Vector3<f64>,
    /// Reflective
    pub kr: Vector3<f64>,
    /// Transmissive
    pub kt: Vector3<f64>,
    pub shininess: f64,
    /// Index of refraction
    pub index: f64,
}

impl Material {
    pub fn new() -> Self {
        Self {
            ke: Vector3::zeros(),
            ka: Vector3::zeros(),
            ks: Vector3::zeros(),
            kd: Vector3::zeros(),
            kr: Vector3::zeros(),
            kt: Vector3::zeros(),
            shininess: 0.0,
            index: 1.0,
        }
    }

    /// A plain diffuse material with a matching ambient term
    pub fn diffuse(kd: Vector3<f64>) -> Self {
        Self {
            ka: kd * 0.1,
            kd,
            ..Self::new()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<f64> for &Material {
    type Output = Material;

    fn mul(self, s: f64) -> Material {
        Material {
            ke: self.ke * s,
            ka: self.ka * s,
            ks: self.ks * s,
            kd: self.kd * s,
            kr: self.kr * s,
            kt: self.kt * s,
            shininess: self.shininess * s,
            index: self.index * s,
        }
    }
}

impl Mul<f64> for Material {
    type Output = Material;

    fn mul(self, s: f64) -> Material {
        &self * s
    }
}

impl Mul<&Material> for f64 {
    type Output = Material;

    fn mul(self, m: &Material) -> Material {
        m * self
    }
}

impl AddAssign<&Material> for Material {
    fn add_assign(&mut self, rhs: &Material) {
        self.ke += rhs.ke;
        self.ka += rhs.ka;
        self.ks += rhs.ks;
        self.kd += rhs.kd;
        self.kr += rhs.kr;
        self.kt += rhs.kt;
        self.shininess += rhs.shininess;
        self.index += rhs.index;
    }
}

impl AddAssign for Material {
    fn add_assign(&mut self, rhs: Material) {
        *self += &rhs;
    }
}

impl Add for Material {
    type Output = Material;

    fn add(mut self, rhs: Material) -> Material {
        self += &rhs;
        self
    }
}
