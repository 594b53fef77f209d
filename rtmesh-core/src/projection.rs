/// Camera and primary ray generation
use nalgebra::{Point3, Vector3};

use crate::ray::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for ray casting
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view in radians (perspective only)
    pub fov: f64,
    /// Image width over image height
    pub aspect: f64,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f64::consts::PI / 4.0, // 45 degrees
            aspect: f64::from(width) / f64::from(height.max(1)),
            mode: ProjectionMode::Perspective,
        }
    }

    /// Orthonormal camera frame: (forward, right, up)
    fn basis(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        (forward, right, up)
    }

    /// Ray through pixel coordinate (`px`, `py`), origin at the top-left corner.
    ///
    /// Perspective rays share the camera position; orthographic rays are
    /// parallel to the view direction with an image plane as tall as the
    /// camera-target distance.
    pub fn primary_ray(&self, px: f64, py: f64, width: u32, height: u32) -> Ray {
        let (forward, right, up) = self.basis();

        // Screen coordinates in [-1, 1], y up
        let sx = 2.0 * px / f64::from(width.max(1)) - 1.0;
        let sy = 1.0 - 2.0 * py / f64::from(height.max(1));

        match self.mode {
            ProjectionMode::Perspective => {
                let half_height = (self.fov / 2.0).tan();
                let half_width = half_height * self.aspect;
                let direction = forward + right * (sx * half_width) + up * (sy * half_height);
                Ray::new(self.position, direction.normalize())
            }
            ProjectionMode::Orthographic => {
                let half_height = (self.position - self.target).norm() / 2.0;
                let half_width = half_height * self.aspect;
                let origin = self.position + right * (sx * half_width) + up * (sy * half_height);
                Ray::new(origin, forward)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_center_ray_looks_at_target() {
        let camera = Camera::new(800, 600);
        let ray = camera.primary_ray(400.0, 300.0, 800, 600);
        assert_eq!(ray.origin, camera.position);
        assert_relative_eq!(ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_corner_rays_spread() {
        let camera = Camera::new(100, 100);
        let top_left = camera.primary_ray(0.0, 0.0, 100, 100);
        assert!(top_left.direction.x < 0.0);
        assert!(top_left.direction.y > 0.0);
        assert_relative_eq!(top_left.direction.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let mut camera = Camera::new(100, 100);
        camera.mode = ProjectionMode::Orthographic;
        let a = camera.primary_ray(0.0, 0.0, 100, 100);
        let b = camera.primary_ray(100.0, 100.0, 100, 100);
        assert_eq!(a.direction, b.direction);
        assert_relative_eq!(a.origin, Point3::new(-2.5, 2.5, 5.0), epsilon = 1e-12);
        assert_relative_eq!(b.origin, Point3::new(2.5, -2.5, 5.0), epsilon = 1e-12);
    }
}
