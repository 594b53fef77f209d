/// Triangle faces of a `Trimesh` and the ray/triangle test
use std::ops::Index;

use nalgebra::{Point3, Vector2, Vector3};

use crate::material::Material;
use crate::mesh::Trimesh;
use crate::object::SceneObject;
use crate::ray::{FaceId, Isect, Ray};
use crate::transform::Transform;

/// One triangle of a mesh.
///
/// Holds indices into the mesh's vertex arrays plus its own plane in Hessian
/// normal form (`dot(normal, p) == dist` for points on the plane).
#[derive(Debug, Clone)]
pub struct TrimeshFace {
    ids: [usize; 3],
    normal: Vector3<f64>,
    dist: f64,
    degen: bool,
    material: Material,
    transform: Transform,
}

impl TrimeshFace {
    /// Build a face over `vertices[ids]` and classify it.
    ///
    /// Collinear or coincident corners give a zero cross product; such a face
    /// is still returned but flagged by [`is_degenerate`](Self::is_degenerate)
    /// and carries a zero normal. Callers decide whether to keep it.
    ///
    /// # Panics
    ///
    /// Panics if any id is out of range for `vertices`.
    pub fn new(
        vertices: &[Point3<f64>],
        ids: [usize; 3],
        material: Material,
        transform: Transform,
    ) -> Self {
        let a = vertices[ids[0]];
        let b = vertices[ids[1]];
        let c = vertices[ids[2]];

        let unit = (b - a)
            .cross(&(c - a))
            .try_normalize(0.0)
            .filter(|n| n.iter().all(|v| v.is_finite()));

        let (normal, dist, degen) = match unit {
            Some(normal) => (normal, normal.dot(&a.coords), false),
            None => (Vector3::zeros(), 0.0, true),
        };

        Self {
            ids,
            normal,
            dist,
            degen,
            material,
            transform,
        }
    }

    pub fn ids(&self) -> [usize; 3] {
        self.ids
    }

    /// Unit plane normal, following the a→b→c winding
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn dist(&self) -> f64 {
        self.dist
    }

    pub fn is_degenerate(&self) -> bool {
        self.degen
    }

    /// Fallback material, used when the mesh has no per-vertex materials
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

impl Index<usize> for TrimeshFace {
    type Output = usize;

    fn index(&self, corner: usize) -> &usize {
        &self.ids[corner]
    }
}

/// A face viewed inside the mesh that owns it.
#[derive(Debug, Clone, Copy)]
pub struct FaceRef<'a> {
    mesh: &'a Trimesh,
    face: &'a TrimeshFace,
    id: FaceId,
}

impl<'a> FaceRef<'a> {
    pub(crate) fn new(mesh: &'a Trimesh, face: &'a TrimeshFace, id: FaceId) -> Self {
        Self { mesh, face, id }
    }

    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn face(&self) -> &'a TrimeshFace {
        self.face
    }

    /// Corner positions a, b, c
    pub fn positions(&self) -> [Point3<f64>; 3] {
        let vertices = self.mesh.vertices();
        self.face.ids.map(|id| vertices[id])
    }

    /// Per-vertex normals of the three corners, if the mesh carries them
    fn vertex_normals(&self) -> Option<[Vector3<f64>; 3]> {
        if !self.mesh.has_vertex_normals() {
            return None;
        }
        let normals = self.mesh.normals();
        let [a, b, c] = self.face.ids;
        Some([*normals.get(a)?, *normals.get(b)?, *normals.get(c)?])
    }

    fn vertex_materials(&self) -> Option<[&'a Material; 3]> {
        let materials = self.mesh.materials();
        if materials.is_empty() {
            return None;
        }
        let [a, b, c] = self.face.ids;
        Some([materials.get(a)?, materials.get(b)?, materials.get(c)?])
    }
}

fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

impl SceneObject for FaceRef<'_> {
    fn transform(&self) -> &Transform {
        &self.face.transform
    }

    /// Ray/triangle test.
    ///
    /// On a hit fills `isect` with the distance, barycentric weights, an
    /// interpolated normal facing the ray, and the interpolated material.
    /// On a miss `isect` is left untouched.
    fn intersect_local(&self, ray: &Ray, isect: &mut Isect) -> bool {
        let normal = self.face.normal;

        // Plane hit; exact comparisons, no tolerance
        let tnum = normal.dot(&ray.origin.coords) - self.face.dist;
        let tdenom = normal.dot(&ray.direction);
        if tdenom == 0.0 {
            return false;
        }
        let t = -(tnum / tdenom);
        if t < 0.0 {
            return false;
        }

        let q = ray.at(t);
        let [a, b, c] = self.positions();

        // Inside when Q is on the inner side of every edge, boundary included
        let side_ab = normal.dot(&(b - a).cross(&(q - a)));
        let side_bc = normal.dot(&(c - b).cross(&(q - b)));
        let side_ca = normal.dot(&(a - c).cross(&(q - c)));
        let inside = side_ab >= 0.0 && side_bc >= 0.0 && side_ca >= 0.0;
        if !inside {
            return false;
        }

        let abc = (b - a).cross(&(c - a)).dot(&normal);
        let alpha = (b - q).cross(&(c - q)).dot(&normal) / abc;
        let beta = (c - q).cross(&(a - q)).dot(&normal) / abc;
        let gamma = 1.0 - alpha - beta;

        let shading = match self.vertex_normals() {
            Some([na, nb, nc]) => {
                unit_or_zero(na) * alpha + unit_or_zero(nb) * beta + unit_or_zero(nc) * gamma
            }
            // Component-wise weighting of the face normal, kept as-is
            None => unit_or_zero(Vector3::new(
                normal.x * alpha,
                normal.y * beta,
                normal.z * gamma,
            )),
        };

        // +1 facing the ray, -1 facing away, 0 when exactly edge-on
        let check = shading.dot(&ray.direction);
        let facing = if check < 0.0 {
            1.0
        } else if check > 0.0 {
            -1.0
        } else {
            0.0
        };

        let material = match self.vertex_materials() {
            Some([ma, mb, mc]) => alpha * ma + beta * mb + gamma * mc,
            None => self.face.material.clone(),
        };

        isect.object = Some(self.id);
        isect.t = t;
        isect.set_bary(alpha, beta, gamma);
        isect.uv = Vector2::new(alpha, beta);
        isect.n = shading * facing;
        isect.material = material;
        true
    }

    /// Faces are tested directly in mesh space.
    fn intersect(&self, ray: &Ray, isect: &mut Isect) -> bool {
        self.intersect_local(ray, isect)
    }
}
