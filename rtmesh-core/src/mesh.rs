/// Triangle mesh primitive: shared vertex data plus owned faces
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::face::{FaceRef, TrimeshFace};
use crate::material::Material;
use crate::object::SceneObject;
use crate::ray::{FaceId, Isect, Ray, MISS_DISTANCE};
use crate::transform::Transform;

/// A triangle mesh.
///
/// Vertices, then per-vertex normals and materials (in vertex order), then
/// faces are added after creation. Normals and materials are either absent or
/// exactly one per vertex; [`double_check`](Self::double_check) reports
/// meshes that break this.
#[derive(Debug, Clone)]
pub struct Trimesh {
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    materials: Vec<Material>,
    faces: Vec<TrimeshFace>,
    vert_norms: bool,
    material: Material,
    transform: Transform,
}

impl Trimesh {
    /// Empty mesh. `material` is copied into every face as its fallback.
    pub fn new(material: Material, transform: Transform) -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            materials: Vec::new(),
            faces: Vec::new(),
            vert_norms: false,
            material,
            transform,
        }
    }

    pub fn with_capacity(
        vertex_capacity: usize,
        face_capacity: usize,
        material: Material,
        transform: Transform,
    ) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            faces: Vec::with_capacity(face_capacity),
            ..Self::new(material, transform)
        }
    }

    pub fn add_vertex(&mut self, v: Point3<f64>) {
        self.vertices.push(v);
    }

    /// Append a per-vertex normal. Counts are only checked by `double_check`.
    pub fn add_normal(&mut self, n: Vector3<f64>) {
        self.normals.push(n);
        self.vert_norms = true;
    }

    pub fn add_material(&mut self, m: Material) {
        self.materials.push(m);
    }

    /// Add the triangle `a, b, c`.
    ///
    /// Returns `false` if an index does not name an existing vertex. A
    /// degenerate triangle still counts as success but is not stored.
    pub fn add_face(&mut self, a: usize, b: usize, c: usize) -> bool {
        match self.try_add_face(a, b, c) {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "rejected face ({a}, {b}, {c})");
                false
            }
        }
    }

    /// Like [`add_face`](Self::add_face), but says what happened.
    ///
    /// `Ok(Some(id))` for a stored face, `Ok(None)` for a dropped degenerate one.
    pub fn try_add_face(&mut self, a: usize, b: usize, c: usize) -> MeshResult<Option<FaceId>> {
        let vertex_count = self.vertices.len();
        if let Some(&index) = [a, b, c].iter().find(|&&i| i >= vertex_count) {
            return Err(MeshError::FaceIndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let face = TrimeshFace::new(
            &self.vertices,
            [a, b, c],
            self.material.clone(),
            self.transform,
        );
        if face.is_degenerate() {
            debug!("dropping degenerate face ({a}, {b}, {c})");
            return Ok(None);
        }

        let id = FaceId(self.faces.len());
        self.faces.push(face);
        Ok(Some(id))
    }

    /// Check that per-vertex materials and normals, when present, match the
    /// vertex count. Returns the first problem found.
    pub fn double_check(&self) -> Option<MeshError> {
        let vertices = self.vertices.len();
        if !self.materials.is_empty() && self.materials.len() != vertices {
            return Some(MeshError::WrongMaterialCount {
                materials: self.materials.len(),
                vertices,
            });
        }
        if !self.normals.is_empty() && self.normals.len() != vertices {
            return Some(MeshError::WrongNormalCount {
                normals: self.normals.len(),
                vertices,
            });
        }
        None
    }

    /// [`double_check`](Self::double_check) as a `Result`
    pub fn validate(&self) -> MeshResult<()> {
        match self.double_check() {
            Some(err) => {
                warn!(%err, "trimesh failed validation");
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Replace per-vertex normals with the average of adjacent face normals.
    ///
    /// Averages are not renormalized; vertices used by no face get a zero
    /// normal. Afterwards the mesh interpolates vertex normals.
    pub fn generate_normals(&mut self) {
        let count = self.vertices.len();
        let mut sums = vec![Vector3::zeros(); count];
        let mut adjacent = vec![0u32; count];

        for face in &self.faces {
            let normal = face.normal();
            for id in face.ids() {
                sums[id] += normal;
                adjacent[id] += 1;
            }
        }

        for (sum, &n) in sums.iter_mut().zip(&adjacent) {
            if n > 0 {
                *sum /= f64::from(n);
            }
        }

        let isolated = adjacent.iter().filter(|&&n| n == 0).count();
        info!(
            vertices = count,
            faces = self.faces.len(),
            isolated,
            "generated vertex normals"
        );

        self.normals = sums;
        self.vert_norms = true;
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Whether intersections interpolate per-vertex normals
    pub fn has_vertex_normals(&self) -> bool {
        self.vert_norms
    }

    /// Base material copied into each new face
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, id: FaceId) -> Option<FaceRef<'_>> {
        self.faces.get(id.0).map(|face| FaceRef::new(self, face, id))
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceRef<'_>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(move |(i, face)| FaceRef::new(self, face, FaceId(i)))
    }

    /// Set the mesh transform and hand it to every face.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        for face in &mut self.faces {
            face.set_transform(transform);
        }
    }

    /// Axis-aligned cube centred on the origin, wound outward.
    pub fn cube(size: f64, material: Material) -> Self {
        let h = size / 2.0;
        let mut mesh = Self::with_capacity(8, 12, material, Transform::identity());

        for &(x, y, z) in &[
            (-h, -h, -h),
            (h, -h, -h),
            (h, h, -h),
            (-h, h, -h),
            (-h, -h, h),
            (h, -h, h),
            (h, h, h),
            (-h, h, h),
        ] {
            mesh.add_vertex(Point3::new(x, y, z));
        }

        const FACES: [[usize; 3]; 12] = [
            // Front (+z)
            [4, 5, 6],
            [4, 6, 7],
            // Back (-z)
            [0, 3, 2],
            [0, 2, 1],
            // Top (+y)
            [3, 7, 6],
            [3, 6, 2],
            // Bottom (-y)
            [0, 1, 5],
            [0, 5, 4],
            // Right (+x)
            [1, 2, 6],
            [1, 6, 5],
            // Left (-x)
            [0, 4, 7],
            [0, 7, 3],
        ];
        for [a, b, c] in FACES {
            mesh.add_face(a, b, c);
        }

        mesh
    }
}

impl SceneObject for Trimesh {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Closest hit over all faces, first face winning ties.
    ///
    /// On a miss `isect.t` is set to [`MISS_DISTANCE`].
    fn intersect_local(&self, ray: &Ray, isect: &mut Isect) -> bool {
        let mut best: Option<Isect> = None;
        for face in self.faces() {
            let mut cur = Isect::default();
            if face.intersect_local(ray, &mut cur)
                && best.as_ref().map_or(true, |hit| cur.t < hit.t)
            {
                best = Some(cur);
            }
        }

        match best {
            Some(hit) => {
                *isect = hit;
                true
            }
            None => {
                isect.t = MISS_DISTANCE;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> Trimesh {
        // Two triangles in z=0 sharing the edge 0-2
        let mut mesh = Trimesh::new(Material::default(), Transform::identity());
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        assert!(mesh.add_face(0, 1, 2));
        assert!(mesh.add_face(0, 2, 3));
        mesh
    }

    fn down(x: f64, y: f64, z: f64) -> Ray {
        Ray::new(Point3::new(x, y, z), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_add_face_out_of_range() {
        let mut mesh = quad();
        assert!(!mesh.add_face(0, 1, 4));
        assert!(!mesh.add_face(7, 1, 2));
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(
            mesh.try_add_face(0, 4, 1),
            Err(MeshError::FaceIndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_degenerate_face_dropped() {
        let mut mesh = quad();
        mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        // Collinear
        assert!(mesh.add_face(0, 1, 4));
        // Coincident
        assert!(mesh.add_face(1, 1, 2));
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.try_add_face(0, 1, 4), Ok(None));
        assert_eq!(mesh.try_add_face(1, 2, 3), Ok(Some(FaceId(2))));
    }

    #[test]
    fn test_double_check() {
        let mut mesh = quad();
        assert!(mesh.double_check().is_none());
        assert!(mesh.validate().is_ok());

        mesh.add_material(Material::default());
        assert_eq!(
            mesh.double_check(),
            Some(MeshError::WrongMaterialCount {
                materials: 1,
                vertices: 4
            })
        );
        for _ in 0..3 {
            mesh.add_material(Material::default());
        }
        assert!(mesh.double_check().is_none());

        mesh.add_normal(Vector3::z());
        let err = mesh.validate().unwrap_err();
        assert_eq!(
            err,
            MeshError::WrongNormalCount {
                normals: 1,
                vertices: 4
            }
        );
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_miss_sets_sentinel() {
        let mesh = quad();
        let mut isect = Isect::default();
        assert!(!mesh.intersect_local(&down(5.0, 5.0, 1.0), &mut isect));
        assert_eq!(isect.t, MISS_DISTANCE);
    }

    #[test]
    fn test_hit_reports_face() {
        let mesh = quad();
        let mut isect = Isect::default();
        assert!(mesh.intersect_local(&down(0.8, 0.2, 2.0), &mut isect));
        assert_eq!(isect.object, Some(FaceId(0)));
        assert!(mesh.intersect_local(&down(0.2, 0.8, 2.0), &mut isect));
        assert_eq!(isect.object, Some(FaceId(1)));
        assert_relative_eq!(isect.t, 2.0);
    }

    #[test]
    fn test_closest_hit_wins() {
        let mut mesh = Trimesh::new(Material::default(), Transform::identity());
        for z in [-2.0, 3.0, 1.0] {
            mesh.add_vertex(Point3::new(0.0, 0.0, z));
            mesh.add_vertex(Point3::new(1.0, 0.0, z));
            mesh.add_vertex(Point3::new(0.0, 1.0, z));
        }
        for base in [0, 3, 6] {
            assert!(mesh.add_face(base, base + 1, base + 2));
        }

        let mut isect = Isect::default();
        assert!(mesh.intersect_local(&down(0.2, 0.2, 5.0), &mut isect));
        assert_relative_eq!(isect.t, 2.0);
        assert_eq!(isect.object, Some(FaceId(1)));
    }

    #[test]
    fn test_first_face_wins_ties() {
        let mut mesh = Trimesh::new(Material::default(), Transform::identity());
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        assert!(mesh.add_face(0, 1, 2));
        assert!(mesh.add_face(0, 1, 2));

        let mut isect = Isect::default();
        assert!(mesh.intersect_local(&down(0.2, 0.2, 1.0), &mut isect));
        assert_eq!(isect.object, Some(FaceId(0)));
    }

    #[test]
    fn test_generate_normals_averages_faces() {
        // Two faces meeting at a right angle along the x axis
        let mut mesh = Trimesh::new(Material::default(), Transform::identity());
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        assert!(mesh.add_face(0, 1, 2)); // +z
        assert!(mesh.add_face(0, 3, 1)); // +y
        assert!(!mesh.has_vertex_normals());

        mesh.generate_normals();

        assert!(mesh.has_vertex_normals());
        assert_eq!(mesh.normals().len(), 5);
        let shared = Vector3::new(0.0, 0.5, 0.5);
        assert_relative_eq!(mesh.normals()[0], shared);
        assert_relative_eq!(mesh.normals()[1], shared);
        assert_relative_eq!(mesh.normals()[2], Vector3::z());
        assert_relative_eq!(mesh.normals()[3], Vector3::y());
        // Not renormalized
        assert!(mesh.normals()[0].norm() < 1.0);
        // Untouched vertex
        assert_eq!(mesh.normals()[4], Vector3::zeros());
        assert!(mesh.double_check().is_none());
    }

    #[test]
    fn test_generate_normals_replaces_existing() {
        let mut mesh = quad();
        for _ in 0..4 {
            mesh.add_normal(Vector3::new(1.0, 0.0, 0.0));
        }
        mesh.generate_normals();
        for n in mesh.normals() {
            assert_relative_eq!(*n, Vector3::z());
        }
    }

    #[test]
    fn test_transform_propagates_to_faces() {
        let mut mesh = quad();
        let shift = Transform::translation(0.0, 0.0, -4.0);
        mesh.set_transform(shift);
        assert!(mesh.faces().all(|f| *f.face().transform() == shift));

        // World-space query goes through the mesh transform
        let mut isect = Isect::default();
        assert!(mesh.intersect(&down(0.5, 0.25, 1.0), &mut isect));
        assert_relative_eq!(isect.t, 5.0);
        assert_relative_eq!(isect.n, Vector3::z());

        // Faces added afterwards pick up the current transform
        mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let id = mesh.try_add_face(1, 4, 2).unwrap().unwrap();
        assert_eq!(*mesh.face(id).unwrap().face().transform(), shift);
    }

    #[test]
    fn test_cube() {
        let cube = Trimesh::cube(2.0, Material::default());
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.face_count(), 12);

        // Every face normal points away from the centre
        for face in cube.faces() {
            let [a, b, c] = face.positions();
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(face.face().normal().dot(&centroid) > 0.0);
        }

        let mut isect = Isect::default();
        let ray = Ray::new(Point3::new(0.1, 0.2, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(cube.intersect(&ray, &mut isect));
        assert_relative_eq!(isect.t, 9.0);
        assert_relative_eq!(isect.n, Vector3::z());
    }
}
