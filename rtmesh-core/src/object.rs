/// Intersection interface shared by meshes and faces
use crate::ray::{Isect, Ray};
use crate::transform::Transform;

/// Anything a ray can be tested against.
pub trait SceneObject {
    /// Object-to-world transform.
    fn transform(&self) -> &Transform;

    /// Intersect a ray already expressed in object space.
    ///
    /// Returns `true` on a hit and fills `isect`; what a miss leaves in
    /// `isect` is up to the implementor.
    fn intersect_local(&self, ray: &Ray, isect: &mut Isect) -> bool;

    /// Intersect a world-space ray: map it into object space, test it, and
    /// bring the normal back out.
    fn intersect(&self, ray: &Ray, isect: &mut Isect) -> bool {
        let transform = self.transform();
        let local = transform.ray_to_local(ray);
        if !self.intersect_local(&local, isect) {
            return false;
        }
        isect.n = transform.normal_to_world(&isect.n);
        true
    }
}
