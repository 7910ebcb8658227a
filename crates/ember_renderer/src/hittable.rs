//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::Material;
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Borrows the material from the object that was hit, so a record cannot
/// outlive the scene.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    pub material: &'a dyn Material,
    /// Surface coordinates
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t`, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// `outward_normal` is assumed to have unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// A flat list of hittable objects, tested one by one.
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.bbox = Aabb::from_aabbs(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Hand the objects over, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Fire seeded random rays at `object` and check every reported hit.
///
/// Half the rays aim at a point picked by `target`, the rest go in random
/// directions. Returns the number of hits.
#[cfg(test)]
pub(crate) fn check_random_hits(
    object: &dyn Hittable,
    target: impl Fn(&mut dyn rand::RngCore) -> Point3,
    outward_normal: impl Fn(&HitRecord<'_>) -> Vec3,
    seed: u64,
) -> usize {
    use crate::sampling::{gen_range_f32, random_unit_vector, random_vec3};
    use rand::{rngs::StdRng, SeedableRng};

    let mut seeded = StdRng::seed_from_u64(seed);
    let rng: &mut dyn rand::RngCore = &mut seeded;
    let mut hits = 0;

    for i in 0..2000 {
        let origin = random_vec3(rng, -3.0, 3.0);
        let direction = if i % 2 == 0 {
            target(&mut *rng) - origin
        } else {
            random_unit_vector(rng) * gen_range_f32(rng, 0.5, 3.0)
        };
        if direction.length_squared() < 1e-6 {
            continue;
        }

        let min = gen_range_f32(rng, 0.001, 0.5);
        let ray_t = Interval::new(min, min + gen_range_f32(rng, 1.0, 6.0));
        let ray = Ray::new_simple(origin, direction);

        if let Some(rec) = object.hit(&ray, ray_t) {
            hits += 1;
            assert!(ray_t.contains(rec.t), "t={} outside {:?}", rec.t, ray_t);

            let outward = outward_normal(&rec);
            assert_eq!(rec.front_face, direction.dot(outward) < 0.0);
            assert!(rec.normal.dot(direction) <= 0.0);
        }
    }

    hits
}
