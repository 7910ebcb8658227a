//! Triangle meshes as a single hittable.

use std::sync::Arc;

use ember_core::Mesh;
use ember_math::{Aabb, Interval, Ray, Vec3};

use crate::bvh::BvhNode;
use crate::hittable::{HitRecord, Hittable};
use crate::triangle::Triangle;
use crate::Material;

/// A collection of triangles sharing one material.
///
/// With an internal BVH, hits are delegated to it; otherwise every triangle
/// is tested in turn.
pub struct TriangleMesh {
    triangles: Vec<Arc<dyn Hittable>>,
    bvh: Option<BvhNode>,
    bbox: Aabb,
}

impl TriangleMesh {
    /// Build triangles from `mesh`, scaling about the origin then offsetting.
    pub fn new(
        mesh: &Mesh,
        material: Arc<dyn Material>,
        scale: f32,
        offset: Vec3,
        use_bvh: bool,
    ) -> Self {
        let transform = |p: Vec3| p * scale + offset;
        let triangles = mesh
            .triangles()
            .map(|[v0, v1, v2]| {
                Arc::new(Triangle::new(
                    transform(v0),
                    transform(v1),
                    transform(v2),
                    material.clone(),
                )) as Arc<dyn Hittable>
            })
            .collect();

        Self::from_triangles(triangles, use_bvh)
    }

    /// Wrap already built primitives.
    pub fn from_triangles(triangles: Vec<Arc<dyn Hittable>>, use_bvh: bool) -> Self {
        let bbox = triangles.iter().fold(Aabb::EMPTY, |acc, tri| {
            Aabb::from_aabbs(&acc, &tri.bounding_box())
        });

        let bvh = (use_bvh && !triangles.is_empty()).then(|| BvhNode::new(triangles.clone()));

        log::debug!(
            "Mesh with {} triangles ({})",
            triangles.len(),
            if bvh.is_some() { "bvh" } else { "linear" }
        );

        Self {
            triangles,
            bvh,
            bbox,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn has_bvh(&self) -> bool {
        self.bvh.is_some()
    }
}

impl Hittable for TriangleMesh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if let Some(bvh) = &self.bvh {
            return bvh.hit(ray, ray_t);
        }

        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let mut closest: Option<HitRecord<'_>> = None;
        for tri in &self.triangles {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = tri.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(rec);
            }
        }
        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
