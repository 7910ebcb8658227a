//! Planar parallelogram primitive.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};

/// A parallelogram spanned by corner `q` and edges `u` and `v`.
pub struct Quad {
    q: Point3,
    u: Vec3,
    v: Vec3,
    /// `n / dot(n, n)`, used to project hit points onto the edges
    w: Vec3,
    /// Unit plane normal
    normal: Vec3,
    /// Plane offset: `dot(normal, q)`
    d: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Point3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let w = n / n.dot(n);

        // Both diagonals, so the box covers every corner
        let bbox_diagonal1 = Aabb::from_points(q, q + u + v);
        let bbox_diagonal2 = Aabb::from_points(q + u, q + v);
        let bbox = Aabb::from_aabbs(&bbox_diagonal1, &bbox_diagonal2);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            material,
            bbox,
        }
    }

    /// Planar coordinates of a hit, or `None` if outside the unit square.
    fn interior(alpha: f32, beta: f32) -> Option<(f32, f32)> {
        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }
        Some((alpha, beta))
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let planar_hitpt = ray.at(t) - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));
        let uv = Self::interior(alpha, beta)?;

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            self.material.as_ref(),
            uv,
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// The six faces of the axis-aligned box spanned by two opposite corners.
pub fn make_box(a: Point3, b: Point3, material: Arc<dyn Material>) -> Vec<Arc<dyn Hittable>> {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    let face = |q: Point3, u: Vec3, v: Vec3| -> Arc<dyn Hittable> {
        Arc::new(Quad::new(q, u, v, material.clone()))
    };

    vec![
        face(Vec3::new(min.x, min.y, max.z), dx, dy),  // front
        face(Vec3::new(max.x, min.y, max.z), -dz, dy), // right
        face(Vec3::new(max.x, min.y, min.z), -dx, dy), // back
        face(Vec3::new(min.x, min.y, min.z), dz, dy),  // left
        face(Vec3::new(min.x, max.y, max.z), dx, -dz), // top
        face(Vec3::new(min.x, min.y, min.z), dx, dz),  // bottom
    ]
}
