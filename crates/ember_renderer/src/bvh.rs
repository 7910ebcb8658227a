//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes built by median split: each range of
//! objects is sorted along the longest axis of its bounds and cut in half.
//! Leaves hold one or two primitives directly as the node's children.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};

/// A BVH node with exactly two children.
///
/// A range holding a single object stores that object as both children.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
    /// Height of the subtree rooted here; a leaf node has depth 1.
    depth: usize,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// # Panics
    ///
    /// Panics if `objects` is empty. Scene builders must not ask for a
    /// hierarchy over nothing.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        assert!(
            !objects.is_empty(),
            "BvhNode::new requires at least one object"
        );

        let node = Self::build(&mut objects);
        log::debug!(
            "Built BVH over {} objects (depth {})",
            objects.len(),
            node.depth
        );
        node
    }

    /// Recursive construction over a non-empty slice, sorted in place.
    fn build(objects: &mut [Arc<dyn Hittable>]) -> Self {
        let bbox = objects
            .iter()
            .skip(1)
            .fold(objects[0].bounding_box(), |acc, obj| {
                Aabb::from_aabbs(&acc, &obj.bounding_box())
            });

        let axis = bbox.longest_axis();

        match objects.len() {
            1 => Self {
                left: objects[0].clone(),
                right: objects[0].clone(),
                bbox,
                depth: 1,
            },
            2 => Self {
                left: objects[0].clone(),
                right: objects[1].clone(),
                bbox,
                depth: 1,
            },
            n => {
                // Stable sort keeps input order for equal keys
                objects.sort_by(|a, b| box_compare(a.as_ref(), b.as_ref(), axis));

                let (left_objects, right_objects) = objects.split_at_mut(n / 2);
                let left = Self::build(left_objects);
                let right = Self::build(right_objects);
                let depth = 1 + left.depth.max(right.depth);

                Self {
                    left: Arc::new(left),
                    right: Arc::new(right),
                    bbox,
                    depth,
                }
            }
        }
    }

    /// Height of the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Order two objects by the lower bound of their boxes along `axis`.
fn box_compare(a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    a_min.total_cmp(&b_min)
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.right.hit(ray, Interval::new(ray_t.min, right_max));

        hit_right.or(hit_left)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
