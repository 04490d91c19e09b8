//! # Ray Casting and Picking
//!
//! Geometry primitives shared by the placement projector and the camera:
//! world-space rays, plane intersection, axis-aligned bounding boxes, and
//! closest-hit node picking against the host scene.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: the camera unprojects a screen pixel to a world ray
//! 2. **Ray/Plane**: the projector intersects the ray with the placement plane
//! 3. **Ray/AABB**: click selection tests the ray against node bounds and
//!    keeps the closest hit

use cgmath::{ElementWise, InnerSpace, Vector3};

use crate::gfx::scene::{NodeId, SceneDelegate};

/// Denominator threshold below which a ray counts as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// A 3D ray for intersection testing.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space.
    pub origin: Vector3<f32>,
    /// Ray direction (normalized).
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a new ray with a normalized direction.
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point along the ray at distance `t`.
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Intersects the ray with the plane through `plane_origin` with normal
    /// `plane_normal`.
    ///
    /// Returns the ray parameter `t`, or `None` when the ray is parallel to
    /// the plane (denominator below [`PARALLEL_EPSILON`]). Callers that need a
    /// point in all cases fall back to the plane origin.
    pub fn intersect_plane(
        &self,
        plane_origin: Vector3<f32>,
        plane_normal: Vector3<f32>,
    ) -> Option<f32> {
        let denom = self.direction.dot(plane_normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        Some((plane_origin - self.origin).dot(plane_normal) / denom)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box.
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Creates a new AABB.
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// A box is usable for framing/picking when it is finite, ordered, and
    /// has at least one non-zero dimension.
    pub fn is_valid(&self) -> bool {
        let finite = [self.min, self.max]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
        finite
            && self.max.x >= self.min.x
            && self.max.y >= self.min.y
            && self.max.z >= self.min.z
            && self.max_dimension() > 0.0
    }

    /// Center point of the box.
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Per-axis dimensions of the box.
    pub fn dimensions(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest of the three dimensions.
    pub fn max_dimension(&self) -> f32 {
        let d = self.dimensions();
        d.x.max(d.y).max(d.z)
    }

    /// Smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Tests ray/AABB intersection with the slab method.
    ///
    /// Returns the distance to the intersection point, or `None` if the ray
    /// misses. Zero direction components produce infinite slab bounds, which
    /// the min/max folding tolerates.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// Result of a node picking operation.
#[derive(Debug, Clone, Copy)]
pub struct PickResult {
    /// Handle of the picked node.
    pub node: NodeId,
    /// Distance from the ray origin to the intersection point.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vector3<f32>,
}

/// Casts a ray through the scene and returns the closest node hit.
///
/// Only nodes for which the host reports bounds participate; everything else
/// is skipped.
pub fn pick_node(ray: &Ray, scene: &dyn SceneDelegate) -> Option<PickResult> {
    let mut closest: Option<PickResult> = None;

    for node in scene.node_ids() {
        let Some(bounds) = scene.node_bounds(node) else {
            continue;
        };
        if let Some(distance) = bounds.intersect_ray(ray) {
            if closest.map_or(true, |hit| distance < hit.distance) {
                closest = Some(PickResult {
                    node,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
    }

    closest
}

/// Merged world-space bounds of every node the host reports bounds for, or
/// `None` when no node has bounds.
pub fn scene_bounds(scene: &dyn SceneDelegate) -> Option<Aabb> {
    let mut merged: Option<Aabb> = None;
    for node in scene.node_ids() {
        if let Some(bounds) = scene.node_bounds(node) {
            merged = Some(match merged {
                Some(current) => current.union(&bounds),
                None => bounds,
            });
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::testing::TestScene;

    #[test]
    fn ray_plane_intersection_hits_origin() {
        let ray = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let t = ray
            .intersect_plane(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            .unwrap();
        assert_eq!(ray.point_at(t), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn parallel_ray_reports_no_intersection() {
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray
            .intersect_plane(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            .is_none());
    }

    #[test]
    fn aabb_validity() {
        let unit = Aabb::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5));
        assert!(unit.is_valid());
        assert_eq!(unit.max_dimension(), 1.0);

        let inverted = Aabb::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(-1.0, 1.0, 1.0));
        assert!(!inverted.is_valid());

        let empty = Aabb::new(Vector3::new(2.0, 2.0, 2.0), Vector3::new(2.0, 2.0, 2.0));
        assert!(!empty.is_valid());
    }

    #[test]
    fn ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&hit).is_some());

        let miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&miss).is_none());
    }

    #[test]
    fn scene_bounds_merges_node_boxes() {
        let mut scene = TestScene::new();
        assert!(scene_bounds(&scene).is_none());

        scene.insert_with_bounds(1, Vector3::new(-2.0, 0.0, 0.0), 1.0);
        scene.insert_with_bounds(2, Vector3::new(3.0, 1.0, 0.0), 0.5);
        scene.insert(3, Vector3::new(100.0, 100.0, 100.0)); // no bounds

        let merged = scene_bounds(&scene).unwrap();
        assert_eq!(merged.min, Vector3::new(-3.0, -1.0, -1.0));
        assert_eq!(merged.max, Vector3::new(3.5, 1.5, 1.0));
    }

    #[test]
    fn pick_node_returns_closest_hit() {
        let mut scene = TestScene::new();
        let near = scene.insert_with_bounds(1, Vector3::new(0.0, 0.0, 2.0), 0.5);
        let _far = scene.insert_with_bounds(2, Vector3::new(0.0, 0.0, 8.0), 0.5);
        scene.insert(3, Vector3::new(0.0, 0.0, 5.0)); // no bounds, never picked

        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let result = pick_node(&ray, &scene).unwrap();
        assert_eq!(result.node, near);
        assert!((result.distance - 1.5).abs() < 1e-5);
    }
}
