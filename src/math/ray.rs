//! Ray type and operations

use crate::core::types::Vec3;
use super::aabb::Aabb;

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Precomputed 1/direction for fast AABB intersection
    pub inv_direction: Vec3,
}

/// Entry point of a ray into a box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxHit {
    /// Distance along the ray
    pub t: f32,
    /// Outward normal of the face the ray entered through.
    /// `None` when the ray starts inside the box.
    pub normal: Option<Vec3>,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: Vec3::new(
                1.0 / direction.x,
                1.0 / direction.y,
                1.0 / direction.z,
            ),
        }
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test that also reports which face was entered.
    /// A ray parallel to a slab is inside it when its origin lies within
    /// the slab bounds, faces included.
    pub fn hit_aabb(&self, aabb: &Aabb) -> Option<BoxHit> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        // Axis whose slab is entered last determines the face
        let mut axis = 0;

        for i in 0..3 {
            let origin = self.origin[i];
            if self.direction[i] == 0.0 {
                if origin < aabb.min[i] || origin > aabb.max[i] {
                    return None;
                }
                continue;
            }
            let t1 = (aabb.min[i] - origin) * self.inv_direction[i];
            let t2 = (aabb.max[i] - origin) * self.inv_direction[i];
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            if lo > t_near {
                t_near = lo;
                axis = i;
            }
            t_far = t_far.min(hi);
        }

        if t_near > t_far || t_far < 0.0 {
            return None;
        }

        if t_near < 0.0 {
            return Some(BoxHit { t: 0.0, normal: None });
        }

        let mut normal = Vec3::ZERO;
        normal[axis] = -self.direction[axis].signum();
        Some(BoxHit { t: t_near, normal: Some(normal) })
    }

    /// Intersection with the horizontal plane `y = height`, limited to a
    /// square of `half_extent` around the world origin. Both sides count.
    pub fn hit_ground(&self, height: f32, half_extent: f32) -> Option<Vec3> {
        if self.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }
        let point = self.at(t);
        if point.x.abs() > half_extent || point.z.abs() > half_extent {
            return None;
        }
        Some(point)
    }
}
