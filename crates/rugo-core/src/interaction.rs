//! Pointer input seam
//!
//! The core never polls a mouse or a VR controller directly. Whatever drives
//! it supplies a [`PointerProvider`] each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray cast straight down onto `target` from above
    pub fn down_at(target: Vec3) -> Self {
        Self {
            origin: target + Vec3::Y * 10.0,
            direction: -Vec3::Y,
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Source of pointer state for one tick
pub trait PointerProvider {
    /// Selector ray for this tick
    fn current_ray(&self) -> Ray;

    /// The confirm button went down this tick
    fn pressed(&self) -> bool;

    /// The confirm button is down
    fn held(&self) -> bool;

    /// The confirm button went up this tick
    fn released(&self) -> bool;

    /// Surface hit for `ray`, if any
    fn raycast_hit(&self, ray: &Ray) -> Option<Vec3>;
}

/// One recorded tick of pointer state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerFrame {
    #[serde(default)]
    pub pressed: bool,
    #[serde(default)]
    pub held: bool,
    #[serde(default)]
    pub released: bool,
    pub ray: Ray,
}

impl PointerFrame {
    /// Button goes down (and counts as held) this tick
    pub fn press(ray: Ray) -> Self {
        Self {
            pressed: true,
            held: true,
            released: false,
            ray,
        }
    }

    pub fn hold(ray: Ray) -> Self {
        Self {
            pressed: false,
            held: true,
            released: false,
            ray,
        }
    }

    pub fn release(ray: Ray) -> Self {
        Self {
            pressed: false,
            held: false,
            released: true,
            ray,
        }
    }

    /// No button activity
    pub fn hover(ray: Ray) -> Self {
        Self {
            pressed: false,
            held: false,
            released: false,
            ray,
        }
    }
}

/// Horizontal tabletop surface used for raycasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TablePlane {
    /// Height (Y) of the table top
    pub height: f32,
    /// Half size of the square top around the origin, unbounded if `None`
    #[serde(default)]
    pub half_extent: Option<f32>,
}

impl Default for TablePlane {
    fn default() -> Self {
        Self {
            height: 0.0,
            half_extent: None,
        }
    }
}

impl TablePlane {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            half_extent: None,
        }
    }

    /// Limit hits to a square of the given half size
    pub fn with_half_extent(mut self, half_extent: f32) -> Self {
        self.half_extent = Some(half_extent);
        self
    }

    /// Intersect a ray with the table top.
    ///
    /// Returns `None` when the ray is parallel, points away, or lands off the
    /// table.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.y;

        if denom.abs() < 1e-6 {
            return None;
        }

        let t = (self.height - ray.origin.y) / denom;
        if t <= 0.0 {
            return None;
        }

        let mut hit = ray.at(t);
        hit.y = self.height;

        match self.half_extent {
            Some(half) if hit.x.abs() > half || hit.z.abs() > half => None,
            _ => Some(hit),
        }
    }
}

/// A recorded frame replayed against a table plane
#[derive(Debug, Clone, Copy)]
pub struct PlanePointer {
    pub frame: PointerFrame,
    pub plane: TablePlane,
}

impl PlanePointer {
    pub fn new(frame: PointerFrame, plane: TablePlane) -> Self {
        Self { frame, plane }
    }
}

impl PointerProvider for PlanePointer {
    fn current_ray(&self) -> Ray {
        self.frame.ray
    }

    fn pressed(&self) -> bool {
        self.frame.pressed
    }

    fn held(&self) -> bool {
        self.frame.held
    }

    fn released(&self) -> bool {
        self.frame.released
    }

    fn raycast_hit(&self, ray: &Ray) -> Option<Vec3> {
        self.plane.intersect(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_down_ray_hits_target() {
        let plane = TablePlane::new(0.5);
        let hit = plane.intersect(&Ray::down_at(Vec3::new(0.2, 0.5, -0.3)));
        assert_eq!(hit, Some(Vec3::new(0.2, 0.5, -0.3)));
    }

    #[test]
    fn test_oblique_ray() {
        let plane = TablePlane::new(0.0);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = plane.intersect(&ray).unwrap();
        assert_relative_eq!(hit, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_parallel_and_backward_rays_miss() {
        let plane = TablePlane::new(0.0);
        assert!(plane.intersect(&Ray::new(Vec3::Y, Vec3::X)).is_none());
        assert!(plane.intersect(&Ray::new(Vec3::Y, Vec3::Y)).is_none());
    }

    #[test]
    fn test_bounded_table() {
        let plane = TablePlane::new(0.0).with_half_extent(1.0);
        assert!(plane.intersect(&Ray::down_at(Vec3::new(0.9, 0.0, 0.0))).is_some());
        assert!(plane.intersect(&Ray::down_at(Vec3::new(1.1, 0.0, 0.0))).is_none());
    }

    #[test]
    fn test_plane_pointer_forwards_frame() {
        let ray = Ray::down_at(Vec3::ZERO);
        let pointer = PlanePointer::new(PointerFrame::press(ray), TablePlane::default());
        assert!(pointer.pressed());
        assert!(pointer.held());
        assert!(!pointer.released());
        assert_eq!(pointer.raycast_hit(&pointer.current_ray()), Some(Vec3::ZERO));
    }
}
