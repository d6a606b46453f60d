//! Wall classification and contact bookkeeping.

use std::time::Duration;

use bevy::log::trace;
use bevy::prelude::{Entity, Reflect, Vec3};
use serde::{Deserialize, Serialize};

use crate::timer::OneShot;

/// Lowest normal-Y still counted as a wall (slight overhangs).
pub const WALL_NORMAL_MIN_Y: f32 = -0.01;
/// Highest normal-Y still counted as a wall (steep slopes).
pub const WALL_NORMAL_MAX_Y: f32 = 0.5;

/// Opaque handle of a contacted surface.
#[derive(Reflect, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl From<Entity> for SurfaceId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// A single physical contact reported by the body.
#[derive(Reflect, Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub surface: SurfaceId,
    /// Outward surface normal, unit length.
    pub normal: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    Wall,
    Other,
}

/// Walls are near-vertical: floors and steep ceilings are excluded.
pub fn classify(normal: Vec3) -> SurfaceKind {
    if (WALL_NORMAL_MIN_Y..=WALL_NORMAL_MAX_Y).contains(&normal.y) {
        SurfaceKind::Wall
    } else {
        SurfaceKind::Other
    }
}

/// Owns the debounce that ends a wall run once contact with the tracked wall lapses.
#[derive(Reflect, Clone, Debug, Default)]
pub struct WallDetector {
    debounce: OneShot,
}

impl WallDetector {
    /// Feed one contact. Returns the hit when it should start (or refresh) a wall run.
    ///
    /// Touching `tracked` re-arms the debounce for another `grace` seconds.
    pub fn on_surface_contact(
        &mut self,
        hit: &SurfaceHit,
        tracked: Option<SurfaceId>,
        grace: f32,
    ) -> Option<SurfaceHit> {
        if tracked == Some(hit.surface) {
            self.debounce.arm(grace);
        }

        match classify(hit.normal) {
            SurfaceKind::Wall => {
                trace!("Surface {:?} is a wall (normal {:?})", hit.surface, hit.normal);
                Some(*hit)
            }
            SurfaceKind::Other => None,
        }
    }

    /// Arm the debounce for a session that has just begun.
    pub fn arm(&mut self, grace: f32) {
        self.debounce.arm(grace);
    }

    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// True on the tick contact with the tracked wall has lapsed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.debounce.tick(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(surface: u64, normal: Vec3) -> SurfaceHit {
        SurfaceHit {
            surface: SurfaceId(surface),
            normal,
        }
    }

    #[test]
    fn test_classify_band_is_inclusive() {
        for y in [-0.01_f32, 0.0, 0.25, 0.5] {
            let normal = Vec3::new((1.0 - y * y).sqrt(), y, 0.0);
            assert_eq!(classify(normal), SurfaceKind::Wall, "normal.y = {y}");
        }
    }

    #[test]
    fn test_classify_outside_band_is_other() {
        for y in [-1.0_f32, -0.5, -0.0101, 0.5001, 0.7, 1.0] {
            let normal = Vec3::new((1.0 - y * y).max(0.0).sqrt(), y, 0.0);
            assert_eq!(classify(normal), SurfaceKind::Other, "normal.y = {y}");
        }
    }

    #[test]
    fn test_floor_is_not_a_wall() {
        assert_eq!(classify(Vec3::Y), SurfaceKind::Other);
        assert_eq!(classify(Vec3::X), SurfaceKind::Wall);
    }

    #[test]
    fn test_contact_with_wall_requests_wall_run() {
        let mut detector = WallDetector::default();
        let request = detector.on_surface_contact(&hit(1, Vec3::X), None, 0.1);
        assert_eq!(request, Some(hit(1, Vec3::X)));
        assert!(!detector.is_pending(), "untracked surface does not arm debounce");
    }

    #[test]
    fn test_contact_with_tracked_surface_rearms_debounce() {
        let mut detector = WallDetector::default();
        detector.on_surface_contact(&hit(7, Vec3::X), Some(SurfaceId(7)), 0.1);
        assert!(detector.is_pending());

        assert!(!detector.tick(Duration::from_secs_f32(0.08)));
        detector.on_surface_contact(&hit(7, Vec3::X), Some(SurfaceId(7)), 0.1);
        assert!(!detector.tick(Duration::from_secs_f32(0.08)));
        assert!(detector.tick(Duration::from_secs_f32(0.05)));
    }

    #[test]
    fn test_floor_contact_requests_nothing() {
        let mut detector = WallDetector::default();
        assert_eq!(detector.on_surface_contact(&hit(2, Vec3::Y), None, 0.1), None);
    }
}
