//! Floating objects and their draw snapshot

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::landmarks::HandLabel;
use crate::settings::PhysicsTuning;

/// A free-floating, grabbable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsObject {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per 60 Hz frame
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Diameter in pixels, fixed at creation
    size: f32,
    /// Hand currently holding this object
    pub grabbed_by: Option<HandLabel>,
}

impl PhysicsObject {
    pub fn new(id: u32, pos: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size,
            grabbed_by: None,
        }
    }

    /// Random placement in the upper band of the canvas
    pub fn spawn<R: Rng>(id: u32, bounds: Vec2, tuning: &PhysicsTuning, rng: &mut R) -> Self {
        let x_span = (bounds.x - 100.0).max(0.0);
        let size = if tuning.max_size > tuning.min_size {
            rng.random_range(tuning.min_size..tuning.max_size)
        } else {
            tuning.min_size
        };
        Self {
            id,
            pos: Vec2::new(
                rng.random::<f32>() * x_span + 50.0,
                rng.random::<f32>() * 300.0 + 50.0,
            ),
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 4.0,
                (rng.random::<f32>() - 0.5) * 4.0,
            ),
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            rotation_speed: (rng.random::<f32>() - 0.5) * 0.1,
            size,
            grabbed_by: None,
        }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    #[inline]
    pub fn grabbed(&self) -> bool {
        self.grabbed_by.is_some()
    }

    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.id,
            x: self.pos.x,
            y: self.pos.y,
            rotation: self.rotation,
            size: self.size,
            grabbed: self.grabbed(),
        }
    }
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub size: f32,
    pub grabbed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_ranges() {
        let tuning = PhysicsTuning::default();
        let bounds = Vec2::new(800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(42);
        for id in 0..100 {
            let obj = PhysicsObject::spawn(id, bounds, &tuning, &mut rng);
            assert!((50.0..=750.0).contains(&obj.pos.x));
            assert!((50.0..=350.0).contains(&obj.pos.y));
            assert!(obj.vel.x.abs() <= 2.0 && obj.vel.y.abs() <= 2.0);
            assert!((40.0..60.0).contains(&obj.size()));
            assert!(!obj.grabbed());
        }
    }

    #[test]
    fn test_snapshot_reflects_grab() {
        let mut obj = PhysicsObject::new(3, Vec2::new(10.0, 20.0), 50.0);
        obj.grabbed_by = Some(HandLabel::Left);
        let snap = obj.snapshot();
        assert_eq!((snap.id, snap.x, snap.y, snap.size), (3, 10.0, 20.0, 50.0));
        assert!(snap.grabbed);
    }
}
