//! Wall bounces and object-object overlap
//!
//! Objects are treated as circles of their draw size. Walls are the canvas
//! edges with y growing downward, so the bottom edge is the floor.

use glam::Vec2;

use super::object::PhysicsObject;
use crate::consts::{COLLISION_SPIN, SPIN_FROM_VX};
use crate::settings::PhysicsTuning;

/// Which canvas edges an object touched this step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub side: bool,
    pub ceiling: bool,
    pub floor: bool,
}

impl WallContact {
    pub fn any(&self) -> bool {
        self.side || self.ceiling || self.floor
    }
}

/// Keep an object inside the canvas, bouncing off whatever edge it crossed
pub fn resolve_walls(obj: &mut PhysicsObject, bounds: Vec2, tuning: &PhysicsTuning) -> WallContact {
    let half = obj.radius();
    let mut contact = WallContact::default();

    if obj.pos.x - half < 0.0 {
        obj.pos.x = half;
        contact.side = true;
    } else if obj.pos.x + half > bounds.x {
        obj.pos.x = bounds.x - half;
        contact.side = true;
    }
    if contact.side {
        obj.vel.x *= -tuning.bounce;
        obj.rotation_speed = obj.vel.x * SPIN_FROM_VX;
    }

    if obj.pos.y - half < 0.0 {
        obj.pos.y = half;
        contact.ceiling = true;
    } else if obj.pos.y + half > bounds.y {
        obj.pos.y = bounds.y - half;
        contact.floor = true;
    }
    if contact.ceiling || contact.floor {
        obj.vel.y *= -tuning.bounce;
        obj.rotation_speed = obj.vel.x * SPIN_FROM_VX;
    }
    if contact.floor {
        obj.vel.x *= tuning.floor_friction;
    }

    contact
}

/// Result of a circle-circle overlap test
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit vector from the first circle toward the second
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Overlap between two objects. Coincident centers separate along +x.
pub fn object_overlap(a: &PhysicsObject, b: &PhysicsObject) -> CollisionResult {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = (a.size() + b.size()) / 2.0;

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: if dist > 0.0 { delta / dist } else { Vec2::X },
        penetration: min_dist - dist,
    }
}

/// Push two overlapping objects apart, half the overlap each.
/// `first_contact` also applies the velocity nudge and spin, which should
/// happen once per pair per step rather than on every relaxation pass.
pub fn separate(a: &mut PhysicsObject, b: &mut PhysicsObject, first_contact: bool) -> bool {
    let hit = object_overlap(a, b);
    if !hit.hit {
        return false;
    }

    let push = hit.normal * (hit.penetration * 0.5);
    a.pos -= push;
    b.pos += push;

    if first_contact {
        a.vel -= push;
        b.vel += push;
        a.rotation_speed += COLLISION_SPIN;
        b.rotation_speed -= COLLISION_SPIN;
    }
    true
}
