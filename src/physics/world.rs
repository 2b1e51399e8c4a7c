//! Physics world tick
//!
//! Hands grab objects by proximity, drag them, and throw them on release.
//! Free objects fall, drift, bounce off the canvas edges, get pushed by
//! nearby palms and shove each other apart.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{resolve_walls, separate};
use super::object::{ObjectSnapshot, PhysicsObject};
use crate::consts::{FRAME_RATE, MAX_STEP_SCALE};
use crate::landmarks::HandLabel;
use crate::settings::PhysicsTuning;

/// Relaxation passes over all pairs per step
const COLLISION_PASSES: usize = 4;

/// Seconds to 60 Hz frame multiples, clamped so a stalled tab can't explode
/// the simulation
#[inline]
pub fn step_scale(dt: f32) -> f32 {
    (dt * FRAME_RATE).clamp(0.0, MAX_STEP_SCALE)
}

#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    tuning: PhysicsTuning,
    bounds: Vec2,
    objects: Vec<PhysicsObject>,
    /// Palm positions from the previous tick, for throw velocity
    prev_left: Option<Vec2>,
    prev_right: Option<Vec2>,
}

impl PhysicsWorld {
    /// World with explicit objects (sorted by id for stable iteration)
    pub fn new(bounds: Vec2, tuning: PhysicsTuning, mut objects: Vec<PhysicsObject>) -> Self {
        objects.sort_by_key(|o| o.id);
        Self {
            tuning,
            bounds,
            objects,
            prev_left: None,
            prev_right: None,
        }
    }

    /// Scatter `tuning.object_count` objects using a seeded layout
    pub fn seeded(seed: u64, bounds: Vec2, tuning: PhysicsTuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let objects = (0..tuning.object_count as u32)
            .map(|id| PhysicsObject::spawn(id, bounds, &tuning, &mut rng))
            .collect();
        log::info!(
            "Physics world seeded with {} objects ({}x{})",
            tuning.object_count,
            bounds.x,
            bounds.y
        );
        Self::new(bounds, tuning, objects)
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn objects(&self) -> &[PhysicsObject] {
        &self.objects
    }

    pub fn object(&self, id: u32) -> Option<&PhysicsObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// New canvas size. Objects are pulled back inside; the count stays.
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        for obj in &mut self.objects {
            let half = obj.radius();
            let max = (bounds - Vec2::splat(half)).max(Vec2::splat(half));
            obj.pos = obj.pos.clamp(Vec2::splat(half), max);
        }
        log::debug!("Physics bounds resized to {}x{}", bounds.x, bounds.y);
    }

    /// Forget previous palm positions (next grab starts with no throw)
    pub fn clear_hands(&mut self) {
        self.prev_left = None;
        self.prev_right = None;
    }

    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        self.objects.iter().map(PhysicsObject::snapshot).collect()
    }

    /// Advance by `dt` seconds. Palms are in canvas pixels.
    pub fn tick(
        &mut self,
        dt: f32,
        bounds: Vec2,
        left_palm: Option<Vec2>,
        right_palm: Option<Vec2>,
    ) -> Vec<ObjectSnapshot> {
        self.step(dt, bounds, left_palm, right_palm, true)
    }

    /// Like `tick`, but with `fresh == false` the palms are a repeat of the
    /// previous step's: held objects follow them without recomputing their
    /// throw velocity, and the throw baseline stays put.
    pub fn step(
        &mut self,
        dt: f32,
        bounds: Vec2,
        left_palm: Option<Vec2>,
        right_palm: Option<Vec2>,
        fresh: bool,
    ) -> Vec<ObjectSnapshot> {
        if bounds != self.bounds {
            self.resize(bounds);
        }
        let k = step_scale(dt);
        let hands = [(HandLabel::Left, left_palm), (HandLabel::Right, right_palm)];

        for obj in &mut self.objects {
            match Self::grab_owner(obj, &hands) {
                Some((hand, palm)) => {
                    if obj.grabbed_by != Some(hand) {
                        log::debug!("Object {} grabbed by {} hand", obj.id, hand.as_str());
                    }
                    obj.grabbed_by = Some(hand);
                    obj.pos = palm;
                    let prev = match hand {
                        HandLabel::Left => self.prev_left,
                        HandLabel::Right => self.prev_right,
                    };
                    if let Some(prev) = prev {
                        if fresh && k > 0.0 {
                            obj.vel = (palm - prev) * self.tuning.throw_multiplier / k;
                        }
                    }
                }
                None => {
                    if let Some(hand) = obj.grabbed_by.take() {
                        log::debug!(
                            "Object {} released by {} hand at ({:.1}, {:.1})",
                            obj.id,
                            hand.as_str(),
                            obj.vel.x,
                            obj.vel.y
                        );
                    }
                    Self::integrate(obj, &self.tuning, self.bounds, &hands, k);
                }
            }
        }

        self.resolve_pairs();

        if fresh {
            self.prev_left = left_palm;
            self.prev_right = right_palm;
        }

        self.snapshot()
    }

    /// Closest qualifying hand; right wins an exact tie
    fn grab_owner(
        obj: &PhysicsObject,
        hands: &[(HandLabel, Option<Vec2>); 2],
    ) -> Option<(HandLabel, Vec2)> {
        let mut best: Option<(HandLabel, Vec2, f32)> = None;
        for &(hand, palm) in hands {
            let Some(palm) = palm else { continue };
            let dist = palm.distance(obj.pos);
            if dist >= obj.size() {
                continue;
            }
            if best.is_none_or(|(_, _, d)| dist <= d) {
                best = Some((hand, palm, dist));
            }
        }
        best.map(|(hand, palm, _)| (hand, palm))
    }

    fn integrate(
        obj: &mut PhysicsObject,
        tuning: &PhysicsTuning,
        bounds: Vec2,
        hands: &[(HandLabel, Option<Vec2>); 2],
        k: f32,
    ) {
        let radius = tuning.hand_influence_radius;
        for palm in hands.iter().filter_map(|(_, p)| *p) {
            let away = obj.pos - palm;
            let dist = away.length();
            if dist > 0.0 && dist < radius {
                let force = (radius - dist) / radius;
                obj.vel += away / dist * force * tuning.hand_push * k;
            }
        }

        obj.vel.y += tuning.gravity * k;
        obj.vel *= tuning.friction.powf(k);

        obj.pos += obj.vel * k;
        obj.rotation += obj.rotation_speed * k;
        obj.rotation_speed *= tuning.spin_decay.powf(k);

        resolve_walls(obj, bounds, tuning);
    }

    fn resolve_pairs(&mut self) {
        let n = self.objects.len();
        for pass in 0..COLLISION_PASSES {
            let mut any = false;
            for i in 0..n {
                for j in (i + 1)..n {
                    let (head, tail) = self.objects.split_at_mut(j);
                    let (a, b) = (&mut head[i], &mut tail[0]);
                    if a.grabbed() || b.grabbed() {
                        continue;
                    }
                    any |= separate(a, b, pass == 0);
                }
            }
            if !any {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::physics::collision::object_overlap;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn world_with(objects: Vec<PhysicsObject>) -> PhysicsWorld {
        PhysicsWorld::new(BOUNDS, PhysicsTuning::default(), objects)
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_free_fall_one_frame() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 40.0)]);
        world.tick(FRAME_DT, BOUNDS, None, None);
        let o = &world.objects()[0];
        // vy = 0.5 * 0.98, then moved by it
        assert!((o.vel.y - 0.49).abs() < 1e-5);
        assert!((o.pos.y - 300.49).abs() < 1e-3);
        assert_eq!(o.pos.x, 400.0);
    }

    #[test]
    fn test_grab_snaps_to_palm() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0)]);
        let path = [
            Vec2::new(410.0, 300.0),
            Vec2::new(420.0, 305.0),
            Vec2::new(430.0, 310.0),
            Vec2::new(445.0, 310.0),
        ];
        for palm in path {
            let snap = world.tick(FRAME_DT, BOUNDS, None, Some(palm));
            assert!(snap[0].grabbed);
            assert_eq!(Vec2::new(snap[0].x, snap[0].y), palm);
            assert_eq!(world.objects()[0].grabbed_by, Some(HandLabel::Right));
        }
    }

    #[test]
    fn test_release_keeps_throw_velocity() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0)]);
        let prev = Vec2::new(405.0, 300.0);
        let last = Vec2::new(425.0, 290.0);
        world.tick(FRAME_DT, BOUNDS, Some(prev), None);
        world.tick(FRAME_DT, BOUNDS, Some(last), None);
        let thrown = (last - prev) * 1.5;
        assert!(approx(world.objects()[0].vel, thrown));

        // Hand gone: object is free and carries the throw into its first step
        world.tick(FRAME_DT, BOUNDS, None, None);
        let o = &world.objects()[0];
        assert!(!o.grabbed());
        let expected = (thrown + Vec2::new(0.0, 0.5)) * 0.98;
        assert!(approx(o.vel, expected));
    }

    #[test]
    fn test_repeated_palms_hold_throw_velocity() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0)]);
        let prev = Vec2::new(405.0, 300.0);
        let last = Vec2::new(425.0, 290.0);
        world.tick(FRAME_DT, BOUNDS, Some(prev), None);
        world.tick(FRAME_DT, BOUNDS, Some(last), None);
        // Render frames between tracker frames reuse the same palm
        world.step(FRAME_DT, BOUNDS, Some(last), None, false);
        world.step(FRAME_DT, BOUNDS, Some(last), None, false);
        let thrown = (last - prev) * 1.5;
        assert!(world.objects()[0].grabbed());
        assert!(approx(world.objects()[0].vel, thrown));

        world.tick(FRAME_DT, BOUNDS, None, None);
        let expected = (thrown + Vec2::new(0.0, 0.5)) * 0.98;
        assert!(approx(world.objects()[0].vel, expected));
    }

    #[test]
    fn test_fresh_repeat_of_palm_stops_throw() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0)]);
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(405.0, 300.0)), None);
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(425.0, 290.0)), None);
        // A new tracker frame with the hand held still
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(425.0, 290.0)), None);
        assert_eq!(world.objects()[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_first_grab_tick_keeps_velocity_without_history() {
        let mut obj = PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0);
        obj.vel = Vec2::new(3.0, -1.0);
        let mut world = world_with(vec![obj]);
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(400.0, 300.0)), None);
        assert_eq!(world.objects()[0].vel, Vec2::new(3.0, -1.0));
    }

    #[test]
    fn test_closer_hand_wins_grab() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 60.0)]);
        world.tick(
            FRAME_DT,
            BOUNDS,
            Some(Vec2::new(390.0, 300.0)),
            Some(Vec2::new(430.0, 300.0)),
        );
        assert_eq!(world.objects()[0].grabbed_by, Some(HandLabel::Left));
        assert_eq!(world.objects()[0].pos, Vec2::new(390.0, 300.0));
    }

    #[test]
    fn test_tie_goes_to_right_hand() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 60.0)]);
        world.tick(
            FRAME_DT,
            BOUNDS,
            Some(Vec2::new(380.0, 300.0)),
            Some(Vec2::new(420.0, 300.0)),
        );
        assert_eq!(world.objects()[0].grabbed_by, Some(HandLabel::Right));
    }

    #[test]
    fn test_nearby_palm_pushes_free_object() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 20.0)]);
        // 50px left of the object: outside grab range, inside influence
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(350.0, 300.0)), None);
        let o = &world.objects()[0];
        assert!(!o.grabbed());
        // force = (100 - 50) / 100 * 2 = 1.0, then friction
        assert!((o.vel.x - 0.98).abs() < 1e-5);
    }

    #[test]
    fn test_push_scales_with_frame_multiple() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 20.0)]);
        world.tick(FRAME_DT * 2.0, BOUNDS, Some(Vec2::new(350.0, 300.0)), None);
        // Two frames of push, then friction squared
        assert!((world.objects()[0].vel.x - 2.0 * 0.98 * 0.98).abs() < 1e-4);
    }

    #[test]
    fn test_far_palm_has_no_effect() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 20.0)]);
        world.tick(FRAME_DT, BOUNDS, Some(Vec2::new(200.0, 300.0)), None);
        assert_eq!(world.objects()[0].vel.x, 0.0);
    }

    #[test]
    fn test_grabbed_objects_skip_pair_collision() {
        let a = PhysicsObject::new(0, Vec2::new(400.0, 300.0), 50.0);
        let b = PhysicsObject::new(1, Vec2::new(420.0, 300.0), 50.0);
        let mut world = world_with(vec![a, b]);
        // Both are within their own size of the palm, so one hand holds both
        let palm = Vec2::new(395.0, 300.0);
        world.tick(FRAME_DT, BOUNDS, Some(palm), None);
        assert!(world.objects().iter().all(|o| o.grabbed()));
        assert!(world.objects().iter().all(|o| o.pos == palm));
    }

    #[test]
    fn test_overlapping_free_objects_separate() {
        let tuning = PhysicsTuning {
            gravity: 0.0,
            ..PhysicsTuning::default()
        };
        let a = PhysicsObject::new(0, Vec2::new(400.0, 300.0), 40.0);
        let b = PhysicsObject::new(1, Vec2::new(410.0, 300.0), 40.0);
        let mut world = PhysicsWorld::new(BOUNDS, tuning, vec![a, b]);
        for _ in 0..60 {
            world.tick(FRAME_DT, BOUNDS, None, None);
            let [a, b] = world.objects() else { panic!() };
            assert!(object_overlap(a, b).penetration < 1e-3);
        }
    }

    #[test]
    fn test_seeded_world_settles_without_deep_overlap() {
        let tuning = PhysicsTuning::default();
        let bounds = Vec2::new(1600.0, 900.0);
        let mut world = PhysicsWorld::seeded(7, bounds, tuning);
        for _ in 0..900 {
            world.tick(FRAME_DT, bounds, None, None);
        }
        let objects = world.objects();
        for i in 0..objects.len() {
            for j in (i + 1)..objects.len() {
                let hit = object_overlap(&objects[i], &objects[j]);
                let min_dist = (objects[i].size() + objects[j].size()) / 2.0;
                assert!(
                    hit.penetration < min_dist * 0.25,
                    "objects {i} and {j} overlap by {}",
                    hit.penetration
                );
            }
        }
    }

    #[test]
    fn test_objects_stay_in_bounds() {
        let mut world = PhysicsWorld::seeded(11, BOUNDS, PhysicsTuning::default());
        for _ in 0..300 {
            world.tick(FRAME_DT, BOUNDS, None, None);
        }
        for o in world.objects() {
            // Pair pushes can nudge past an edge by a little; walls pull it back next step
            let slack = o.radius() + 1.0;
            assert!(o.pos.x >= -slack && o.pos.x <= BOUNDS.x + slack);
            assert!(o.pos.y >= -slack && o.pos.y <= BOUNDS.y + slack);
        }
    }

    #[test]
    fn test_size_never_changes() {
        let mut world = PhysicsWorld::seeded(3, BOUNDS, PhysicsTuning::default());
        let sizes: Vec<f32> = world.objects().iter().map(|o| o.size()).collect();
        for i in 0..120 {
            let palm = Vec2::new(100.0 + i as f32 * 5.0, 400.0);
            world.tick(FRAME_DT, BOUNDS, Some(palm), None);
        }
        let after: Vec<f32> = world.objects().iter().map(|o| o.size()).collect();
        assert_eq!(sizes, after);
    }

    #[test]
    fn test_resize_keeps_count_and_clamps() {
        let mut world = PhysicsWorld::seeded(5, Vec2::new(1600.0, 900.0), PhysicsTuning::default());
        world.resize(Vec2::new(400.0, 300.0));
        assert_eq!(world.objects().len(), 10);
        for o in world.objects() {
            assert!(o.pos.x + o.radius() <= 400.0 + 1e-3);
            assert!(o.pos.y + o.radius() <= 300.0 + 1e-3);
        }
    }

    #[test]
    fn test_double_frame_matches_scale() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 100.0), 40.0)]);
        world.tick(FRAME_DT * 2.0, BOUNDS, None, None);
        let o = &world.objects()[0];
        // gravity doubled, friction squared
        assert!((o.vel.y - 1.0 * 0.98 * 0.98).abs() < 1e-4);
    }

    #[test]
    fn test_step_scale_clamps() {
        assert_eq!(step_scale(-1.0), 0.0);
        assert_eq!(step_scale(10.0), MAX_STEP_SCALE);
    }

    #[test]
    fn test_zero_dt_is_inert() {
        let mut world = world_with(vec![PhysicsObject::new(0, Vec2::new(400.0, 300.0), 40.0)]);
        world.tick(0.0, BOUNDS, None, None);
        assert_eq!(world.objects()[0].pos, Vec2::new(400.0, 300.0));
    }
}
