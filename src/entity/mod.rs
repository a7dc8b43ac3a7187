//! Player-style actors: motion integration, state flags and sprite frames.

mod animation;
mod config;
mod flags;

pub use animation::{Animator, SpriteAnimation};
pub use config::{EntityConfig, RespawnPolicy};
pub use flags::EntityFlags;

use crate::aabb::Aabb;
use crate::error::RenderError;
use crate::render::Canvas;
use macroquad::prelude::*;

/// A moving actor inside a map of `map_width` x `map_height` pixels.
///
/// Positions are the top-left corner in world pixels. Vertical velocity is
/// negative while moving up.
#[derive(Debug, Clone)]
pub struct Entity {
    pub config: EntityConfig,
    pub width: f64,
    pub height: f64,
    map_width: f64,
    map_height: f64,
    pub x: f64,
    pub y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    initial_jump_velocity: f64,
    pub flags: EntityFlags,
    bbox: Aabb,
    animator: Animator,
    spawn: (f64, f64),
}

impl Entity {
    pub fn new(
        width: u32,
        height: u32,
        x: f64,
        y: f64,
        map_width: u32,
        map_height: u32,
        config: EntityConfig,
    ) -> Self {
        let (width, height) = (width as f64, height as f64);
        Self {
            config,
            width,
            height,
            map_width: map_width as f64,
            map_height: map_height as f64,
            x,
            y,
            velocity_x: 0.0,
            velocity_y: 0.0,
            initial_jump_velocity: 0.0,
            flags: EntityFlags::EMPTY,
            bbox: Aabb::from_position(x, y, width, height),
            animator: Animator::default(),
            spawn: (x, y),
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    pub fn spawn_position(&self) -> (f64, f64) {
        self.spawn
    }

    pub fn frame(&self) -> u8 {
        self.animator.frame
    }

    pub fn animation(&self) -> SpriteAnimation {
        self.animator.animation
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(EntityFlags::DEAD)
    }

    /// Rising: vertical velocity points up.
    pub fn is_jumping(&self) -> bool {
        self.velocity_y < 0.0
    }

    pub fn set_sprite_animation(&mut self, frame_start: u8, frame_end: u8, row: u8, fps: f64) {
        self.animator.animation = SpriteAnimation {
            frame_start,
            frame_end,
            row,
            fps,
        };
    }

    /// Advances the entity by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        self.bbox = Aabb::from_position(self.x, self.y, self.width, self.height);
        let cfg = &self.config;

        // A pending jump turns into an upward impulse on the ground.
        if !self.flags.contains(EntityFlags::AIRBORNE) && self.flags.contains(EntityFlags::JUMPING) {
            self.initial_jump_velocity = self.velocity_x;
            self.velocity_y = -cfg.jump_force - self.initial_jump_velocity * dt;
            self.flags.insert(EntityFlags::AIRBORNE);
        }

        if self.flags.contains(EntityFlags::AIRBORNE) {
            let g = cfg.world_meter_in_pixels * cfg.gravity;
            let distance_y = g * dt * dt;
            self.velocity_y += distance_y;
            self.y += self.velocity_y;

            if self.velocity_y >= 0.0 {
                self.flags.remove(EntityFlags::JUMPING);
            }
        } else {
            self.snap_to_ground_grid();
            self.velocity_y = 0.0;
            self.initial_jump_velocity = 0.0;
        }

        let cfg = &self.config;
        if self.flags.contains(EntityFlags::TRAVELING) {
            let distance_x = cfg.world_meter_in_pixels * cfg.acceleration * dt * dt;
            self.velocity_x += distance_x;
        } else {
            self.velocity_x = (self.velocity_x - cfg.deceleration * dt).max(0.0);
        }
        self.velocity_x = self.velocity_x.clamp(0.0, cfg.max_velocity_x);

        if self.velocity_x > 0.0 {
            if self.flags.contains(EntityFlags::DIRECTION) {
                self.x -= self.velocity_x;
            } else {
                self.x += self.velocity_x;
            }
        }

        self.wrap_horizontally();

        let floor = self.map_height + self.height;
        if self.y >= floor {
            self.flags.insert(EntityFlags::DEAD);
            self.y = floor;
        }

        self.bbox = Aabb::from_position(self.x, self.y, self.width, self.height);
        self.animator.advance(dt);
    }

    /// Moves `y` up to the closest multiple of the ground grid.
    fn snap_to_ground_grid(&mut self) {
        if !self.y.is_finite() {
            return;
        }
        let grid = self.config.ground_snap.max(1) as i64;
        self.y = self.y.floor();
        self.y -= (self.y as i64).rem_euclid(grid) as f64;
    }

    /// The world is a horizontal loop: leaving one edge enters the other.
    fn wrap_horizontally(&mut self) {
        let right_edge = self.map_width - self.width;
        if self.x <= 0.0 {
            self.x = right_edge;
        } else if self.x > right_edge {
            self.x = 0.0;
        }
    }

    /// Brings a dead entity back at its spawn point.
    pub fn respawn(&mut self) {
        self.flags.remove(EntityFlags::DEAD | EntityFlags::TRAVELING);
        (self.x, self.y) = self.spawn;

        if self.config.respawn == RespawnPolicy::ResetMotion {
            self.velocity_x = 0.0;
            self.velocity_y = 0.0;
            self.initial_jump_velocity = 0.0;
            self.animator.reset();
        }
        self.bbox = Aabb::from_position(self.x, self.y, self.width, self.height);
        tracing::debug!(x = self.x, y = self.y, "entity respawned");
    }

    /// Draws the current animation frame; the sprite is mirrored when facing
    /// left.
    pub fn draw<C: Canvas>(
        &self,
        canvas: &mut C,
        sprite: &C::Image,
        camera: Vec2,
    ) -> Result<(), RenderError> {
        let (w, h) = (self.width as f32, self.height as f32);
        let src = Rect::new(
            self.animator.frame as f32 * w,
            self.animator.animation.row as f32 * h,
            w,
            h,
        );
        let dest = Rect::new(self.x as f32 - camera.x, self.y as f32 - camera.y, w, h);
        canvas.blit(sprite, Some(src), dest, self.flags.contains(EntityFlags::DIRECTION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCall, HeadlessCanvas, HeadlessImage};

    const MAP_W: u32 = 160;
    const MAP_H: u32 = 160;

    fn entity(x: f64, y: f64) -> Entity {
        Entity::new(16, 16, x, y, MAP_W, MAP_H, EntityConfig::default())
    }

    #[test]
    fn bbox_tracks_position_after_update() {
        let mut e = entity(64.0, 64.0);
        e.flags.insert(EntityFlags::TRAVELING | EntityFlags::AIRBORNE);
        for _ in 0..3 {
            e.update(1.0 / 60.0);
            assert_eq!(e.bbox(), Aabb::from_position(e.x, e.y, 16.0, 16.0));
        }
    }

    #[test]
    fn gravity_accelerates_a_falling_entity() {
        let mut e = entity(64.0, 0.0);
        e.flags.insert(EntityFlags::AIRBORNE);
        let mut last = e.velocity_y;
        for _ in 0..10 {
            e.update(0.02);
            assert!(e.velocity_y > last, "{} <= {}", e.velocity_y, last);
            last = e.velocity_y;
        }
        // quadratic-in-dt scaling: 16 px/m * 9.81 * 0.02^2 per tick
        let step = 16.0 * 9.81 * 0.02 * 0.02;
        assert!((e.velocity_y - 10.0 * step).abs() < 1e-9);
    }

    #[test]
    fn jump_impulse_points_up_then_apex_clears_jumping() {
        let mut e = entity(64.0, 96.0);
        e.velocity_x = 2.0;
        e.flags.insert(EntityFlags::JUMPING);
        e.update(0.1);

        assert!(e.flags.contains(EntityFlags::AIRBORNE));
        assert!(e.flags.contains(EntityFlags::JUMPING));
        assert!(e.is_jumping());
        // -3 - 2 * 0.1 plus one gravity step of 16 * 9.81 * 0.01
        let expected_vy = -3.2 + 1.5696;
        assert!((e.velocity_y - expected_vy).abs() < 1e-9);
        assert!((e.y - (96.0 + expected_vy)).abs() < 1e-9);

        e.update(0.1);
        assert!(e.is_jumping(), "still rising just below the apex");

        e.update(0.1);
        assert!(!e.is_jumping());
        assert!(!e.flags.contains(EntityFlags::JUMPING));
        assert!(e.flags.contains(EntityFlags::AIRBORNE));
    }

    #[test]
    fn grounded_entity_snaps_up_to_grid() {
        let mut e = entity(64.0, 101.7);
        e.velocity_y = 5.0;
        e.update(0.016);
        assert_eq!(e.y, 96.0);
        assert_eq!(e.velocity_y, 0.0);

        let mut e = entity(64.0, 104.0);
        e.update(0.016);
        assert_eq!(e.y, 104.0, "already on the grid");
    }

    #[test]
    fn snapping_far_below_the_map_terminates() {
        for y in [f64::INFINITY, 1e300, 2f64.powi(60)] {
            let mut e = entity(64.0, y);
            e.update(0.016);
            assert!(e.is_dead(), "y = {y}");
            assert_eq!(e.y, f64::from(MAP_H + 16));
        }
    }

    #[test]
    fn traveling_accelerates_and_is_capped() {
        let mut e = entity(32.0, 96.0);
        e.flags.insert(EntityFlags::TRAVELING);
        e.update(0.1);
        assert!((e.velocity_x - 1.28).abs() < 1e-9);
        assert!((e.x - 33.28).abs() < 1e-9);

        for _ in 0..20 {
            e.update(0.1);
        }
        assert_eq!(e.velocity_x, e.config.max_velocity_x);
    }

    #[test]
    fn releasing_input_decelerates_to_rest() {
        let mut e = entity(32.0, 96.0);
        e.velocity_x = 1.0;
        e.update(0.1);
        assert!((e.velocity_x - 0.5).abs() < 1e-9);
        e.update(0.5);
        assert_eq!(e.velocity_x, 0.0);
        let x = e.x;
        e.update(0.5);
        assert_eq!(e.x, x, "no drift at rest");
    }

    #[test]
    fn direction_flag_moves_left() {
        let mut e = entity(64.0, 96.0);
        e.velocity_x = 2.0;
        e.flags.insert(EntityFlags::TRAVELING | EntityFlags::DIRECTION);
        e.update(0.0);
        assert_eq!(e.x, 62.0);
    }

    #[test]
    fn wrap_left_edge_is_a_fixed_point_on_the_right() {
        let mut e = entity(2.0, 96.0);
        e.velocity_x = 2.0;
        e.flags.insert(EntityFlags::DIRECTION);
        e.config.deceleration = 0.0;
        e.update(0.0);
        assert_eq!(e.x, 144.0);

        e.velocity_x = 0.0;
        e.update(0.0);
        assert_eq!(e.x, 144.0, "right edge itself does not wrap");
    }

    #[test]
    fn wrap_past_right_edge_goes_to_zero() {
        let mut e = entity(143.0, 96.0);
        e.velocity_x = 2.0;
        e.config.deceleration = 0.0;
        e.update(0.0);
        assert_eq!(e.x, 0.0);
    }

    #[test]
    fn death_threshold_is_inclusive() {
        let mut e = entity(64.0, 176.0);
        e.flags.insert(EntityFlags::AIRBORNE);
        e.update(0.0);
        assert!(e.is_dead());
        assert_eq!(e.y, 176.0);

        let mut e = entity(64.0, 175.0);
        e.flags.insert(EntityFlags::AIRBORNE);
        e.update(0.0);
        assert!(!e.is_dead());
        assert_eq!(e.y, 175.0);
    }

    #[test]
    fn respawn_restores_spawn_and_keeps_motion_by_default() {
        let mut e = entity(64.0, 64.0);
        e.flags.insert(EntityFlags::AIRBORNE | EntityFlags::TRAVELING);
        for _ in 0..20 {
            e.update(0.1);
        }
        assert!(e.is_dead());
        let (vx, vy) = (e.velocity_x, e.velocity_y);

        e.respawn();
        assert_eq!((e.x, e.y), (64.0, 64.0));
        assert!(!e.is_dead());
        assert!(!e.flags.contains(EntityFlags::TRAVELING));
        assert_eq!((e.velocity_x, e.velocity_y), (vx, vy));
        assert_eq!(e.bbox(), Aabb::from_position(64.0, 64.0, 16.0, 16.0));
    }

    #[test]
    fn reset_motion_policy_zeroes_velocity_and_frame() {
        let mut e = entity(64.0, 64.0);
        e.config.respawn = RespawnPolicy::ResetMotion;
        e.set_sprite_animation(0, 7, 1, 20.0);
        e.velocity_x = 3.0;
        e.velocity_y = 12.0;
        e.update(0.2);
        assert_ne!(e.frame(), 0);
        e.flags.insert(EntityFlags::DEAD);

        e.respawn();
        assert_eq!((e.velocity_x, e.velocity_y), (0.0, 0.0));
        assert_eq!(e.frame(), 0);
        assert_eq!(e.spawn_position(), (64.0, 64.0));
    }

    #[test]
    fn draw_picks_frame_row_and_mirrors_when_facing_left() {
        let mut e = Entity::new(24, 40, 100.0, 50.0, 800, 600, EntityConfig::default());
        e.set_sprite_animation(2, 7, 1, 10.0);
        e.update(0.0);
        e.flags.insert(EntityFlags::DIRECTION);

        let sprite = HeadlessImage {
            id: 7,
            width: 360,
            height: 80,
        };
        let mut canvas = HeadlessCanvas::new();
        e.draw(&mut canvas, &sprite, vec2(90.0, 40.0)).expect("draw");
        assert_eq!(
            canvas.calls,
            vec![DrawCall::Blit {
                image: 7,
                src: Some(Rect::new(48.0, 40.0, 24.0, 40.0)),
                dest: Rect::new(e.x as f32 - 90.0, e.y as f32 - 40.0, 24.0, 40.0),
                flip_x: true,
            }]
        );
    }
}
