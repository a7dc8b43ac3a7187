//! Per-frame orchestration: input, simulation and draw order.

use crate::background::{parallax_velocities, Background};
use crate::camera::Camera;
use crate::config::{Config, VideoConfig};
use crate::entity::{Entity, EntityFlags};
use crate::map::TileMap;
use crate::render::Canvas;
use std::time::Duration;

pub const PLAYER_WIDTH: u32 = 24;
pub const PLAYER_HEIGHT: u32 = 40;
pub const PLAYER_SPAWN: (f64, f64) = (64.0, 568.0);

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4.0;

/// Tile type the player can stand on.
pub const FLOOR_TYPE: &str = "Floor";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Keys held down (or window events seen) during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub quit: bool,
    /// Window closed by the host
    pub close_requested: bool,
    pub pause: bool,
    pub resume: bool,
    pub zoom_reset: bool,
    pub zoom_out: bool,
    pub zoom_in: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Something the audio side should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Died,
    Paused,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Running,
    RequestExit(i32),
}

/// The running game: one map, the player and the parallax layers.
pub struct Game<I> {
    pub map: TileMap<I>,
    pub player: Entity,
    sprite: I,
    backgrounds: Vec<Background<I>>,
    pub camera: Camera,
    viewport: (f64, f64),
    zoom: f64,
    initial_zoom: f64,
    paused: bool,
}

impl<I> Game<I> {
    pub fn new(map: TileMap<I>, sprite: I, backgrounds: Vec<Background<I>>, config: &Config) -> Self {
        let player = Entity::new(
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
            PLAYER_SPAWN.0,
            PLAYER_SPAWN.1,
            map.pixel_width(),
            map.pixel_height(),
            config.player.clone(),
        );
        Self::with_player(map, player, sprite, backgrounds, &config.video)
    }

    pub fn with_player(
        map: TileMap<I>,
        player: Entity,
        sprite: I,
        backgrounds: Vec<Background<I>>,
        video: &VideoConfig,
    ) -> Self {
        let initial_zoom = video.initial_zoom().clamp(MIN_ZOOM, MAX_ZOOM);
        Self {
            map,
            player,
            sprite,
            backgrounds,
            camera: Camera::default(),
            viewport: (video.width as f64, video.height as f64),
            zoom: initial_zoom,
            initial_zoom,
            paused: false,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn backgrounds(&self) -> &[Background<I>] {
        &self.backgrounds
    }

    /// Runs one frame of `dt` seconds. The frame always completes; an exit
    /// request is only reported back to the caller.
    pub fn tick(&mut self, input: &InputState, dt: f64) -> (LoopControl, Vec<GameEvent>) {
        let mut events = Vec::new();
        let mut control = LoopControl::Running;

        if input.close_requested {
            control = LoopControl::RequestExit(EXIT_FAILURE);
        }
        if input.quit {
            control = LoopControl::RequestExit(EXIT_SUCCESS);
        }

        if input.pause && !self.paused {
            self.paused = true;
            events.push(GameEvent::Paused);
            tracing::info!("paused");
        }
        if input.resume && self.paused {
            self.paused = false;
            events.push(GameEvent::Resumed);
            tracing::info!("resumed");
        }
        if self.paused {
            return (control, events);
        }

        self.update_zoom(input, dt);
        self.apply_movement_input(input, &mut events);
        self.follow_player();
        self.choose_animation();

        let p = &self.player;
        let on_floor =
            self.map
                .is_point_of_type(p.x + p.width / 1.5, p.y + p.height, FLOOR_TYPE);
        // A rising player passes through floor tiles.
        let grounded = on_floor && !p.is_jumping();
        self.player.flags.set(EntityFlags::AIRBORNE, !grounded);

        if self.player.is_dead() {
            events.push(GameEvent::Died);
            self.player.respawn();
        }

        self.player.update(dt);
        (control, events)
    }

    fn update_zoom(&mut self, input: &InputState, dt: f64) {
        if input.zoom_reset {
            self.zoom = self.initial_zoom;
        }
        if input.zoom_out {
            self.zoom -= dt;
        }
        if input.zoom_in {
            self.zoom += dt;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn apply_movement_input(&mut self, input: &InputState, events: &mut Vec<GameEvent>) {
        let flags = &mut self.player.flags;
        flags.remove(EntityFlags::TRAVELING);

        if input.left {
            flags.insert(EntityFlags::TRAVELING | EntityFlags::DIRECTION);
        }
        if input.right {
            flags.insert(EntityFlags::TRAVELING);
            flags.remove(EntityFlags::DIRECTION);
        }
        if input.jump
            && !flags.contains(EntityFlags::JUMPING)
            && !flags.contains(EntityFlags::AIRBORNE)
        {
            flags.insert(EntityFlags::JUMPING);
            events.push(GameEvent::Jumped);
        }
    }

    fn follow_player(&mut self) {
        let p = &self.player;
        self.camera.follow(
            p.x,
            p.y,
            p.width,
            p.height,
            self.map.pixel_width() as f64,
            self.map.pixel_height() as f64,
            self.viewport,
            self.zoom,
        );

        let facing_left = p.flags.contains(EntityFlags::DIRECTION);
        let speeds = parallax_velocities(p.velocity_x, self.camera.locked);
        for (bg, velocity) in self.backgrounds.iter_mut().zip(speeds) {
            bg.velocity = velocity;
            bg.scroll_right = facing_left;
            bg.scroll();
        }
    }

    /// idle < traveling < airborne; airborne splits into rising and falling.
    fn choose_animation(&mut self) {
        let p = &mut self.player;
        p.flags.insert(EntityFlags::IDLING);
        p.set_sprite_animation(0, 11, 0, 10.0);

        if p.flags.contains(EntityFlags::TRAVELING) {
            p.set_sprite_animation(0, 7, 1, 20.0);
        }
        if p.flags.contains(EntityFlags::AIRBORNE) {
            if p.is_jumping() {
                p.set_sprite_animation(14, 14, 0, 20.0);
            } else {
                p.set_sprite_animation(14, 14, 1, 20.0);
            }
        }
    }

    /// Draws the frame back to front. A failed draw call is logged and
    /// skipped; the rest of the frame is still drawn.
    pub fn render<C>(&mut self, canvas: &mut C)
    where
        C: Canvas<Image = I>,
    {
        let camera = self.camera.offset();
        let bottom = self.map.pixel_height() as f64;

        for (i, bg) in self.backgrounds.iter().enumerate() {
            if let Err(err) = bg.draw(canvas, bottom, camera) {
                tracing::error!(layer = i, %err, "background draw failed");
            }
        }
        if let Err(err) = self.map.render_layer(canvas, 0, "Background", true, camera) {
            tracing::error!(slot = 0, %err, "map layer draw failed");
        }
        if let Err(err) = self.player.draw(canvas, &self.sprite, camera) {
            tracing::error!(%err, "player draw failed");
        }
        if let Err(err) = self.map.render_layer(canvas, 2, "Foreground", false, camera) {
            tracing::error!(slot = 2, %err, "map layer draw failed");
        }
    }
}

/// Time left to sleep in a frame of `1000 / target_fps` milliseconds. A frame
/// that overran its budget gets no sleep.
pub fn frame_delay(target_fps: u32, last_frame_ms: f64) -> Duration {
    if target_fps == 0 {
        return Duration::ZERO;
    }
    let budget_ms = 1000.0 / target_fps as f64;
    let remaining = budget_ms - last_frame_ms;
    if remaining.is_finite() && remaining > 0.0 {
        Duration::from_secs_f64(remaining / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityConfig;
    use crate::ir_map::*;
    use crate::render::{DrawCall, HeadlessCanvas, HeadlessImage};

    const FLOOR: u32 = 1;

    /// 10x10 map of 16px tiles; row 8 is floor on a "Background" layer.
    fn map(floor_row: bool) -> TileMap<HeadlessImage> {
        let mut data = vec![0; 100];
        if floor_row {
            data[80..90].fill(FLOOR);
        }
        let ir = IrMap {
            width: 10,
            height: 10,
            tile_w: 16,
            tile_h: 16,
            background_color: None,
            tilesets: vec![IrTileset::Atlas {
                first_gid: 1,
                image: None,
                tile_w: 16,
                tile_h: 16,
                tilecount: 4,
                columns: 2,
                spacing: 0,
                margin: 0,
                tiles: vec![IrTileMetadata {
                    id: 0,
                    class_name: Some("Floor".into()),
                }],
            }],
            layers: vec![
                IrLayer {
                    name: "Background".into(),
                    visible: true,
                    data,
                },
                IrLayer {
                    name: "Foreground".into(),
                    visible: true,
                    data: vec![0; 100],
                },
            ],
        };
        TileMap::from_ir(
            ir,
            HeadlessImage {
                id: 900,
                width: 32,
                height: 32,
            },
        )
    }

    fn game(floor_row: bool, x: f64, y: f64) -> Game<HeadlessImage> {
        let player = Entity::new(16, 16, x, y, 160, 160, EntityConfig::default());
        let sprite = HeadlessImage {
            id: 901,
            width: 256,
            height: 32,
        };
        Game::with_player(map(floor_row), player, sprite, Vec::new(), &VideoConfig::default())
    }

    #[test]
    fn quit_and_close_request_exit() {
        let mut g = game(true, 64.0, 112.0);
        let (control, _) = g.tick(&InputState::default(), 0.016);
        assert_eq!(control, LoopControl::Running);

        let close = InputState {
            close_requested: true,
            ..Default::default()
        };
        assert_eq!(g.tick(&close, 0.016).0, LoopControl::RequestExit(EXIT_FAILURE));

        let quit = InputState {
            quit: true,
            close_requested: true,
            ..Default::default()
        };
        assert_eq!(g.tick(&quit, 0.016).0, LoopControl::RequestExit(EXIT_SUCCESS));
    }

    #[test]
    fn pause_freezes_simulation_until_resumed() {
        let mut g = game(false, 64.0, 20.0);
        let pause = InputState {
            pause: true,
            ..Default::default()
        };
        let (_, events) = g.tick(&pause, 0.1);
        assert_eq!(events, vec![GameEvent::Paused]);
        assert!(g.is_paused());

        let (_, events) = g.tick(&pause, 0.1);
        assert!(events.is_empty(), "already paused");
        assert_eq!((g.player.x, g.player.y), (64.0, 20.0));

        let resume = InputState {
            resume: true,
            ..Default::default()
        };
        let (_, events) = g.tick(&resume, 0.1);
        assert_eq!(events, vec![GameEvent::Resumed]);
        assert!(g.player.y > 20.0, "falls again once resumed");
    }

    #[test]
    fn zoom_keys_are_clamped() {
        let mut g = game(true, 64.0, 112.0);
        assert_eq!(g.zoom(), 3.0);
        let zoom_in = InputState {
            zoom_in: true,
            ..Default::default()
        };
        for _ in 0..5 {
            g.tick(&zoom_in, 0.5);
        }
        assert_eq!(g.zoom(), MAX_ZOOM);

        let zoom_out = InputState {
            zoom_out: true,
            ..Default::default()
        };
        for _ in 0..10 {
            g.tick(&zoom_out, 0.5);
        }
        assert_eq!(g.zoom(), MIN_ZOOM);

        let reset = InputState {
            zoom_reset: true,
            ..Default::default()
        };
        g.tick(&reset, 0.5);
        assert_eq!(g.zoom(), 3.0);
    }

    #[test]
    fn standing_on_floor_stays_grounded() {
        // feet at y=128, the top of the floor row
        let mut g = game(true, 64.0, 112.0);
        for _ in 0..10 {
            g.tick(&InputState::default(), 0.016);
        }
        assert!(!g.player.flags.contains(EntityFlags::AIRBORNE));
        assert_eq!(g.player.y, 112.0);
        assert_eq!(g.player.animation().row, 0);
        assert_eq!(g.player.animation().frame_end, 11);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let mut g = game(true, 64.0, 112.0);
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        let (_, events) = g.tick(&jump, 0.05);
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(g.player.is_jumping());
        assert!(g.player.y < 112.0);

        let (_, events) = g.tick(&jump, 0.05);
        assert!(events.is_empty(), "no double jump");
        assert!(g.player.flags.contains(EntityFlags::AIRBORNE));
        assert_eq!(g.player.animation().frame_start, 14);
        assert_eq!(g.player.animation().row, 0, "rising frame");
    }

    #[test]
    fn jump_lands_back_on_the_floor() {
        let mut g = game(true, 64.0, 112.0);
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        g.tick(&jump, 0.05);
        for _ in 0..200 {
            g.tick(&InputState::default(), 0.05);
        }
        assert!(!g.player.flags.contains(EntityFlags::AIRBORNE));
        assert!(!g.player.is_dead());
        assert_eq!(g.player.y, 112.0);
    }

    #[test]
    fn walking_sets_direction_and_travel_animation() {
        let mut g = game(true, 64.0, 112.0);
        let left = InputState {
            left: true,
            ..Default::default()
        };
        g.tick(&left, 0.05);
        assert!(g.player.flags.contains(EntityFlags::DIRECTION | EntityFlags::TRAVELING));
        assert!(g.player.x < 64.0);
        assert_eq!(g.player.animation().row, 1);

        let right = InputState {
            right: true,
            ..Default::default()
        };
        g.tick(&right, 0.05);
        assert!(!g.player.flags.contains(EntityFlags::DIRECTION));

        g.tick(&InputState::default(), 0.05);
        assert!(!g.player.flags.contains(EntityFlags::TRAVELING));
    }

    #[test]
    fn falling_out_of_the_map_respawns() {
        let mut g = game(false, 64.0, 64.0);
        let mut died = 0;
        for _ in 0..20 {
            let (_, events) = g.tick(&InputState::default(), 0.1);
            died += events.iter().filter(|e| **e == GameEvent::Died).count();
        }
        // KeepMotion: the second life starts with the speed of the first fall
        assert_eq!(died, 2);
        assert_eq!(g.player.spawn_position(), (64.0, 64.0));
    }

    #[test]
    fn render_order_and_failed_layers_are_skipped() {
        let mut g = game(true, 64.0, 112.0);
        g.tick(&InputState::default(), 0.016);

        let mut canvas = HeadlessCanvas::new();
        g.render(&mut canvas);
        let images: Vec<usize> = canvas
            .blits()
            .filter_map(|c| match c {
                DrawCall::Blit { image, .. } => Some(*image),
                _ => None,
            })
            .collect();
        // floor row of slot 0, slot 0 on screen, player, slot 2 on screen
        assert_eq!(images.len(), 10 + 1 + 1 + 1);
        assert_eq!(images[images.len() - 2], 901);

        let mut failing = HeadlessCanvas::new();
        failing.fail_allocations = true;
        let mut g = game(true, 64.0, 112.0);
        g.render(&mut failing);
        let blits: Vec<&DrawCall> = failing.blits().collect();
        assert_eq!(blits.len(), 1, "only the player is drawn");
    }

    #[test]
    fn frame_delay_saturates() {
        assert_eq!(frame_delay(8, 62.5), Duration::from_micros(62_500));
        assert_eq!(frame_delay(60, 40.0), Duration::ZERO);
        assert_eq!(frame_delay(0, 1.0), Duration::ZERO);
    }
}
