use anyhow::Context;
use boondock::{
    frame_delay, Background, Canvas, Config, Game, GameEvent, InputState, LoopControl, TileMap,
    BACKGROUND_LAYERS, EXIT_FAILURE,
};
use boondock::render::MacroquadCanvas;
use clap::Parser;
use macroquad::audio::{load_sound, play_sound, play_sound_once, stop_sound, PlaySoundParams, Sound};
use macroquad::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const MAP_PATH: &str = "res/maps/demo.json";
const TILESET_PATH: &str = "res/tilesets/jungle.png";
const SPRITE_PATH: &str = "res/sprites/sam.png";
const MUSIC_PATH: &str = "res/music/cheap_4track.ogg";
const BACKGROUND_PATHS: [&str; BACKGROUND_LAYERS] = [
    "res/backgrounds/plx-1.png",
    "res/backgrounds/plx-2.png",
    "res/backgrounds/plx-3.png",
    "res/backgrounds/plx-4.png",
    "res/backgrounds/plx-5.png",
];

#[derive(Parser, Debug)]
#[command(name = "boondock", about = "Side-scrolling platformer")]
struct Args {
    /// JSON configuration file
    #[arg(default_value = "default.json")]
    config: PathBuf,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Parsed once, before the window exists.
fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
        let args = Args::parse();
        Config::load(&args.config)
    })
}

fn window_conf() -> Conf {
    let video = &config().video;
    Conf {
        window_title: "Boondock Sam".into(),
        window_width: video.width,
        window_height: video.height,
        fullscreen: video.fullscreen,
        ..Default::default()
    }
}

struct Sounds {
    music: Option<Sound>,
    died: Option<Sound>,
    jumped: Option<Sound>,
    paused: Option<Sound>,
    resumed: Option<Sound>,
}

async fn load_optional_sound(path: &str) -> Option<Sound> {
    match load_sound(path).await {
        Ok(sound) => Some(sound),
        Err(err) => {
            tracing::warn!(path, %err, "couldn't load sound");
            None
        }
    }
}

impl Sounds {
    async fn load() -> Self {
        Self {
            music: load_optional_sound(MUSIC_PATH).await,
            died: load_optional_sound("res/sfx/dead2.wav").await,
            jumped: load_optional_sound("res/sfx/jump.wav").await,
            paused: load_optional_sound("res/sfx/pause.wav").await,
            resumed: load_optional_sound("res/sfx/unpause.wav").await,
        }
    }

    fn play_music(&self) {
        if let Some(music) = &self.music {
            play_sound(
                music,
                PlaySoundParams {
                    looped: true,
                    volume: 1.0,
                },
            );
        }
    }

    fn on_event(&self, event: GameEvent) {
        let sfx = match event {
            GameEvent::Jumped => &self.jumped,
            GameEvent::Died => &self.died,
            GameEvent::Paused => {
                if let Some(music) = &self.music {
                    stop_sound(music);
                }
                &self.paused
            }
            GameEvent::Resumed => {
                self.play_music();
                &self.resumed
            }
        };
        if let Some(sound) = sfx {
            play_sound_once(sound);
        }
    }
}

fn read_input() -> InputState {
    InputState {
        quit: is_key_down(KeyCode::Q),
        close_requested: is_quit_requested(),
        pause: is_key_down(KeyCode::P),
        resume: is_key_down(KeyCode::C),
        zoom_reset: is_key_down(KeyCode::Key0),
        zoom_out: is_key_down(KeyCode::Key1),
        zoom_in: is_key_down(KeyCode::Key2),
        left: is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::Right),
        jump: is_key_down(KeyCode::Space),
    }
}

async fn run(config: &Config) -> anyhow::Result<i32> {
    let video = &config.video;
    let mut canvas = MacroquadCanvas::new(video.initial_zoom() as f32);

    let map = TileMap::load(&mut canvas, MAP_PATH, TILESET_PATH)
        .with_context(|| format!("loading map {MAP_PATH}"))?;
    let sprite = canvas
        .load_image(Path::new(SPRITE_PATH))
        .with_context(|| format!("loading sprite {SPRITE_PATH}"))?;

    let mut backgrounds = Vec::with_capacity(BACKGROUND_LAYERS);
    for path in BACKGROUND_PATHS {
        let image = canvas
            .load_image(Path::new(path))
            .with_context(|| format!("loading background {path}"))?;
        let layer = Background::new(&mut canvas, &image, video.width.unsigned_abs())
            .with_context(|| format!("preparing background {path}"))?;
        backgrounds.push(layer);
    }

    let sounds = Sounds::load().await;
    sounds.play_music();

    let mut game = Game::new(map, sprite, backgrounds, config);
    let fps = video.fps.unsigned_abs();
    prevent_quit();

    loop {
        let started = Instant::now();
        let (control, events) = game.tick(&read_input(), get_frame_time() as f64);
        for event in events {
            sounds.on_event(event);
        }

        canvas.set_zoom(game.zoom() as f32);
        if let Err(err) = canvas.set_target(None) {
            tracing::error!(%err, "couldn't reset render target");
        }
        game.render(&mut canvas);

        if let LoopControl::RequestExit(code) = control {
            game.map.unload();
            return Ok(code);
        }

        if video.limit_fps {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            std::thread::sleep(frame_delay(fps, elapsed_ms));
        }
        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let code = match run(config()).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
