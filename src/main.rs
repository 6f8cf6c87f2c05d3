mod actor;
mod audio;
mod behaviors;
mod camera;
mod cartridge;
mod components;
mod game_runtime;
mod host;
mod input;
mod math;
mod motion;
mod player;
mod render;
mod save;
mod simulation;
mod tiles;
mod world;

use std::path::PathBuf;

use bevy::prelude::*;
use components::{GameConfig, HeadlessMode};

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    pixel_scale: Option<f32>,
    background_color: Option<[f32; 3]>,
    cartridge: Option<String>,
    save_path: Option<String>,
    seed: Option<u64>,
    screen_shake: Option<bool>,
    assets_dir: Option<String>,
    audio: Option<audio::AudioConfig>,
}

fn load_startup_config() -> StartupConfig {
    let path = std::env::var("SUMMIT_GAME_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "game.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<StartupConfig>(&contents) {
            Ok(cfg) => {
                println!("[Summit] Loaded startup config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("[Summit] Failed to parse {}: {}", path, e);
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

/// Env var if set and non-empty, else the config value.
fn env_or(name: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .or(fallback)
}

fn run_scripted(cart: &cartridge::Cartridge, path: Option<&String>) -> Result<String, String> {
    let path = path.ok_or("--simulate needs a request file")?;
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let request = simulation::parse_request(&text)?;
    let result = simulation::run_simulation(cart, &request);
    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");
    let startup_config = load_startup_config();

    let cart_path = env_or("SUMMIT_CARTRIDGE", startup_config.cartridge).map(PathBuf::from);
    let cart = cartridge::Cartridge::resolve(cart_path.as_deref());

    if let Some(pos) = args.iter().position(|a| a == "--simulate") {
        match run_scripted(&cart, args.get(pos + 1)) {
            Ok(json) => {
                println!("{json}");
                return;
            }
            Err(e) => {
                eprintln!("[Summit] Simulation failed: {e}");
                std::process::exit(2);
            }
        }
    }

    let save_path = env_or("SUMMIT_SAVE_PATH", startup_config.save_path)
        .unwrap_or_else(|| "summit_save.json".to_string());
    let seed = startup_config.seed.unwrap_or(0x5eed);
    let mut world = world::World::new(cart, Box::new(save::FileSaveStore::new(&save_path)), seed);
    world.set_can_shake(startup_config.screen_shake.unwrap_or(true));
    world.boot();
    println!("[Summit] Save file: {}", save_path);

    let bg = startup_config.background_color.unwrap_or([0.0, 0.0, 0.0]);
    let game_config = GameConfig {
        pixel_scale: startup_config.pixel_scale.unwrap_or(4.0),
        background_color: bg,
        ..GameConfig::default()
    };

    let mut app = App::new();
    app.insert_resource(HeadlessMode(headless));

    if headless {
        app.add_plugins(MinimalPlugins);
        println!("[Summit] Starting in HEADLESS mode");
    } else {
        let assets_dir = env_or("SUMMIT_ASSETS_DIR", startup_config.assets_dir)
            .unwrap_or_else(|| "assets".to_string());
        if assets_dir != "assets" {
            println!("[Summit] Using game assets dir: {}", assets_dir);
        }

        let window_title = startup_config.window_title.unwrap_or_else(|| "Summit".to_string());
        let window_width = startup_config.window_width.unwrap_or(512.0);
        let window_height = startup_config.window_height.unwrap_or(512.0);

        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: window_title,
                        resolution: (window_width, window_height).into(),
                        present_mode: bevy::window::PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(bevy::asset::AssetPlugin {
                    file_path: assets_dir,
                    ..default()
                })
                .set(bevy::render::texture::ImagePlugin::default_nearest()),
        );
        app.insert_resource(ClearColor(Color::srgb(bg[0], bg[1], bg[2])));
        app.add_plugins(render::RenderPlugin);
        println!("[Summit] Starting in WINDOWED mode");
    }

    let audio_manager = audio::AudioManager::from_config(startup_config.audio.unwrap_or_default());

    app.insert_resource(game_config)
        .insert_resource(world)
        .insert_resource(audio_manager)
        .insert_resource(Time::<Fixed>::from_hz(f64::from(world::TICKS_PER_SECOND)))
        .add_plugins(input::InputPlugin)
        .add_plugins(game_runtime::RuntimePlugin)
        .add_plugins(audio::AudioPlugin)
        .add_plugins(camera::CameraPlugin);

    app.run();
}
