use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// True when running without a window.
#[derive(Resource, Clone, Copy, Default)]
pub struct HeadlessMode(pub bool);

/// Presentation settings shared by the shell systems.
#[derive(Resource, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Screen pixels per room pixel.
    pub pixel_scale: f32,
    pub background_color: [f32; 3],
    pub show_tiles: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pixel_scale: 4.0,
            background_color: [0.0, 0.0, 0.0],
            show_tiles: true,
        }
    }
}

impl GameConfig {
    /// Room pixel `(x, y)` (origin top-left, y down) to a world translation
    /// centred on the room.
    pub fn to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new((x - 64.0) * self.pixel_scale, (64.0 - y) * self.pixel_scale)
    }
}

/// One cell of the static tile layer.
#[derive(Component, Clone, Copy)]
pub struct TileSprite {
    pub cx: i32,
    pub cy: i32,
}

/// Entity spawned from the current frame's draw list; replaced every frame.
#[derive(Component)]
pub struct FrameItem;
