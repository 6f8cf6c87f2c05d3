use bevy::prelude::*;

use crate::components::{FrameItem, GameConfig, TileSprite};
use crate::host::{DrawCall, Recorder};
use crate::tiles::{TileFlags, ROOM_CELLS, TILE_SIZE};
use crate::world::World;

/// PICO-8 style 16 colour palette.
pub const PALETTE: [[f32; 3]; 16] = [
    [0.0, 0.0, 0.0],
    [0.114, 0.169, 0.325],
    [0.494, 0.145, 0.325],
    [0.0, 0.529, 0.318],
    [0.671, 0.322, 0.212],
    [0.373, 0.341, 0.310],
    [0.761, 0.765, 0.780],
    [1.0, 0.945, 0.910],
    [1.0, 0.0, 0.302],
    [1.0, 0.639, 0.0],
    [1.0, 0.925, 0.153],
    [0.0, 0.894, 0.212],
    [0.161, 0.678, 1.0],
    [0.514, 0.463, 0.612],
    [1.0, 0.467, 0.659],
    [1.0, 0.800, 0.667],
];

pub fn palette_color(index: u8) -> Color {
    let [r, g, b] = PALETTE[usize::from(index % 16)];
    Color::srgb(r, g, b)
}

/// Stand-in colour for a sprite id until a sprite sheet is wired in.
pub fn sprite_color(id: u16) -> Color {
    palette_color((id % 15 + 1) as u8)
}

/// Colour of a static tile in the tile layer, by its flags.
pub fn tile_color(flags: TileFlags) -> Option<Color> {
    if flags.intersects(TileFlags::SPIKES) {
        Some(palette_color(8))
    } else if flags.contains(TileFlags::ICE) {
        Some(palette_color(12))
    } else if flags.contains(TileFlags::SOLID) {
        Some(palette_color(5))
    } else {
        None
    }
}

/// The last completed frame. Frozen ticks keep showing it.
#[derive(Resource, Default)]
pub struct DrawList {
    pub frame: Recorder,
    /// Grid revision the tile layer was built from.
    pub tiles_revision: Option<u64>,
}

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DrawList::default()).add_systems(
            Update,
            (collect_frame, rebuild_tile_layer, sync_frame_entities).chain(),
        );
    }
}

fn collect_frame(world: Option<Res<World>>, mut list: ResMut<DrawList>) {
    let Some(world) = world else {
        return;
    };
    let mut frame = Recorder::default();
    if world.draw(&mut frame) {
        list.frame = frame;
    }
}

fn rebuild_tile_layer(
    mut commands: Commands,
    world: Option<Res<World>>,
    config: Res<GameConfig>,
    mut list: ResMut<DrawList>,
    tiles: Query<Entity, With<TileSprite>>,
) {
    let Some(world) = world else {
        return;
    };
    let grid = world.grid();
    if !config.show_tiles || list.tiles_revision == Some(grid.revision()) {
        return;
    }
    list.tiles_revision = Some(grid.revision());
    for entity in &tiles {
        commands.entity(entity).despawn();
    }
    let size = TILE_SIZE as f32 * config.pixel_scale;
    for cy in 0..ROOM_CELLS {
        for cx in 0..ROOM_CELLS {
            let Some(color) = tile_color(grid.flags().get(grid.tile_at(cx, cy))) else {
                continue;
            };
            let half = TILE_SIZE as f32 / 2.0;
            let at = config.to_world((cx * TILE_SIZE) as f32 + half, (cy * TILE_SIZE) as f32 + half);
            commands.spawn((
                TileSprite { cx, cy },
                Sprite {
                    color,
                    custom_size: Some(Vec2::splat(size)),
                    ..default()
                },
                Transform::from_xyz(at.x, at.y, 0.0),
            ));
        }
    }
}

/// Replace last frame's entities with the current draw list.
fn sync_frame_entities(
    mut commands: Commands,
    list: Res<DrawList>,
    config: Res<GameConfig>,
    mut clear: ResMut<ClearColor>,
    items: Query<Entity, With<FrameItem>>,
) {
    if !list.is_changed() {
        return;
    }
    for entity in &items {
        commands.entity(entity).despawn();
    }
    let scale = config.pixel_scale;
    for (order, call) in list.frame.draws.iter().enumerate() {
        let z = 1.0 + order as f32 * 0.001;
        match call {
            DrawCall::Sprite { id, x, y, layer, flip, .. } => {
                let at = config.to_world(*x as f32 + 4.0, *y as f32 + 4.0);
                commands.spawn((
                    FrameItem,
                    Sprite {
                        color: sprite_color(*id),
                        custom_size: Some(Vec2::splat(TILE_SIZE as f32 * scale)),
                        flip_x: flip.x,
                        flip_y: flip.y,
                        ..default()
                    },
                    Transform::from_xyz(at.x, at.y, z + f32::from(*layer)),
                ));
            }
            DrawCall::Rect { x, y, w, h, color } => {
                let Some(color) = color else {
                    continue;
                };
                let (w, h) = ((w * TILE_SIZE) as f32, (h * TILE_SIZE) as f32);
                let at = config.to_world((x * TILE_SIZE) as f32 + w / 2.0, (y * TILE_SIZE) as f32 + h / 2.0);
                commands.spawn((
                    FrameItem,
                    Sprite {
                        color: palette_color(*color),
                        custom_size: Some(Vec2::new(w * scale, h * scale)),
                        ..default()
                    },
                    Transform::from_xyz(at.x, at.y, z),
                ));
            }
            DrawCall::Text { text, x, y, color } => {
                let at = config.to_world(*x as f32, *y as f32);
                commands.spawn((
                    FrameItem,
                    Text2d::new(text.replace('#', "\n")),
                    TextFont {
                        font_size: 5.0 * scale,
                        ..default()
                    },
                    TextColor(palette_color(*color)),
                    bevy::sprite::Anchor::TopLeft,
                    Transform::from_xyz(at.x, at.y, z + 10.0),
                ));
            }
            DrawCall::Background { color } => {
                clear.0 = palette_color(*color);
            }
            DrawCall::Camera { .. } | DrawCall::Pal { .. } | DrawCall::PalReset { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Cartridge;
    use crate::save::MemorySaveStore;

    #[test]
    fn tile_colours_follow_flags() {
        assert_eq!(tile_color(TileFlags::empty()), None);
        assert_eq!(tile_color(TileFlags::SOLID), Some(palette_color(5)));
        assert_eq!(tile_color(TileFlags::SOLID | TileFlags::ICE), Some(palette_color(12)));
        assert_eq!(tile_color(TileFlags::SPIKE_UP), Some(palette_color(8)));
    }

    #[test]
    fn frame_list_skips_frozen_frames() {
        let mut world = World::new(Cartridge::demo(), Box::new(MemorySaveStore::default()), 1);
        world.boot();

        let mut app = App::new();
        app.insert_resource(world)
            .insert_resource(DrawList::default())
            .add_systems(Update, collect_frame);
        app.update();
        let drawn = app.world().resource::<DrawList>().frame.draws.len();
        assert!(drawn > 0);

        app.world_mut().resource_mut::<World>().freeze = 5;
        app.update();
        assert_eq!(app.world().resource::<DrawList>().frame.draws.len(), drawn);
    }

    #[test]
    fn tile_layer_rebuilds_only_on_revision_change() {
        let mut world = World::new(Cartridge::demo(), Box::new(MemorySaveStore::default()), 1);
        world.boot();

        let mut app = App::new();
        app.insert_resource(world)
            .insert_resource(GameConfig::default())
            .insert_resource(DrawList::default())
            .add_systems(Update, rebuild_tile_layer);
        app.update();

        let count = |app: &mut App| {
            let mut query = app.world_mut().query::<&TileSprite>();
            query.iter(app.world()).count()
        };
        let first = count(&mut app);
        assert!(first > 0);
        app.update();
        assert_eq!(count(&mut app), first);
    }
}
