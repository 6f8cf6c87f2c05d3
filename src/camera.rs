use bevy::prelude::*;

use crate::components::{GameConfig, HeadlessMode};
use crate::world::World;

#[derive(Component)]
pub struct MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, follow_world_camera);
    }
}

fn spawn_camera(mut commands: Commands, headless: Res<HeadlessMode>) {
    if headless.0 {
        return;
    }
    commands.spawn((MainCamera, Camera2d, Transform::from_xyz(0.0, 0.0, 100.0)));
}

/// The world's camera offset moves drawn content by `-offset`, so the view
/// moves by `+offset` in room pixels. Room y grows downward.
pub fn camera_translation(offset: (i32, i32), pixel_scale: f32) -> Vec2 {
    Vec2::new(offset.0 as f32 * pixel_scale, -(offset.1 as f32) * pixel_scale)
}

/// Apply screen shake from the simulation.
fn follow_world_camera(
    world: Option<Res<World>>,
    config: Res<GameConfig>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(world) = world else {
        return;
    };
    let Ok(mut cam_transform) = camera_query.get_single_mut() else {
        return;
    };
    let at = camera_translation(world.camera(), config.pixel_scale);
    cam_transform.translation.x = at.x;
    cam_transform.translation.y = at.y;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Cartridge;
    use crate::save::MemorySaveStore;

    #[test]
    fn offset_flips_vertical_axis() {
        assert_eq!(camera_translation((0, 0), 4.0), Vec2::ZERO);
        assert_eq!(camera_translation((-3, 2), 4.0), Vec2::new(-12.0, -8.0));
    }

    #[test]
    fn camera_tracks_world_shake() {
        let mut world = World::new(Cartridge::blank(), Box::new(MemorySaveStore::default()), 1);
        world.camera = (2, -1);

        let mut app = App::new();
        app.insert_resource(world)
            .insert_resource(GameConfig::default())
            .add_systems(Update, follow_world_camera);
        let camera = app
            .world_mut()
            .spawn((MainCamera, Transform::from_xyz(0.0, 0.0, 100.0)))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(camera).expect("transform");
        assert_eq!(transform.translation, Vec3::new(8.0, 4.0, 100.0));
    }
}
