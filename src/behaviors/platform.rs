use crate::actor::{Actor, ActorKind, HasActor};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::motion::{self, Terrain};
use crate::world::World;

pub const MAX_PLATFORMS: usize = 10;
pub const PLATFORM_SPEED: f32 = 0.65;

/// Two-tile ledge drifting sideways, wrapping around the room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    pub actor: Actor,
    /// Position before the latest step, to detect pixel crossings.
    pub last: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32, dir: i32) -> Self {
        let mut actor = Actor::new(ActorKind::Platform, x - 4.0, y);
        actor.solids = false;
        actor.hitbox.w = 16;
        actor.spd.x = dir as f32 * PLATFORM_SPEED;
        Self {
            last: actor.pos.x,
            actor,
        }
    }

    /// Is `rider` standing on top of this platform?
    pub fn supports(&self, rider: &Actor) -> bool {
        let feet = rider.pos.y + (rider.hitbox.y + rider.hitbox.h) as f32;
        let left = rider.pos.x + rider.hitbox.x as f32;
        let right = left + rider.hitbox.w as f32;
        feet == self.actor.pos.y
            && left < self.actor.pos.x + self.actor.hitbox.w as f32
            && right > self.actor.pos.x
    }
}

impl HasActor for Platform {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl World {
    pub(crate) fn add_platform(&mut self, x: f32, y: f32, dir: i32) {
        self.platforms.spawn(Platform::new(x, y, dir));
    }

    /// Step a platform and carry a standing player by whole pixels.
    pub(crate) fn update_platform(&mut self, i: usize) {
        let Some(platform) = self.platforms.get_mut(i) else {
            return;
        };
        let last = platform.last;
        platform.actor.pos.x += platform.actor.spd.x;
        if platform.actor.pos.x < -16.0 {
            platform.actor.pos.x = 128.0;
        } else if platform.actor.pos.x > 128.0 {
            platform.actor.pos.x = -16.0;
        }
        let before = *platform;
        platform.last = platform.actor.pos.x;

        let delta = before.actor.pos.x.floor() - last.floor();
        if delta == 0.0 {
            return;
        }
        let Some(p) = self.player.as_mut() else {
            return;
        };
        if p.actor.spd.y >= 0.0 && before.supports(&p.actor) {
            let terrain = Terrain::new(&self.grid, self.fake_wall.as_ref(), &self.platforms);
            motion::move_x(&mut p.actor, &terrain, delta as i32);
        }
    }

    pub(crate) fn draw_platforms(&self, gfx: &mut dyn Graphics) {
        for (_, platform) in self.platforms.iter() {
            let (x, y) = (platform.actor.px(), platform.actor.py() - 1);
            gfx.spr(11, x, y, 1, PaletteMask::empty(), SpriteFlip::default());
            gfx.spr(12, x + 8, y, 1, PaletteMask::empty(), SpriteFlip::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Hitbox;

    #[test]
    fn spawn_offsets_and_direction() {
        let left = Platform::new(40.0, 16.0, -1);
        assert_eq!(left.actor.pos.x, 36.0);
        assert_eq!(left.actor.spd.x, -PLATFORM_SPEED);
        assert!(!left.actor.solids);
        assert_eq!(left.actor.hitbox.w, 16);
    }

    #[test]
    fn supports_requires_feet_on_top() {
        let platform = Platform::new(20.0, 64.0, 1);
        let rider = Actor::new(ActorKind::Player, 20.0, 56.0).with_hitbox(Hitbox::new(1, 3, 6, 5));
        assert!(platform.supports(&rider));
        let mut above = rider;
        above.pos.y = 55.0;
        assert!(!platform.supports(&above));
    }
}
