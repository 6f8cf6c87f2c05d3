use crate::actor::{Actor, ActorKind, Hitbox};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::math::sign;
use crate::world::World;

const WALL_HITBOX: Hitbox = Hitbox::new(0, 0, 16, 16);
/// Reach while the player is dashing, one pixel past each edge.
const DASH_HITBOX: Hitbox = Hitbox::new(-1, -1, 18, 18);

impl World {
    /// A 2x2 cracked block hiding the level's fruit. Skipped once the fruit
    /// is collected.
    pub(crate) fn fake_wall_init(&mut self, x: f32, y: f32) {
        if self.session.has_fruit() {
            self.fake_wall = None;
            return;
        }
        self.fake_wall = Some(Actor::new(ActorKind::FakeWall, x, y).with_hitbox(WALL_HITBOX));
    }

    pub(crate) fn update_fake_wall(&mut self) {
        let Some(wall) = self.fake_wall else {
            return;
        };
        let Some(p) = self.player.as_mut() else {
            return;
        };
        if p.dash_effect_time == 0 {
            return;
        }
        let reach = wall.with_hitbox(DASH_HITBOX);
        if !reach.hits(&p.actor, 0, 0) {
            return;
        }

        p.actor.spd.x = -sign(p.actor.spd.x) * 1.5;
        p.actor.spd.y = -1.5;
        p.dash_time = 0;
        self.sfx_timer = 20;
        self.sfx(16);
        self.fake_wall = None;
        let (x, y) = (wall.pos.x, wall.pos.y);
        self.spawn_smoke(x, y);
        self.spawn_smoke(x + 8.0, y);
        self.spawn_smoke(x, y + 8.0);
        self.spawn_smoke(x + 4.0, y + 4.0);
        self.fruit_init(x + 4.0, y + 4.0);
    }

    pub(crate) fn draw_fake_wall(&self, gfx: &mut dyn Graphics) {
        let Some(wall) = &self.fake_wall else {
            return;
        };
        let (x, y) = (wall.px(), wall.py());
        for (id, dx, dy) in [(64, 0, 0), (65, 8, 0), (80, 0, 8), (81, 8, 8)] {
            gfx.spr(id, x + dx, y + dy, 1, PaletteMask::empty(), SpriteFlip::default());
        }
    }
}
