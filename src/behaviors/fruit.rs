use bevy::log::info;

use crate::actor::{Actor, ActorKind};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::math::{appr, sign, turn_sin};
use crate::motion;
use crate::world::World;

use super::effects::draw_actor;

/// Bobbing strawberry worth one collectible slot per level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fruit {
    pub actor: Actor,
    pub start: f32,
    pub off: u32,
}

/// Winged strawberry that takes off once the player dashes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyFruit {
    pub actor: Actor,
    pub start: f32,
    pub fly: bool,
    pub step: f32,
    pub sfx_delay: u8,
}

impl World {
    pub(crate) fn fruit_init(&mut self, x: f32, y: f32) {
        if self.session.has_fruit() {
            self.fruit = None;
            return;
        }
        self.fruit = Some(Fruit {
            actor: Actor::new(ActorKind::Fruit, x, y),
            start: y,
            off: 0,
        });
    }

    pub(crate) fn fly_fruit_init(&mut self, x: f32, y: f32) {
        if self.session.has_fruit() {
            self.fly_fruit = None;
            return;
        }
        let mut actor = Actor::new(ActorKind::FlyFruit, x, y);
        actor.solids = false;
        self.fly_fruit = Some(FlyFruit {
            actor,
            start: y,
            fly: false,
            step: 0.5,
            sfx_delay: 8,
        });
    }

    /// Refill dash, mark the level's fruit, and pop the score.
    fn collect_fruit(&mut self, at: &Actor) {
        let max_djump = self.session.max_djump;
        if let Some(p) = self.player.as_mut() {
            p.djump = max_djump;
        }
        self.sfx_timer = 20;
        self.sfx(13);
        self.session.collect_fruit();
        self.lifeup_init(at.pos.x, at.pos.y);
        info!(
            "[Summit world] Fruit collected in level {} ({} total)",
            self.session.room.index(),
            self.session.fruit_count()
        );
    }

    pub(crate) fn update_fruit(&mut self) {
        let Some(fruit) = self.fruit else {
            return;
        };
        if self.touches_player(&fruit.actor, 0, 0) {
            self.collect_fruit(&fruit.actor);
            self.fruit = None;
            return;
        }
        if let Some(fruit) = self.fruit.as_mut() {
            fruit.off = fruit.off.wrapping_add(1);
            fruit.actor.pos.y = fruit.start + turn_sin(fruit.off as f32 / 40.0) * 2.5;
        }
    }

    pub(crate) fn update_fly_fruit(&mut self) {
        let has_dashed = self.has_dashed;
        let Some(fruit) = self.fly_fruit.as_mut() else {
            return;
        };
        let spd = fruit.actor.spd;
        motion::move_actor(&mut fruit.actor, &self.grid, spd.x, spd.y);

        let mut flew_sfx = false;
        if fruit.fly {
            if fruit.sfx_delay > 0 {
                fruit.sfx_delay -= 1;
                flew_sfx = fruit.sfx_delay == 0;
            }
            fruit.actor.spd.y = appr(fruit.actor.spd.y, -3.5, 0.25);
        } else {
            if has_dashed {
                fruit.fly = true;
            }
            fruit.step += 0.05;
            fruit.actor.spd.y = turn_sin(fruit.step) * 0.5;
        }
        let gone = fruit.fly && fruit.actor.pos.y < -16.0;
        let actor = fruit.actor;

        if flew_sfx {
            self.sfx_timer = 20;
            self.sfx(14);
        }
        if gone {
            self.fly_fruit = None;
            return;
        }
        if self.touches_player(&actor, 0, 0) {
            self.collect_fruit(&actor);
            self.fly_fruit = None;
        }
    }

    pub(crate) fn draw_fruit(&self, gfx: &mut dyn Graphics) {
        if let Some(fruit) = &self.fruit {
            draw_actor(gfx, &fruit.actor);
        }
    }

    pub(crate) fn draw_fly_fruit(&self, gfx: &mut dyn Graphics) {
        let Some(fruit) = &self.fly_fruit else {
            return;
        };
        let mut wing = 0;
        if !fruit.fly && turn_sin(fruit.step) < 0.0 {
            wing = 1 + sign(fruit.actor.pos.y - fruit.start).max(0.0) as u16;
        }
        let (x, y) = (fruit.actor.px(), fruit.actor.py());
        gfx.spr(45 + wing, x - 6, y - 2, 1, PaletteMask::empty(), SpriteFlip { x: true, y: false });
        draw_actor(gfx, &fruit.actor);
        gfx.spr(45 + wing, x + 6, y - 2, 1, PaletteMask::empty(), SpriteFlip::default());
    }
}
