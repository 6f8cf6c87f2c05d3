use crate::actor::{Actor, ActorKind, HasActor, Hitbox};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::math::turn_sin;
use crate::world::World;

pub const MAX_BALLOONS: usize = 6;
pub const BALLOON_SPRITE: u16 = 22;
const RESPAWN_TICKS: u8 = 60;

/// Floating refill for the dash charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Balloon {
    pub actor: Actor,
    pub offset: f32,
    pub start: f32,
    pub timer: u8,
}

impl Balloon {
    pub fn is_available(&self) -> bool {
        self.actor.spr == BALLOON_SPRITE
    }
}

impl HasActor for Balloon {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl World {
    pub(crate) fn add_balloon(&mut self, x: f32, y: f32) {
        if self.balloons.is_full() {
            return;
        }
        let offset = self.rng.rnd(1.0);
        self.balloons.spawn(Balloon {
            actor: Actor::new(ActorKind::Balloon, x, y).with_hitbox(Hitbox::new(-1, -1, 10, 10)),
            offset,
            start: y,
            timer: 0,
        });
    }

    pub(crate) fn update_balloon(&mut self, i: usize) {
        let max_djump = self.session.max_djump;
        let Some(balloon) = self.balloons.get_mut(i) else {
            return;
        };

        let mut popped = None;
        let mut respawned = None;
        if balloon.is_available() {
            balloon.offset += 0.01;
            balloon.actor.pos.y = balloon.start + turn_sin(balloon.offset) * 2.0;
            if let Some(p) = self.player.as_mut() {
                if p.djump < max_djump && balloon.actor.hits(&p.actor, 0, 0) {
                    p.djump = max_djump;
                    balloon.actor.spr = 0;
                    balloon.timer = RESPAWN_TICKS;
                    popped = Some(balloon.actor.pos);
                }
            }
        } else if balloon.timer > 0 {
            balloon.timer -= 1;
        } else {
            balloon.actor.spr = BALLOON_SPRITE;
            respawned = Some(balloon.actor.pos);
        }

        if let Some(at) = popped {
            self.psfx(6);
            self.spawn_smoke(at.x, at.y);
        }
        if let Some(at) = respawned {
            self.psfx(7);
            self.spawn_smoke(at.x, at.y);
        }
    }

    pub(crate) fn draw_balloons(&self, gfx: &mut dyn Graphics) {
        for (_, balloon) in self.balloons.iter() {
            if !balloon.is_available() {
                continue;
            }
            let (x, y) = (balloon.actor.px(), balloon.actor.py());
            let string = 13 + ((balloon.offset * 8.0) as i32 % 3) as u16;
            gfx.spr(BALLOON_SPRITE, x, y, 1, PaletteMask::empty(), SpriteFlip::default());
            gfx.spr(string, x, y + 6, 1, PaletteMask::empty(), SpriteFlip::default());
        }
    }
}
