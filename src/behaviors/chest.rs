use bevy::log::info;
use bevy::math::Vec2;

use crate::actor::{Actor, ActorKind, Hitbox};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::math::{appr, turn_cos, turn_sin};
use crate::motion;
use crate::world::World;

use super::effects::draw_actor;

pub const BIG_CHEST_PARTICLES: usize = 50;

/// Spinning key that unlocks the level's chest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key {
    pub actor: Actor,
    /// Animation phase, integer part is the sprite.
    pub phase: f32,
}

impl Key {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            actor: Actor::new(ActorKind::Key, x, y),
            phase: 0.0,
        }
    }
}

/// Locked chest holding the level's fruit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chest {
    pub actor: Actor,
    pub start: f32,
    pub timer: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BigChestState {
    Closed,
    Opening,
    Open,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightBeam {
    pub x: f32,
    pub y: f32,
    pub h: i32,
    pub spd: f32,
}

/// Summit chest that grants the second dash charge through its orb.
#[derive(Clone, Debug, PartialEq)]
pub struct BigChest {
    pub actor: Actor,
    pub state: BigChestState,
    pub timer: u8,
    pub beams: [Option<LightBeam>; BIG_CHEST_PARTICLES],
}

impl BigChest {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            actor: Actor::new(ActorKind::BigChest, x, y).with_hitbox(Hitbox::new(0, 0, 16, 16)),
            state: BigChestState::Closed,
            timer: 0,
            beams: [None; BIG_CHEST_PARTICLES],
        }
    }
}

impl World {
    pub(crate) fn chest_init(&mut self, x: f32, y: f32) {
        if self.session.has_fruit() {
            self.chest = None;
            return;
        }
        self.chest = Some(Chest {
            actor: Actor::new(ActorKind::Chest, x, y),
            start: x,
            timer: 20,
        });
    }

    pub(crate) fn update_key(&mut self) {
        let frames = self.frames();
        let Some(key) = self.key.as_mut() else {
            return;
        };
        let was = key.phase.floor() as u16;
        key.phase = 9.0 + turn_sin(f32::from(frames) / 30.0) + 0.5;
        let is = key.phase.floor() as u16;
        key.actor.spr = is;
        if is == 10 && is != was {
            key.actor.flip.x = !key.actor.flip.x;
        }
        let actor = key.actor;
        if self.touches_player(&actor, 0, 0) {
            self.sfx(23);
            self.sfx_timer = 10;
            self.key = None;
            self.has_key = true;
        }
    }

    pub(crate) fn update_chest(&mut self) {
        if !self.has_key {
            return;
        }
        let jitter = self.rng.rnd(3.0);
        let Some(chest) = self.chest.as_mut() else {
            return;
        };
        chest.timer = chest.timer.saturating_sub(1);
        chest.actor.pos.x = chest.start - 1.0 + jitter;
        if chest.timer == 0 {
            let at = chest.actor.pos;
            self.sfx_timer = 20;
            self.sfx(16);
            self.fruit_init(at.x, at.y - 4.0);
            self.chest = None;
        }
    }

    pub(crate) fn draw_key(&self, gfx: &mut dyn Graphics) {
        if let Some(key) = &self.key {
            draw_actor(gfx, &key.actor);
        }
    }

    pub(crate) fn draw_chest(&self, gfx: &mut dyn Graphics) {
        if let Some(chest) = &self.chest {
            draw_actor(gfx, &chest.actor);
        }
    }

    fn orb_init(&mut self, x: f32, y: f32) {
        let mut orb = Actor::new(ActorKind::Orb, x, y);
        orb.spd.y = -4.0;
        orb.solids = false;
        self.orb = Some(orb);
    }

    /// Rise, settle, and wait to be touched.
    pub(crate) fn update_orb(&mut self) {
        let Some(orb) = self.orb.as_mut() else {
            return;
        };
        let spd = orb.spd;
        motion::move_actor(orb, &self.grid, spd.x, spd.y);
        orb.spd.y = appr(orb.spd.y, 0.0, 0.5);
        let orb = *orb;
        if orb.spd.y != 0.0 || !self.touches_player(&orb, 0, 0) {
            return;
        }
        self.music_timer = 45;
        self.sfx(51);
        self.freeze = 10;
        self.shake = 10;
        self.orb = None;
        self.session.max_djump = 2;
        if let Some(p) = self.player.as_mut() {
            p.djump = 2;
        }
        info!("[Summit world] Orb collected, dash charges now 2");
    }

    pub(crate) fn draw_orb(&self, gfx: &mut dyn Graphics) {
        let Some(orb) = &self.orb else {
            return;
        };
        gfx.spr(102, orb.px(), orb.py(), 1, PaletteMask::empty(), SpriteFlip::default());
        let off = f32::from(self.frames()) / 30.0;
        for i in 0..8 {
            let t = off + i as f32 / 8.0;
            gfx.spr(
                140,
                (orb.pos.x + 1.0 + turn_cos(t) * 8.0) as i32,
                (orb.pos.y + 1.0 + turn_sin(t) * 8.0) as i32,
                1,
                PaletteMask::empty(),
                SpriteFlip::default(),
            );
        }
    }

    pub(crate) fn update_big_chest(&mut self) {
        let Some(state) = self.big_chest.as_ref().map(|c| c.state) else {
            return;
        };
        match state {
            BigChestState::Closed => self.try_open_big_chest(),
            BigChestState::Opening => self.advance_big_chest(),
            BigChestState::Open => {}
        }
    }

    fn try_open_big_chest(&mut self) {
        let Some(chest) = self.big_chest.as_ref().map(|c| c.actor) else {
            return;
        };
        let Some(p) = self.player.as_ref() else {
            return;
        };
        if !chest.hits(&p.actor, 0, 0) || !self.is_solid_for(&p.actor, 0, 1) {
            return;
        }
        self.music(None, 500, 7);
        self.sfx(37);
        self.pause_player = true;
        if let Some(p) = self.player.as_mut() {
            p.actor.spd = Vec2::ZERO;
        }
        if let Some(big) = self.big_chest.as_mut() {
            big.state = BigChestState::Opening;
            big.timer = 60;
        }
        self.spawn_smoke(chest.pos.x, chest.pos.y);
        self.spawn_smoke(chest.pos.x + 8.0, chest.pos.y);
        info!("[Summit world] Big chest opening");
    }

    fn advance_big_chest(&mut self) {
        let beam_x = self.rng.rndi(14);
        let beam_h = self.rng.rndi(32);
        let beam_spd = self.rng.rndi(8);
        let Some(big) = self.big_chest.as_mut() else {
            return;
        };
        big.timer = big.timer.saturating_sub(1);
        self.shake = 5;
        self.flash_bg = true;
        let at = big.actor.pos;
        if big.timer <= 45 {
            if let Some(slot) = big.beams.iter_mut().find(|b| b.is_none()) {
                *slot = Some(LightBeam {
                    x: at.x + 1.0 + beam_x as f32,
                    y: at.y + 8.0,
                    h: 32 + beam_h,
                    spd: (8 + beam_spd) as f32,
                });
            }
        }
        for slot in big.beams.iter_mut() {
            if let Some(beam) = slot {
                beam.y -= beam.spd;
                if beam.y < 0.0 {
                    *slot = None;
                }
            }
        }
        if big.timer == 0 {
            big.state = BigChestState::Open;
            self.flash_bg = false;
            self.new_bg = true;
            self.pause_player = false;
            self.orb_init(at.x + 4.0, at.y + 4.0);
        }
    }

    pub(crate) fn draw_big_chest(&self, gfx: &mut dyn Graphics) {
        let Some(big) = &self.big_chest else {
            return;
        };
        let (x, y) = (big.actor.px(), big.actor.py());
        let plain = PaletteMask::empty();
        let flip = SpriteFlip::default();
        match big.state {
            BigChestState::Closed => {
                gfx.spr(96, x, y, 1, plain, flip);
                gfx.spr(97, x + 8, y, 1, plain, flip);
            }
            BigChestState::Opening => {
                for beam in big.beams.iter().flatten() {
                    for step in 0..4 {
                        gfx.spr(139, beam.x as i32, beam.y as i32 - step * 8, 1, plain, flip);
                    }
                }
            }
            BigChestState::Open => {}
        }
        gfx.spr(112, x, y + 8, 1, plain, flip);
        gfx.spr(113, x + 8, y + 8, 1, plain, flip);
    }
}
