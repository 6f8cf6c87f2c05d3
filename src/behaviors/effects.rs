use bevy::log::debug;
use bevy::math::Vec2;

use crate::actor::{Actor, ActorKind};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::math::{turn_sin, Rng};
use crate::motion;
use crate::world::World;

pub const MAX_SMOKE: usize = 10;
pub const MAX_DEAD_PARTICLES: usize = 8;
pub const MAX_PARTICLES: usize = 24;
pub const MAX_HAIR: usize = 5;

const SMOKE_LAST_FRAME: u16 = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeadParticle {
    pub pos: Vec2,
    pub spd: Vec2,
    pub t: u8,
}

/// Drifting background speck.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub size: u16,
    pub spd: f32,
    pub off: f32,
    pub color: u8,
}

impl Particle {
    pub fn new(rng: &mut Rng) -> Self {
        let x = rng.rndi(128) as f32;
        let y = rng.rndi(128) as f32;
        let size = u16::from(rng.rndi(3) < 1);
        let spd = 0.25 + rng.rndi(5) as f32;
        let off = rng.rnd(1.0);
        let color = 6 + (0.5 + rng.rnd(1.0)).floor() as u8;
        Self {
            pos: Vec2::new(x, y),
            size,
            spd,
            off,
            color,
        }
    }

    pub fn advance(&mut self, rng: &mut Rng) {
        self.pos.x += self.spd;
        self.pos.y += turn_sin(self.off);
        self.off += (self.spd / 32.0).min(0.05);
        if self.pos.x > 132.0 {
            self.pos.x = -4.0;
            self.pos.y = rng.rndi(128) as f32;
        }
    }

    pub fn draw(&self, gfx: &mut dyn Graphics) {
        gfx.spr(
            128 + self.size,
            self.pos.x as i32,
            self.pos.y as i32,
            1,
            PaletteMask::empty(),
            SpriteFlip::default(),
        );
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HairSegment {
    pub pos: Vec2,
    pub size: u8,
}

/// Trailing hair that eases toward the player's head.
#[derive(Clone, Debug, PartialEq)]
pub struct Hair {
    pub segments: [HairSegment; MAX_HAIR],
}

impl Default for Hair {
    fn default() -> Self {
        let mut hair = Self {
            segments: [HairSegment::default(); MAX_HAIR],
        };
        hair.reset(Vec2::ZERO);
        hair
    }
}

impl Hair {
    pub fn reset(&mut self, pos: Vec2) {
        for (i, seg) in self.segments.iter_mut().enumerate() {
            seg.pos = pos;
            seg.size = (4 - i as i32).clamp(1, 3) as u8;
        }
    }

    pub fn follow(&mut self, head: Vec2, facing: f32, ducking: bool) {
        let mut last = Vec2::new(
            head.x + 4.0 - facing * 2.0,
            head.y + if ducking { 4.0 } else { 3.0 },
        );
        for seg in &mut self.segments {
            seg.pos.x += (last.x - seg.pos.x) / 1.5;
            seg.pos.y += (last.y + 0.5 - seg.pos.y) / 1.5;
            last = seg.pos;
        }
    }

    pub fn draw(&self, gfx: &mut dyn Graphics) {
        for seg in &self.segments {
            gfx.spr(
                131 + u16::from(seg.size),
                seg.pos.x as i32 - 3,
                seg.pos.y as i32 - 3,
                1,
                PaletteMask::PLAYER,
                SpriteFlip::default(),
            );
        }
    }
}

/// Floating "1000" shown when fruit is collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifeup {
    pub pos: Vec2,
    pub duration: u8,
    pub flash: u8,
}

impl World {
    pub(crate) fn spawn_smoke(&mut self, x: f32, y: f32) {
        if self.smoke.is_full() {
            debug!("[Summit world] Smoke pool full, dropping puff");
            return;
        }
        let mut puff = Actor::new(ActorKind::Smoke, x, y);
        puff.spd = Vec2::new(0.3 + self.rng.rnd(0.2), -0.1);
        puff.pos.x += (-1 + self.rng.rndi(2)) as f32;
        puff.pos.y += (-1 + self.rng.rndi(2)) as f32;
        puff.flip = SpriteFlip {
            x: self.rng.maybe(),
            y: self.rng.maybe(),
        };
        puff.solids = false;
        self.smoke.spawn(puff);
    }

    pub(crate) fn update_smoke(&mut self) {
        let advance = self.frames() % 5 == 0;
        for i in 0..MAX_SMOKE {
            let Some(puff) = self.smoke.get_mut(i) else {
                continue;
            };
            let spd = puff.spd;
            motion::move_actor(puff, &self.grid, spd.x, spd.y);
            if advance {
                puff.spr += 1;
                if puff.spr >= SMOKE_LAST_FRAME {
                    self.smoke.remove(i);
                }
            }
        }
    }

    pub(crate) fn draw_smoke(&self, gfx: &mut dyn Graphics) {
        for (_, puff) in self.smoke.iter() {
            draw_actor(gfx, puff);
        }
    }

    pub(crate) fn update_dead_particles(&mut self) {
        for i in 0..MAX_DEAD_PARTICLES {
            let Some(p) = self.dead_particles.get_mut(i) else {
                continue;
            };
            p.pos += p.spd;
            p.t = p.t.saturating_sub(1);
            if p.t == 0 {
                self.dead_particles.remove(i);
            }
        }
    }

    pub(crate) fn draw_dead_particles(&self, gfx: &mut dyn Graphics) {
        for (_, p) in self.dead_particles.iter() {
            gfx.pal(7, 14 + p.t % 2, PaletteMask::PLAYER);
            gfx.spr(
                128 + u16::from((p.t / 2).min(3)),
                p.pos.x as i32 - 4,
                p.pos.y as i32 - 4,
                1,
                PaletteMask::PLAYER,
                SpriteFlip::default(),
            );
        }
    }

    pub(crate) fn lifeup_init(&mut self, x: f32, y: f32) {
        self.lifeup = Some(Lifeup {
            pos: Vec2::new(x - 8.0, y - 4.0),
            duration: 30,
            flash: 0,
        });
    }

    pub(crate) fn update_lifeup(&mut self) {
        let blink = self.frames() % 2 == 0;
        let Some(lifeup) = self.lifeup.as_mut() else {
            return;
        };
        lifeup.pos.y -= 0.25;
        lifeup.duration = lifeup.duration.saturating_sub(1);
        if lifeup.duration == 0 {
            self.lifeup = None;
        } else if blink {
            lifeup.flash = lifeup.flash.wrapping_add(1);
        }
    }

    pub(crate) fn draw_lifeup(&self, gfx: &mut dyn Graphics) {
        if let Some(lifeup) = &self.lifeup {
            gfx.print(
                "1000",
                lifeup.pos.x as i32,
                lifeup.pos.y as i32,
                7 + lifeup.flash % 2,
            );
        }
    }
}

/// Plain one-sprite draw of an actor.
pub fn draw_actor(gfx: &mut dyn Graphics, actor: &Actor) {
    gfx.spr(
        actor.spr,
        actor.px(),
        actor.py(),
        1,
        PaletteMask::empty(),
        actor.flip,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hair_sizes_taper() {
        let hair = Hair::default();
        let sizes: Vec<u8> = hair.segments.iter().map(|s| s.size).collect();
        assert_eq!(sizes, vec![3, 3, 2, 1, 1]);
    }

    #[test]
    fn hair_eases_toward_head() {
        let mut hair = Hair::default();
        hair.reset(Vec2::new(0.0, 0.0));
        hair.follow(Vec2::new(30.0, 0.0), 1.0, false);
        let first = hair.segments[0].pos;
        assert!(first.x > 0.0 && first.x < 32.0);
        assert!(hair.segments[4].pos.x < first.x);
    }

    #[test]
    fn particles_wrap_to_left_edge() {
        let mut rng = Rng::new(3);
        let mut p = Particle::new(&mut rng);
        p.pos.x = 132.0;
        p.spd = 1.0;
        p.advance(&mut rng);
        assert_eq!(p.pos.x, -4.0);
        assert!((0.0..128.0).contains(&p.pos.y));
    }
}
