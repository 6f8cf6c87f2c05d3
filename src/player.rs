use bevy::log::debug;
use bevy::math::Vec2;

use crate::actor::{Actor, ActorKind, Hitbox};
use crate::behaviors::effects::DeadParticle;
use crate::cartridge::SUMMIT_INDEX;
use crate::host::{Button, Graphics, PaletteMask, SpriteFlip};
use crate::math::{appr, sign, turn_cos, turn_sin, DIAGONAL};
use crate::motion::{self, Terrain};
use crate::world::World;

pub const PLAYER_HITBOX: Hitbox = Hitbox::new(1, 3, 6, 5);
pub const MAX_RUN: f32 = 1.0;
pub const GRAVITY: f32 = 0.21;
pub const MAX_FALL: f32 = 2.0;
pub const WALL_SLIDE_FALL: f32 = 0.4;
pub const JUMP_SPEED: f32 = -2.0;
pub const DASH_SPEED: f32 = 5.0;
/// Ticks of coyote time after leaving the ground.
pub const GRACE_TICKS: u8 = 6;
/// Ticks a jump press is remembered before landing.
pub const JUMP_BUFFER_TICKS: u8 = 4;
pub const DASH_TICKS: u8 = 4;
pub const DASH_EFFECT_TICKS: u8 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub actor: Actor,
    pub p_jump: bool,
    pub p_dash: bool,
    pub grace: u8,
    pub jbuffer: u8,
    pub djump: u8,
    pub dash_time: u8,
    pub dash_effect_time: u8,
    pub dash_target: Vec2,
    pub dash_accel: Vec2,
    pub spr_off: u8,
    pub was_on_ground: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, max_djump: u8) -> Self {
        Self {
            actor: Actor::new(ActorKind::Player, x, y).with_hitbox(PLAYER_HITBOX),
            p_jump: false,
            p_dash: false,
            grace: 0,
            jbuffer: 0,
            djump: max_djump,
            dash_time: 0,
            dash_effect_time: 0,
            dash_target: Vec2::ZERO,
            dash_accel: Vec2::ZERO,
            spr_off: 0,
            was_on_ground: false,
        }
    }

    pub fn facing(&self) -> f32 {
        if self.actor.flip.x {
            -1.0
        } else {
            1.0
        }
    }
}

/// Launch velocity for a dash held in `(ix, iy)`. No direction dashes
/// the way the player faces.
pub fn dash_velocity(ix: i32, iy: i32, facing: f32) -> Vec2 {
    let (x, y) = (ix as f32, iy as f32);
    match (ix != 0, iy != 0) {
        (true, true) => Vec2::new(x * DASH_SPEED * DIAGONAL, y * DASH_SPEED * DIAGONAL),
        (true, false) => Vec2::new(x * DASH_SPEED, 0.0),
        (false, true) => Vec2::new(0.0, y * DASH_SPEED),
        (false, false) => Vec2::new(facing, 0.0),
    }
}

/// Speed a dash settles toward, and the per-tick approach rate.
pub fn dash_settle(spd: Vec2) -> (Vec2, Vec2) {
    let mut target = Vec2::new(2.0 * sign(spd.x), 2.0 * sign(spd.y));
    let mut accel = Vec2::splat(1.5);
    if spd.y < 0.0 {
        target.y *= 0.75;
    }
    if spd.y != 0.0 {
        accel.x *= DIAGONAL;
    }
    if spd.x != 0.0 {
        accel.y *= DIAGONAL;
    }
    (target, accel)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnState {
    Rising,
    Falling,
    Landing,
}

/// The player flying up from below the screen into the room.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSpawn {
    pub pos: Vec2,
    pub target: Vec2,
    pub spd_y: f32,
    pub state: SpawnState,
    pub delay: u8,
    pub spr: u16,
}

impl World {
    pub(crate) fn player_spawn_init(&mut self, cx: i32, cy: i32) {
        self.sfx(4);
        let target = Vec2::new((cx * 8) as f32, (cy * 8) as f32);
        let pos = Vec2::new(target.x, 128.0);
        self.hair.reset(pos);
        self.player_spawn = Some(PlayerSpawn {
            pos,
            target,
            spd_y: -4.0,
            state: SpawnState::Rising,
            delay: 0,
            spr: ActorKind::PlayerSpawn.initial_sprite(),
        });
    }

    /// Place a controllable player directly, skipping the spawn sequence.
    pub fn spawn_player(&mut self, x: f32, y: f32) {
        self.player_spawn = None;
        self.player = Some(Player::new(x, y, self.session.max_djump));
        self.hair.reset(Vec2::new(x, y));
    }

    pub(crate) fn update_player_spawn(&mut self) {
        let Some(spawn) = self.player_spawn.as_mut() else {
            return;
        };
        match spawn.state {
            SpawnState::Rising => {
                spawn.pos.y += spawn.spd_y;
                if spawn.pos.y < spawn.target.y + 16.0 {
                    spawn.state = SpawnState::Falling;
                    spawn.delay = 3;
                }
            }
            SpawnState::Falling => {
                spawn.spd_y += 0.5;
                spawn.pos.y += spawn.spd_y;
                if spawn.spd_y > 0.0 && spawn.delay > 0 {
                    spawn.spd_y = 0.0;
                    spawn.delay -= 1;
                }
                if spawn.spd_y > 0.0 && spawn.pos.y > spawn.target.y {
                    spawn.pos.y = spawn.target.y;
                    spawn.spd_y = 0.0;
                    spawn.state = SpawnState::Landing;
                    spawn.delay = 5;
                    let at = spawn.pos;
                    self.shake = 5;
                    self.spawn_smoke(at.x, at.y + 4.0);
                    self.sfx(5);
                }
            }
            SpawnState::Landing => {
                spawn.delay = spawn.delay.saturating_sub(1);
                spawn.spr = 6;
                if spawn.delay == 0 {
                    let at = spawn.pos;
                    self.player_spawn = None;
                    self.player = Some(Player::new(at.x, at.y, self.session.max_djump));
                    self.hair.reset(at);
                }
            }
        }
    }

    pub(crate) fn move_player(&mut self) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let terrain = Terrain::new(&self.grid, self.fake_wall.as_ref(), &self.platforms);
        let spd = player.actor.spd;
        motion::move_actor(&mut player.actor, &terrain, spd.x, spd.y);
    }

    pub(crate) fn update_player(&mut self) {
        if self.pause_player {
            return;
        }
        let Some(mut p) = self.player.take() else {
            return;
        };
        let input = self.input;
        let ix = input.axis_x();
        let dir = ix as f32;

        let (x, y, w, h) = motion::pixel_bounds(&p.actor, 0, 0);
        if self.grid.spikes_at(x, y, w, h, p.actor.spd.x, p.actor.spd.y) || p.actor.pos.y > 128.0 {
            self.kill_player(&p);
            return;
        }

        let on_ground = self.is_solid_for(&p.actor, 0, 1);
        let on_ice = self.is_ice_for(&p.actor, 0, 1);

        if on_ground && !p.was_on_ground {
            self.spawn_smoke(p.actor.pos.x, p.actor.pos.y + 4.0);
        }

        let jump = input.held(Button::Jump) && !p.p_jump;
        p.p_jump = input.held(Button::Jump);
        if jump {
            p.jbuffer = JUMP_BUFFER_TICKS;
        } else if p.jbuffer > 0 {
            p.jbuffer -= 1;
        }

        let dash = input.held(Button::Dash) && !p.p_dash;
        p.p_dash = input.held(Button::Dash);

        if on_ground {
            p.grace = GRACE_TICKS;
            if p.djump < self.session.max_djump {
                self.psfx(54);
                p.djump = self.session.max_djump;
            }
        } else if p.grace > 0 {
            p.grace -= 1;
        }

        p.dash_effect_time = p.dash_effect_time.saturating_sub(1);

        if p.dash_time > 0 {
            self.spawn_smoke(p.actor.pos.x, p.actor.pos.y);
            p.dash_time -= 1;
            p.actor.spd.x = appr(p.actor.spd.x, p.dash_target.x, p.dash_accel.x);
            p.actor.spd.y = appr(p.actor.spd.y, p.dash_target.y, p.dash_accel.y);
        } else {
            let accel = if !on_ground {
                0.4
            } else if on_ice {
                0.05
            } else {
                0.6
            };
            let deccel = 0.15;

            if p.actor.spd.x.abs() > MAX_RUN {
                p.actor.spd.x = appr(p.actor.spd.x, sign(p.actor.spd.x) * MAX_RUN, deccel);
            } else {
                p.actor.spd.x = appr(p.actor.spd.x, dir * MAX_RUN, accel);
            }
            if p.actor.spd.x != 0.0 {
                p.actor.flip.x = p.actor.spd.x < 0.0;
            }

            let mut maxfall = MAX_FALL;
            let mut gravity = GRAVITY;
            if p.actor.spd.y.abs() <= 0.15 {
                gravity *= 0.5;
            }

            if ix != 0 && self.is_solid_for(&p.actor, ix, 0) && !self.is_ice_for(&p.actor, ix, 0) {
                maxfall = WALL_SLIDE_FALL;
                if self.rng.rndi(10) < 1 {
                    self.spawn_smoke(p.actor.pos.x + dir * 6.0, p.actor.pos.y);
                }
            }

            if !on_ground {
                p.actor.spd.y = appr(p.actor.spd.y, maxfall, gravity);
            }

            if p.jbuffer > 0 {
                if p.grace > 0 {
                    self.psfx(1);
                    p.jbuffer = 0;
                    p.grace = 0;
                    p.actor.spd.y = JUMP_SPEED;
                    self.spawn_smoke(p.actor.pos.x, p.actor.pos.y + 4.0);
                } else {
                    let wall_dir = i32::from(self.is_solid_for(&p.actor, 3, 0))
                        - i32::from(self.is_solid_for(&p.actor, -3, 0));
                    if wall_dir != 0 {
                        self.psfx(2);
                        p.jbuffer = 0;
                        p.actor.spd.y = JUMP_SPEED;
                        p.actor.spd.x = -(wall_dir as f32) * (MAX_RUN + 1.0);
                        if !self.is_ice_for(&p.actor, wall_dir * 3, 0) {
                            self.spawn_smoke(p.actor.pos.x + (wall_dir * 6) as f32, p.actor.pos.y);
                        }
                    }
                }
            }

            if p.djump > 0 && dash {
                self.spawn_smoke(p.actor.pos.x, p.actor.pos.y);
                p.djump -= 1;
                p.dash_time = DASH_TICKS;
                self.has_dashed = true;
                p.dash_effect_time = DASH_EFFECT_TICKS;

                p.actor.spd = dash_velocity(ix, input.axis_y(), p.facing());
                self.psfx(3);
                self.freeze = 2;
                self.shake = 6;
                let (target, accel) = dash_settle(p.actor.spd);
                p.dash_target = target;
                p.dash_accel = accel;
            } else if dash && p.djump == 0 {
                self.psfx(9);
                self.spawn_smoke(p.actor.pos.x, p.actor.pos.y);
            }
        }

        if self.frames() % 4 == 0 {
            p.spr_off = p.spr_off.wrapping_add(1);
        }
        p.actor.spr = if !on_ground {
            if self.is_solid_for(&p.actor, ix, 0) {
                5
            } else {
                3
            }
        } else if input.held(Button::Down) {
            6
        } else if input.held(Button::Up) {
            7
        } else if p.actor.spd.x == 0.0 || ix == 0 {
            1
        } else {
            1 + u16::from(p.spr_off % 4)
        };

        p.was_on_ground = on_ground;
        self.player = Some(p);
    }

    /// Remove the player, scatter death particles, and schedule the reload.
    pub(crate) fn kill_player(&mut self, p: &Player) {
        self.sfx_timer = 12;
        self.sfx(0);
        self.session.deaths = self.session.deaths.saturating_add(1);
        self.shake = 10;
        self.player = None;

        self.dead_particles.clear();
        let center = p.actor.pos + Vec2::splat(4.0);
        for dir in 0..8 {
            let angle = dir as f32 / 8.0;
            self.dead_particles.spawn(DeadParticle {
                pos: center,
                spd: Vec2::new(turn_sin(angle) * 3.0, turn_cos(angle) * 3.0),
                t: 10,
            });
        }
        debug!(
            "[Summit world] Player died in room ({}, {}), deaths {}",
            self.session.room.x, self.session.room.y, self.session.deaths
        );
        self.restart_room();
    }

    /// Screen clamp, hair follow, and the exit through the top of the room.
    pub(crate) fn late_update_player(&mut self) {
        let ducking = self.input.held(Button::Down);
        let Some(p) = self.player.as_mut() else {
            return;
        };
        if p.actor.pos.x < -1.0 || p.actor.pos.x > 121.0 {
            p.actor.pos.x = p.actor.pos.x.clamp(-1.0, 121.0);
            p.actor.spd.x = 0.0;
        }
        let (pos, facing) = (p.actor.pos, p.facing());
        self.hair.follow(pos, facing, ducking);

        if pos.y < -4.0 && self.session.room.index() < SUMMIT_INDEX {
            self.next_room();
        }
    }

    pub(crate) fn ease_spawn_hair(&mut self) {
        let ducking = self.input.held(Button::Down);
        if let Some(spawn) = &self.player_spawn {
            self.hair.follow(spawn.pos, 1.0, ducking);
        }
    }

    fn hair_color(&self, djump: u8) -> u8 {
        match djump {
            1 => 8,
            2 => 7 + ((self.frames() / 3) % 2) * 4,
            _ => 12,
        }
    }

    pub(crate) fn draw_player(&self, gfx: &mut dyn Graphics) {
        let Some(p) = &self.player else {
            return;
        };
        gfx.pal(8, self.hair_color(p.djump), PaletteMask::PLAYER);
        gfx.spr(
            p.actor.spr,
            p.actor.px(),
            p.actor.py(),
            1,
            PaletteMask::PLAYER,
            p.actor.flip,
        );
        self.hair.draw(gfx);
    }

    pub(crate) fn draw_player_spawn(&self, gfx: &mut dyn Graphics) {
        let Some(spawn) = &self.player_spawn else {
            return;
        };
        gfx.pal(8, self.hair_color(self.session.max_djump), PaletteMask::PLAYER);
        gfx.spr(
            spawn.spr,
            spawn.pos.x as i32,
            spawn.pos.y as i32,
            1,
            PaletteMask::PLAYER,
            SpriteFlip::default(),
        );
        self.hair.draw(gfx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_directions() {
        assert_eq!(dash_velocity(1, 0, 1.0), Vec2::new(5.0, 0.0));
        assert_eq!(dash_velocity(0, -1, 1.0), Vec2::new(0.0, -5.0));
        assert_eq!(dash_velocity(0, 0, -1.0), Vec2::new(-1.0, 0.0));
        let diag = dash_velocity(-1, 1, 1.0);
        assert!((diag.x + 5.0 * DIAGONAL).abs() < 1e-6);
        assert!((diag.y - 5.0 * DIAGONAL).abs() < 1e-6);
    }

    #[test]
    fn upward_dash_settles_lower() {
        let (target, accel) = dash_settle(Vec2::new(0.0, -5.0));
        assert_eq!(target, Vec2::new(0.0, -1.5));
        assert_eq!(accel, Vec2::new(1.5 * DIAGONAL, 1.5));

        let (target, accel) = dash_settle(Vec2::new(5.0, 0.0));
        assert_eq!(target, Vec2::new(2.0, 0.0));
        assert_eq!(accel, Vec2::new(1.5, 1.5 * DIAGONAL));
    }

    #[test]
    fn new_player_has_full_charges() {
        let p = Player::new(8.0, 16.0, 2);
        assert_eq!(p.djump, 2);
        assert_eq!(p.actor.hitbox, PLAYER_HITBOX);
        assert_eq!(p.facing(), 1.0);
    }
}
