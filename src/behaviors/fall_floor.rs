use crate::actor::{Actor, ActorKind, HasActor, Hitbox};
use crate::host::{Graphics, PaletteMask, SpriteFlip};
use crate::world::World;

pub const MAX_FALL_FLOORS: usize = 12;
pub const FALL_FLOOR_TILE: u16 = 23;
/// Ticks between being touched and dropping away.
pub const SHAKE_TICKS: u8 = 15;
/// Ticks a fallen floor stays gone.
pub const HIDDEN_TICKS: u8 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallFloorState {
    Idle,
    Shaking,
    Hidden,
}

/// Crumbling block. Its solidity lives in the room grid cell it sits on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallFloor {
    pub actor: Actor,
    pub state: FallFloorState,
    pub delay: u8,
    pub cell: (i32, i32),
}

impl FallFloor {
    pub fn new(x: f32, y: f32, cell: (i32, i32)) -> Self {
        Self {
            actor: Actor::new(ActorKind::FallFloor, x, y).with_hitbox(Hitbox::new(-1, -1, 10, 9)),
            state: FallFloorState::Idle,
            delay: 0,
            cell,
        }
    }

    /// Tile shown while shaking, cracking further as the delay runs out.
    pub fn shake_tile(&self) -> u16 {
        FALL_FLOOR_TILE + u16::from((SHAKE_TICKS - self.delay.min(SHAKE_TICKS)) / 5)
    }
}

impl HasActor for FallFloor {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl World {
    pub(crate) fn add_fall_floor(&mut self, x: f32, y: f32, cell: (i32, i32)) {
        self.fall_floors.spawn(FallFloor::new(x, y, cell));
    }

    /// Start an idle floor shaking. Any spring resting on it goes too.
    pub(crate) fn break_fall_floor(&mut self, i: usize) {
        let Some(floor) = self.fall_floors.get_mut(i) else {
            return;
        };
        if floor.state != FallFloorState::Idle {
            return;
        }
        floor.state = FallFloorState::Shaking;
        floor.delay = SHAKE_TICKS;
        let at = floor.actor;
        self.psfx(15);
        self.spawn_smoke(at.pos.x, at.pos.y);
        if let Some(above) = self.springs.first_hit(&at, 0, -1) {
            self.break_spring(above);
        }
    }

    pub(crate) fn update_fall_floor(&mut self, i: usize) {
        let Some(floor) = self.fall_floors.get(i).copied() else {
            return;
        };
        let (cx, cy) = floor.cell;
        match floor.state {
            FallFloorState::Idle => {
                if self.touches_player(&floor.actor, 0, 0) {
                    self.break_fall_floor(i);
                }
            }
            FallFloorState::Shaking => {
                let Some(floor) = self.fall_floors.get_mut(i) else {
                    return;
                };
                floor.delay = floor.delay.saturating_sub(1);
                let tile = floor.shake_tile();
                if floor.delay == 0 {
                    floor.state = FallFloorState::Hidden;
                    floor.delay = HIDDEN_TICKS;
                    floor.actor.collideable = false;
                    self.grid.set_tile(cx, cy, 0);
                } else {
                    self.grid.set_tile(cx, cy, tile);
                }
            }
            FallFloorState::Hidden => {
                if floor.delay > 0 {
                    if let Some(floor) = self.fall_floors.get_mut(i) {
                        floor.delay -= 1;
                    }
                } else if !self.touches_player(&floor.actor, 0, 0) {
                    self.psfx(7);
                    if let Some(floor) = self.fall_floors.get_mut(i) {
                        floor.state = FallFloorState::Idle;
                        floor.actor.collideable = true;
                    }
                    self.grid.set_tile(cx, cy, FALL_FLOOR_TILE);
                    self.spawn_smoke(floor.actor.pos.x, floor.actor.pos.y);
                }
            }
        }
    }

    /// Floors are normally drawn by the tile layer; after the summit chest
    /// opens the tile layer is recoloured and they are drawn as sprites.
    pub(crate) fn draw_fall_floors(&self, gfx: &mut dyn Graphics) {
        if !self.new_bg {
            return;
        }
        for (_, floor) in self.fall_floors.iter() {
            let id = match floor.state {
                FallFloorState::Idle => FALL_FLOOR_TILE,
                FallFloorState::Shaking => floor.shake_tile(),
                FallFloorState::Hidden => continue,
            };
            gfx.spr(
                id,
                floor.actor.px(),
                floor.actor.py(),
                1,
                PaletteMask::empty(),
                SpriteFlip::default(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_tile_cracks_over_time() {
        let mut floor = FallFloor::new(0.0, 0.0, (0, 0));
        floor.delay = 14;
        assert_eq!(floor.shake_tile(), 23);
        floor.delay = 9;
        assert_eq!(floor.shake_tile(), 24);
        floor.delay = 4;
        assert_eq!(floor.shake_tile(), 25);
    }
}
