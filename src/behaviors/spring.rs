use crate::actor::{Actor, ActorKind, HasActor};
use crate::host::Graphics;
use crate::world::World;

use super::effects::draw_actor;

pub const MAX_SPRINGS: usize = 5;
pub const SPRING_ARMED: u16 = 18;
pub const SPRING_COMPRESSED: u16 = 19;
const SPRING_HIDDEN: u16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringState {
    Armed,
    Compressed,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub actor: Actor,
    /// Countdown until the spring disappears after its floor broke.
    pub hide_in: u8,
    pub hide_for: u8,
    pub delay: u8,
}

impl Spring {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            actor: Actor::new(ActorKind::Spring, x, y),
            hide_in: 0,
            hide_for: 0,
            delay: 0,
        }
    }

    pub fn state(&self) -> SpringState {
        match self.actor.spr {
            SPRING_ARMED => SpringState::Armed,
            SPRING_COMPRESSED => SpringState::Compressed,
            _ => SpringState::Hidden,
        }
    }
}

impl HasActor for Spring {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl World {
    pub(crate) fn add_spring(&mut self, x: f32, y: f32) {
        self.springs.spawn(Spring::new(x, y));
    }

    /// Schedule a spring to vanish; its support is gone.
    pub(crate) fn break_spring(&mut self, i: usize) {
        if let Some(spring) = self.springs.get_mut(i) {
            spring.hide_in = 15;
        }
    }

    pub(crate) fn update_spring(&mut self, i: usize) {
        let max_djump = self.session.max_djump;
        let Some(spring) = self.springs.get_mut(i) else {
            return;
        };

        let mut bounced = None;
        if spring.hide_for > 0 {
            spring.hide_for -= 1;
            if spring.hide_for == 0 {
                spring.actor.spr = SPRING_ARMED;
                spring.delay = 0;
            }
        } else if spring.actor.spr == SPRING_ARMED {
            if let Some(p) = self.player.as_mut() {
                if p.actor.spd.y >= 0.0 && spring.actor.hits(&p.actor, 0, 0) {
                    spring.actor.spr = SPRING_COMPRESSED;
                    p.actor.pos.y = spring.actor.pos.y - 4.0;
                    p.actor.spd.x *= 0.2;
                    p.actor.spd.y = -3.0;
                    p.djump = max_djump;
                    spring.delay = 10;
                    bounced = Some(spring.actor);
                }
            }
        } else if spring.delay > 0 {
            spring.delay -= 1;
            if spring.delay == 0 {
                spring.actor.spr = SPRING_ARMED;
            }
        }

        if let Some(at) = bounced {
            self.spawn_smoke(at.pos.x, at.pos.y);
            if let Some(below) = self.fall_floors.first_hit(&at, 0, 1) {
                self.break_fall_floor(below);
            }
            self.psfx(8);
        }

        if let Some(spring) = self.springs.get_mut(i) {
            if spring.hide_in > 0 {
                spring.hide_in -= 1;
                if spring.hide_in == 0 {
                    spring.hide_for = 60;
                    spring.actor.spr = SPRING_HIDDEN;
                }
            }
        }
    }

    pub(crate) fn draw_springs(&self, gfx: &mut dyn Graphics) {
        for (_, spring) in self.springs.iter() {
            draw_actor(gfx, &spring.actor);
        }
    }
}
