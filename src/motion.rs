use crate::actor::{Actor, Pool};
use crate::behaviors::platform::{Platform, MAX_PLATFORMS};
use crate::tiles::RoomGrid;

/// Anything that can block a moving actor.
pub trait SolidQuery {
    /// Would `actor`, shifted by `(ox, oy)`, be inside something solid?
    fn is_solid_for(&self, actor: &Actor, ox: i32, oy: i32) -> bool;
}

/// Bare tiles, for actors that only care about the room grid.
impl SolidQuery for RoomGrid {
    fn is_solid_for(&self, actor: &Actor, ox: i32, oy: i32) -> bool {
        let (x, y, w, h) = pixel_bounds(actor, ox, oy);
        self.solid_at(x, y, w, h)
    }
}

/// Full room terrain: solid tiles, the breakable wall, and the tops of
/// moving platforms when checking downward.
pub struct Terrain<'a> {
    pub grid: &'a RoomGrid,
    pub fake_wall: Option<&'a Actor>,
    pub platforms: &'a Pool<Platform, MAX_PLATFORMS>,
}

impl<'a> Terrain<'a> {
    pub fn new(
        grid: &'a RoomGrid,
        fake_wall: Option<&'a Actor>,
        platforms: &'a Pool<Platform, MAX_PLATFORMS>,
    ) -> Self {
        Self {
            grid,
            fake_wall,
            platforms,
        }
    }
}

impl SolidQuery for Terrain<'_> {
    fn is_solid_for(&self, actor: &Actor, ox: i32, oy: i32) -> bool {
        if oy > 0
            && self
                .platforms
                .iter()
                .any(|(_, platform)| platform.supports(actor))
        {
            return true;
        }
        self.grid.is_solid_for(actor, ox, oy)
            || self.fake_wall.is_some_and(|wall| actor.hits(wall, ox, oy))
    }
}

/// Integer hitbox used for tile lookups.
pub fn pixel_bounds(actor: &Actor, ox: i32, oy: i32) -> (i32, i32, i32, i32) {
    (
        actor.px() + actor.hitbox.x + ox,
        actor.py() + actor.hitbox.y + oy,
        actor.hitbox.w,
        actor.hitbox.h,
    )
}

/// Apply one tick of velocity through the sub-pixel remainder, x then y.
pub fn move_actor<S: SolidQuery + ?Sized>(actor: &mut Actor, solids: &S, dx: f32, dy: f32) {
    actor.rem.x += dx;
    let amount = (actor.rem.x + 0.5).floor();
    actor.rem.x -= amount;
    move_x(actor, solids, amount as i32);

    actor.rem.y += dy;
    let amount = (actor.rem.y + 0.5).floor();
    actor.rem.y -= amount;
    move_y(actor, solids, amount as i32);
}

/// Walk `amount` whole pixels horizontally, stopping at the first blocked one.
pub fn move_x<S: SolidQuery + ?Sized>(actor: &mut Actor, solids: &S, amount: i32) {
    if !actor.solids {
        actor.pos.x += amount as f32;
        return;
    }
    let step = amount.signum();
    for _ in 0..amount.abs() {
        if solids.is_solid_for(actor, step, 0) {
            actor.spd.x = 0.0;
            actor.rem.x = 0.0;
            break;
        }
        actor.pos.x += step as f32;
    }
}

pub fn move_y<S: SolidQuery + ?Sized>(actor: &mut Actor, solids: &S, amount: i32) {
    if !actor.solids {
        actor.pos.y += amount as f32;
        return;
    }
    let step = amount.signum();
    for _ in 0..amount.abs() {
        if solids.is_solid_for(actor, 0, step) {
            actor.spd.y = 0.0;
            actor.rem.y = 0.0;
            break;
        }
        actor.pos.y += step as f32;
    }
}
