use bevy::log::debug;
use bevy::math::Vec2;

use crate::host::SpriteFlip;

/// Tile codes that spawn an actor when a room loads.
pub mod spawn_code {
    pub const PLAYER_SPAWN: u16 = 1;
    pub const KEY: u16 = 8;
    pub const PLATFORM_LEFT: u16 = 11;
    pub const PLATFORM_RIGHT: u16 = 12;
    pub const SPRING: u16 = 18;
    pub const CHEST: u16 = 20;
    pub const BALLOON: u16 = 22;
    pub const FALL_FLOOR: u16 = 23;
    pub const FRUIT: u16 = 26;
    pub const FLY_FRUIT: u16 = 28;
    pub const FAKE_WALL: u16 = 64;
    pub const MESSAGE: u16 = 86;
    pub const BIG_CHEST: u16 = 96;
    /// Right half of the big chest; consumed without spawning.
    pub const BIG_CHEST_LID: u16 = 97;
    pub const FLAG: u16 = 118;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Player,
    PlayerSpawn,
    Spring,
    FallFloor,
    Balloon,
    Platform,
    Fruit,
    FlyFruit,
    FakeWall,
    Key,
    Chest,
    BigChest,
    Orb,
    Flag,
    Message,
    Smoke,
    Lifeup,
}

impl ActorKind {
    pub fn from_spawn_code(code: u16) -> Option<Self> {
        Some(match code {
            spawn_code::PLAYER_SPAWN => ActorKind::PlayerSpawn,
            spawn_code::KEY => ActorKind::Key,
            spawn_code::PLATFORM_LEFT | spawn_code::PLATFORM_RIGHT => ActorKind::Platform,
            spawn_code::SPRING => ActorKind::Spring,
            spawn_code::CHEST => ActorKind::Chest,
            spawn_code::BALLOON => ActorKind::Balloon,
            spawn_code::FALL_FLOOR => ActorKind::FallFloor,
            spawn_code::FRUIT => ActorKind::Fruit,
            spawn_code::FLY_FRUIT => ActorKind::FlyFruit,
            spawn_code::FAKE_WALL => ActorKind::FakeWall,
            spawn_code::MESSAGE => ActorKind::Message,
            spawn_code::BIG_CHEST => ActorKind::BigChest,
            spawn_code::FLAG => ActorKind::Flag,
            _ => return None,
        })
    }

    /// Sprite an actor of this kind starts with.
    pub fn initial_sprite(self) -> u16 {
        match self {
            ActorKind::Player => 1,
            ActorKind::PlayerSpawn => 3,
            ActorKind::Spring => spawn_code::SPRING,
            ActorKind::FallFloor => spawn_code::FALL_FLOOR,
            ActorKind::Balloon => spawn_code::BALLOON,
            ActorKind::Platform => spawn_code::PLATFORM_LEFT,
            ActorKind::Fruit => spawn_code::FRUIT,
            ActorKind::FlyFruit => spawn_code::FLY_FRUIT,
            ActorKind::FakeWall => spawn_code::FAKE_WALL,
            ActorKind::Key => spawn_code::KEY,
            ActorKind::Chest => spawn_code::CHEST,
            ActorKind::BigChest => spawn_code::BIG_CHEST,
            ActorKind::Orb => 102,
            ActorKind::Flag => spawn_code::FLAG,
            ActorKind::Message => spawn_code::MESSAGE,
            ActorKind::Smoke => 29,
            ActorKind::Lifeup => 0,
        }
    }
}

/// Collision rectangle relative to an actor's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hitbox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Hitbox {
    pub const TILE: Hitbox = Hitbox::new(0, 0, 8, 8);

    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

impl Default for Hitbox {
    fn default() -> Self {
        Self::TILE
    }
}

/// State shared by every object in a room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Actor {
    pub kind: ActorKind,
    pub pos: Vec2,
    /// Sub-pixel movement not yet applied.
    pub rem: Vec2,
    pub spd: Vec2,
    pub hitbox: Hitbox,
    pub collideable: bool,
    /// Whether movement is blocked by terrain.
    pub solids: bool,
    pub spr: u16,
    pub flip: SpriteFlip,
}

impl Actor {
    pub fn new(kind: ActorKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            pos: Vec2::new(x, y),
            rem: Vec2::ZERO,
            spd: Vec2::ZERO,
            hitbox: Hitbox::TILE,
            collideable: true,
            solids: true,
            spr: kind.initial_sprite(),
            flip: SpriteFlip::default(),
        }
    }

    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.hitbox = hitbox;
        self
    }

    /// Pixel the actor occupies, used for terrain lookups and drawing.
    pub fn px(&self) -> i32 {
        self.pos.x.floor() as i32
    }

    pub fn py(&self) -> i32 {
        self.pos.y.floor() as i32
    }

    /// World-space hitbox at an offset, as `(x, y, w, h)`.
    pub fn bounds(&self, ox: i32, oy: i32) -> (f32, f32, f32, f32) {
        (
            self.pos.x + (self.hitbox.x + ox) as f32,
            self.pos.y + (self.hitbox.y + oy) as f32,
            self.hitbox.w as f32,
            self.hitbox.h as f32,
        )
    }

    /// Does this actor, shifted by `(ox, oy)`, touch `other`?
    /// Non-collideable targets never register.
    pub fn hits(&self, other: &Actor, ox: i32, oy: i32) -> bool {
        other.collideable && rects_overlap(self.bounds(ox, oy), other.bounds(0, 0))
    }
}

/// Half-open overlap of two hitboxes, ignoring the collideable flag.
pub fn overlaps(a: &Actor, b: &Actor) -> bool {
    rects_overlap(a.bounds(0, 0), b.bounds(0, 0))
}

fn rects_overlap(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> bool {
    let (ax, ay, aw, ah) = a;
    let (bx, by, bw, bh) = b;
    ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah
}

/// Pooled objects expose their shared actor state through this.
pub trait HasActor {
    fn actor(&self) -> &Actor;
}

impl HasActor for Actor {
    fn actor(&self) -> &Actor {
        self
    }
}

/// Handle to a live actor returned by collision queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorRef {
    pub kind: ActorKind,
    pub slot: usize,
}

/// Fixed-capacity slot array. Spawning into a full pool drops the object.
#[derive(Clone, Debug)]
pub struct Pool<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T, const N: usize> Pool<T, N> {
    /// Place `item` in the first free slot, returning its index.
    pub fn spawn(&mut self, item: T) -> Option<usize> {
        let Some(index) = self.slots.iter().position(Option::is_none) else {
            debug!(
                "[Summit world] Pool of {} {} full, dropping spawn",
                N,
                std::any::type_name::<T>()
            );
            return None;
        };
        self.slots[index] = Some(item);
        Some(index)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (i, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (i, item)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: HasActor, const N: usize> Pool<T, N> {
    /// First live member touched by `mover` shifted by `(ox, oy)`.
    pub fn first_hit(&self, mover: &Actor, ox: i32, oy: i32) -> Option<usize> {
        self.iter()
            .find(|(_, item)| mover.hits(item.actor(), ox, oy))
            .map(|(i, _)| i)
    }
}
