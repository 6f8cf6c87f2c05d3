//! Per-kind update and draw logic. Each module adds `impl World` methods for
//! its actors; the world drives them in a fixed order every tick.

pub mod balloon;
pub mod chest;
pub mod effects;
pub mod fake_wall;
pub mod fall_floor;
pub mod flag;
pub mod fruit;
pub mod platform;
pub mod spring;
