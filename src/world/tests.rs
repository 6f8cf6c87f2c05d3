use super::*;
use bevy::math::Vec2;

use crate::actor::Actor;
use crate::behaviors::chest::BigChestState;
use crate::behaviors::fall_floor::FallFloorState;
use crate::behaviors::spring::SpringState;
use crate::cartridge::{GROUND, ICE_GROUND};
use crate::host::Recorder;
use crate::player::{JUMP_SPEED, WALL_SLIDE_FALL};
use crate::save::MemorySaveStore;
use crate::tiles::SPIKE_UP_CODE;

/// Every level gets a solid floor on the bottom row.
fn floored_cart() -> Cartridge {
    let mut cart = Cartridge::blank();
    for code in [GROUND, spawn_code::FALL_FLOOR, 24, 25] {
        cart.flags[usize::from(code)] = 1;
    }
    for index in 0..ROOM_COUNT {
        let room = RoomCoord::new((index % 8) as u8, (index / 8) as u8);
        for cx in 0..ROOM_CELLS {
            cart.set_cell(room, cx, 15, GROUND);
        }
    }
    cart
}

fn world_with(cart: Cartridge) -> (World, MemorySaveStore) {
    let store = MemorySaveStore::default();
    let world = World::new(cart, Box::new(store.clone()), 7);
    (world, store)
}

/// A world in the first room with a player standing at `(x, y)`.
fn playing(cart: Cartridge, x: f32, y: f32) -> (World, MemorySaveStore) {
    let (mut world, store) = world_with(cart);
    world.load_room(RoomCoord::START);
    world.spawn_player(x, y);
    (world, store)
}

fn idle(world: &mut World, ticks: usize) {
    for _ in 0..ticks {
        world.tick(ButtonState::NONE);
    }
}

fn press(button: Button) -> ButtonState {
    ButtonState::NONE.with_pressed(button)
}

#[test]
fn jump_from_ground_launches_and_clears_buffer() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.tick(press(Button::Jump));

    let p = world.player().expect("player");
    assert_eq!(p.actor.spd.y, JUMP_SPEED);
    assert_eq!(p.jbuffer, 0);
    assert_eq!(p.grace, 0);

    world.tick(ButtonState::NONE);
    assert_eq!(world.player().expect("player").actor.pos.y, 110.0);
}

#[test]
fn held_jump_does_not_rebuffer() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.tick(ButtonState::NONE.with_held(Button::Jump));
    assert_eq!(world.player().expect("player").actor.spd.y, JUMP_SPEED);
    world.tick(ButtonState::NONE.with_held(Button::Jump));
    let p = world.player().expect("player");
    assert!(p.p_jump);
    assert_eq!(p.jbuffer, 0);
    assert!(p.actor.spd.y > JUMP_SPEED);
}

#[test]
fn dash_spends_a_charge_and_freezes() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.tick(press(Button::Dash).with_held(Button::Right));

    let p = world.player().expect("player");
    assert_eq!(p.djump, 0);
    assert_eq!(p.dash_time, 4);
    assert_eq!(p.dash_effect_time, 10);
    assert_eq!(p.actor.spd.x, 5.0);
    assert_eq!(world.freeze(), 2);
    assert!(world.has_dashed());
}

#[test]
fn empty_dash_plays_the_refusal_cue() {
    let (mut world, _) = playing(floored_cart(), 40.0, 60.0);
    if let Some(p) = world.player.as_mut() {
        p.djump = 0;
    }
    world.take_cues();
    world.tick(press(Button::Dash));
    assert!(world.take_cues().contains(&AudioCue::Sfx(9)));
    assert_eq!(world.freeze(), 0);
}

#[test]
fn fall_floor_shakes_drops_and_rearms_when_clear() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 4, 14, spawn_code::FALL_FLOOR);
    let (mut world, _) = playing(cart, 32.0, 104.0);
    assert_eq!(world.fall_floors().len(), 1);
    assert_eq!(world.grid().tile_at(4, 14), spawn_code::FALL_FLOOR);

    world.tick(ButtonState::NONE);
    let floor = |w: &World| *w.fall_floors().get(0).expect("floor");
    assert_eq!(floor(&world).state, FallFloorState::Shaking);

    idle(&mut world, 14);
    assert_eq!(floor(&world).state, FallFloorState::Shaking);
    assert_ne!(world.grid().tile_at(4, 14), 0);

    idle(&mut world, 1);
    assert_eq!(floor(&world).state, FallFloorState::Hidden);
    assert_eq!(world.grid().tile_at(4, 14), 0);

    // The player dropped onto the row below and still overlaps the cell.
    idle(&mut world, 70);
    assert_eq!(floor(&world).state, FallFloorState::Hidden);

    if let Some(p) = world.player.as_mut() {
        p.actor.pos.x = 96.0;
    }
    world.tick(ButtonState::NONE);
    assert_eq!(floor(&world).state, FallFloorState::Idle);
    assert_eq!(world.grid().tile_at(4, 14), spawn_code::FALL_FLOOR);
}

#[test]
fn fruit_stays_collected_across_reload_and_save() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 6, 13, spawn_code::FRUIT);
    let (mut world, store) = playing(cart.clone(), 48.0, 104.0);
    assert!(world.fruit().is_some());

    world.tick(ButtonState::NONE);
    assert!(world.fruit().is_none());
    assert!(world.session().got_fruit[0]);
    assert_eq!(world.session().fruit_count(), 1);

    world.load_room(RoomCoord::START);
    assert!(world.fruit().is_none());

    world.next_room();
    let saved = store.load().expect("saved");
    assert_eq!(saved.room, RoomCoord::new(1, 0));
    assert_eq!(saved.fruit & 1, 1);

    let mut resumed = World::new(cart, Box::new(store.clone()), 1);
    resumed.boot();
    resumed.load_room(RoomCoord::START);
    assert!(resumed.fruit().is_none());
}

#[test]
fn death_counts_and_reloads_after_delay() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 2, 14, spawn_code::PLAYER_SPAWN);
    cart.set_cell(RoomCoord::START, 4, 14, spawn_code::FALL_FLOOR);
    let (mut world, _) = playing(cart, 32.0, 104.0);
    let floor = |w: &World| *w.fall_floors().get(0).expect("floor");

    world.tick(ButtonState::NONE);
    assert_eq!(floor(&world).state, FallFloorState::Shaking);

    if let Some(p) = world.player.as_mut() {
        p.actor.pos.y = 130.0;
    }
    world.tick(ButtonState::NONE);
    assert!(world.player().is_none());
    assert_eq!(world.session().deaths, 1);
    assert_eq!(world.phase(), WorldPhase::Restarting);
    assert_eq!(world.dead_particles.len(), 8);

    idle(&mut world, 9);
    assert!(world.dead_particles.is_empty());
    idle(&mut world, 5);
    assert_eq!(world.phase(), WorldPhase::Restarting);
    assert!(world.player_spawn().is_none());
    assert_eq!(floor(&world).state, FallFloorState::Hidden);
    assert_eq!(world.grid().tile_at(4, 14), 0);

    idle(&mut world, 1);
    assert_eq!(world.phase(), WorldPhase::RoomTransition);
    assert!(world.player_spawn().is_some());
    assert_eq!(world.fall_floors().len(), 1);
    assert_eq!(floor(&world).state, FallFloorState::Idle);
    assert_eq!(world.grid().tile_at(4, 14), spawn_code::FALL_FLOOR);
}

#[test]
fn upward_spike_kills_a_standing_player() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 14, SPIKE_UP_CODE);
    let (mut world, _) = playing(cart, 40.0, 112.0);
    world.tick(ButtonState::NONE);
    assert!(world.player().is_none());
    assert_eq!(world.session().deaths, 1);
}

#[test]
fn orb_grants_second_charge() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    let mut orb = Actor::new(ActorKind::Orb, 40.0, 112.0);
    orb.solids = false;
    world.orb = Some(orb);

    world.tick(ButtonState::NONE);
    assert!(world.orb().is_none());
    assert_eq!(world.session().max_djump, 2);
    assert_eq!(world.player().expect("player").djump, 2);
    assert_eq!(world.freeze(), 10);
}

#[test]
fn big_chest_pauses_player_then_releases_orb() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 8, 13, spawn_code::BIG_CHEST);
    cart.set_cell(RoomCoord::START, 9, 13, spawn_code::BIG_CHEST_LID);
    let (mut world, _) = playing(cart, 68.0, 112.0);
    assert_eq!(world.grid().tile_at(9, 13), 0);

    world.tick(ButtonState::NONE);
    let state = |w: &World| w.big_chest.as_ref().map(|c| c.state);
    assert_eq!(state(&world), Some(BigChestState::Opening));
    assert!(world.pause_player);

    idle(&mut world, 59);
    assert_eq!(state(&world), Some(BigChestState::Opening));
    idle(&mut world, 1);
    assert_eq!(state(&world), Some(BigChestState::Open));
    assert!(!world.pause_player);
    assert!(world.orb().is_some());
}

#[test]
fn key_opens_chest_into_fruit() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 14, spawn_code::KEY);
    cart.set_cell(RoomCoord::START, 10, 14, spawn_code::CHEST);
    let (mut world, _) = playing(cart, 40.0, 112.0);

    world.tick(ButtonState::NONE);
    assert!(world.has_key());
    assert!(world.key.is_none());

    idle(&mut world, 18);
    assert!(world.chest.is_some());
    idle(&mut world, 1);
    assert!(world.chest.is_none());
    assert!(world.fruit().is_some());
}

#[test]
fn leaving_through_the_top_advances_and_saves() {
    let (mut world, store) = playing(floored_cart(), 40.0, -6.0);
    world.tick(ButtonState::NONE);
    assert_eq!(world.room(), RoomCoord::new(1, 0));
    assert_eq!(store.load().map(|r| r.room), Some(RoomCoord::new(1, 0)));
}

#[test]
fn music_follows_the_destination_room() {
    let (mut world, _) = world_with(floored_cart());
    world.load_room(RoomCoord::new(2, 1));
    world.take_cues();
    world.next_room();
    assert!(world.take_cues().contains(&AudioCue::Music {
        track: Some(30),
        fade_ms: 500,
        channel_mask: 7,
    }));
}

#[test]
fn boot_without_save_shows_title_and_starts_on_input() {
    let (mut world, _) = world_with(floored_cart());
    world.boot();
    assert_eq!(world.phase(), WorldPhase::Title);

    world.tick(press(Button::Jump));
    assert!(world.start_game);
    idle(&mut world, 78);
    assert!(world.room().is_title());
    idle(&mut world, 1);
    assert_eq!(world.room(), RoomCoord::START);
    assert_eq!(world.session().max_djump, 1);
}

#[test]
fn cheat_combo_on_title_unlocks_two_charges() {
    let (mut world, _) = world_with(floored_cart());
    world.boot();
    let input = press(Button::Jump).with_held(Button::L).with_held(Button::R);
    world.tick(input);
    assert!(world.session().cheated);
    idle(&mut world, 79);
    assert_eq!(world.room(), RoomCoord::START);
    assert_eq!(world.session().max_djump, 2);
}

#[test]
fn boot_restores_a_valid_save() {
    let record = SaveRecord::new(5, 2, 3, RoomCoord::new(2, 0), 0b1);
    let store = MemorySaveStore::with_record(record);
    let mut world = World::new(floored_cart(), Box::new(store), 3);
    world.boot();
    assert_eq!(world.room(), RoomCoord::new(2, 0));
    assert_eq!(world.session().deaths, 3);
    assert_eq!(world.session().seconds, 5);
    assert!(world.session().got_fruit[0]);
}

#[test]
fn boot_rejects_bad_magic() {
    let mut record = SaveRecord::new(5, 2, 3, RoomCoord::new(2, 0), 0);
    record.magic = 0;
    let store = MemorySaveStore::with_record(record);
    let mut world = World::new(floored_cart(), Box::new(store.clone()), 3);
    world.boot();
    assert!(world.room().is_title());
    assert!(store.load().is_none());
}

#[test]
fn start_toggles_pause_and_stops_the_clock() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.tick(press(Button::Start));
    assert!(world.is_paused());
    let frames = world.frames();
    idle(&mut world, 10);
    assert_eq!(world.frames(), frames);
    world.tick(press(Button::Start));
    assert!(!world.is_paused());
}

#[test]
fn clock_stops_at_the_summit() {
    let (mut world, _) = world_with(floored_cart());
    world.load_room(RoomCoord::new(6, 3));
    idle(&mut world, 90);
    assert_eq!(world.session().seconds, 0);

    world.load_room(RoomCoord::START);
    idle(&mut world, 90);
    assert_eq!(world.session().seconds, 3);
}

#[test]
fn draw_skips_frozen_frames() {
    let (mut world, _) = world_with(floored_cart());
    world.boot();
    let mut gfx = Recorder::default();
    assert!(world.draw(&mut gfx));
    assert!(gfx.texts().contains(&"press start"));

    world.freeze = 3;
    gfx.clear();
    assert!(!world.draw(&mut gfx));
    assert!(gfx.draws.is_empty());
}

#[test]
fn queued_audio_drains_once() {
    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.take_cues();
    world.tick(press(Button::Jump));
    let mut sink = Recorder::default();
    world.drain_audio(&mut sink);
    assert!(sink.sfx_ids().contains(&1));
    let mut again = Recorder::default();
    world.drain_audio(&mut again);
    assert!(again.cues.is_empty());
}

#[test]
fn spring_bounces_a_falling_or_resting_player() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 14, spawn_code::SPRING);
    let (mut world, _) = playing(cart, 40.0, 112.0);
    let spring = |w: &World| w.springs().get(0).expect("spring").state();

    world.tick(ButtonState::NONE.with_held(Button::Right));
    let p = world.player().expect("player");
    assert_eq!(p.actor.spd.y, -3.0);
    assert!((p.actor.spd.x - 0.12).abs() < 1e-6);
    assert_eq!(p.actor.pos.y, 108.0);
    assert_eq!(spring(&world), SpringState::Compressed);

    idle(&mut world, 10);
    assert_eq!(spring(&world), SpringState::Armed);
}

#[test]
fn spring_ignores_a_rising_player() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 14, spawn_code::SPRING);
    let (mut world, _) = playing(cart, 40.0, 112.0);
    if let Some(p) = world.player.as_mut() {
        p.actor.spd.y = -1.0;
    }

    world.tick(ButtonState::NONE);
    assert!(world.player().expect("player").actor.spd.y < 0.0);
    assert_eq!(world.springs().get(0).expect("spring").state(), SpringState::Armed);
}

#[test]
fn spring_bounce_breaks_the_floor_beneath() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 13, spawn_code::SPRING);
    cart.set_cell(RoomCoord::START, 5, 14, spawn_code::FALL_FLOOR);
    let (mut world, _) = playing(cart, 40.0, 98.0);
    if let Some(p) = world.player.as_mut() {
        p.actor.spd.y = 1.0;
    }
    let spring = |w: &World| w.springs().get(0).expect("spring").state();

    world.tick(ButtonState::NONE);
    assert_eq!(world.player().expect("player").actor.spd.y, -3.0);
    assert_eq!(
        world.fall_floors().get(0).expect("floor").state,
        FallFloorState::Shaking
    );

    // The spring loses its support and vanishes shortly after.
    idle(&mut world, 13);
    assert_ne!(spring(&world), SpringState::Hidden);
    idle(&mut world, 1);
    assert_eq!(spring(&world), SpringState::Hidden);
}

#[test]
fn balloon_refills_dash_then_waits_to_respawn() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 12, spawn_code::BALLOON);
    let (mut world, _) = playing(cart, 40.0, 96.0);
    if let Some(p) = world.player.as_mut() {
        p.djump = 0;
    }
    let available = |w: &World| w.balloons().get(0).expect("balloon").is_available();

    world.tick(ButtonState::NONE);
    assert_eq!(world.player().expect("player").djump, 1);
    assert!(!available(&world));

    // Still overlapping, but a popped balloon gives nothing.
    if let Some(p) = world.player.as_mut() {
        p.djump = 0;
    }
    world.tick(ButtonState::NONE);
    assert_eq!(world.player().expect("player").djump, 0);

    idle(&mut world, 59);
    assert!(!available(&world));
    idle(&mut world, 1);
    assert!(available(&world));
}

#[test]
fn fake_wall_breaks_only_during_a_dash() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 13, spawn_code::FAKE_WALL);
    let (mut world, _) = playing(cart, 33.0, 112.0);

    world.tick(ButtonState::NONE);
    assert!(world.fake_wall().is_some());
    assert!(world.fruit().is_none());

    world.tick(press(Button::Dash).with_held(Button::Right));
    assert!(world.fake_wall().is_none());
    let p = world.player().expect("player");
    assert_eq!(p.actor.spd.x, -1.5);
    assert_eq!(p.actor.spd.y, -1.5);
    assert_eq!(p.dash_time, 0);
    let fruit = world.fruit().expect("fruit");
    assert_eq!(fruit.actor.pos, Vec2::new(44.0, 108.0));
}

#[test]
fn fly_fruit_waits_for_a_dash_then_escapes() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 8, spawn_code::FLY_FRUIT);
    let (mut world, _) = playing(cart, 100.0, 112.0);

    idle(&mut world, 30);
    let fruit = world.fly_fruit().expect("fly fruit");
    assert!(!fruit.fly);
    assert!((fruit.actor.pos.y - 64.0).abs() <= 4.0);
    let hover = fruit.actor.pos.y;

    world.has_dashed = true;
    idle(&mut world, 10);
    let fruit = world.fly_fruit().expect("fly fruit");
    assert!(fruit.fly);
    assert!(fruit.actor.pos.y < hover);

    idle(&mut world, 60);
    assert!(world.fly_fruit().is_none());
    assert_eq!(world.session().fruit_count(), 0);
}

/// A wall column at x 48..56 with a player hugging its left side.
fn walled_cart() -> Cartridge {
    let mut cart = floored_cart();
    for cy in 5..15 {
        cart.set_cell(RoomCoord::START, 6, cy, GROUND);
    }
    cart
}

#[test]
fn wall_jump_kicks_away_from_the_wall() {
    let (mut world, _) = playing(walled_cart(), 41.0, 60.0);
    world.tick(press(Button::Jump));

    let p = world.player().expect("player");
    assert_eq!(p.actor.spd.y, JUMP_SPEED);
    assert_eq!(p.actor.spd.x, -2.0);
    assert_eq!(p.jbuffer, 0);
}

#[test]
fn wall_slide_caps_fall_speed() {
    let (mut world, _) = playing(walled_cart(), 41.0, 40.0);
    if let Some(p) = world.player.as_mut() {
        p.actor.spd.y = 2.0;
    }
    for _ in 0..20 {
        world.tick(ButtonState::NONE.with_held(Button::Right));
    }
    let p = world.player().expect("player");
    assert_eq!(p.actor.spd.y, WALL_SLIDE_FALL);
    assert_eq!(p.actor.pos.x, 41.0);

    world.tick(ButtonState::NONE);
    assert!(world.player().expect("player").actor.spd.y > WALL_SLIDE_FALL);
}

#[test]
fn ice_slows_ground_acceleration() {
    let mut cart = floored_cart();
    cart.flags[usize::from(ICE_GROUND)] = 1 | 16;
    for cx in 0..ROOM_CELLS {
        cart.set_cell(RoomCoord::START, cx, 15, ICE_GROUND);
    }
    let (mut world, _) = playing(cart, 40.0, 112.0);
    world.tick(ButtonState::NONE.with_held(Button::Right));
    assert_eq!(world.player().expect("player").actor.spd.x, 0.05);

    let (mut world, _) = playing(floored_cart(), 40.0, 112.0);
    world.tick(ButtonState::NONE.with_held(Button::Right));
    assert_eq!(world.player().expect("player").actor.spd.x, 0.6);
}

#[test]
fn platform_carries_a_standing_player() {
    let mut cart = floored_cart();
    cart.set_cell(RoomCoord::START, 5, 10, spawn_code::PLATFORM_RIGHT);
    // Feet exactly on the platform top at y 80.
    let (mut world, _) = playing(cart, 40.0, 72.0);

    world.tick(ButtonState::NONE);
    let p = world.player().expect("player");
    assert_eq!(p.actor.pos, Vec2::new(40.0, 72.0));
    assert_eq!(p.actor.spd.y, 0.0);

    // The platform crosses from x 36.65 to 37.3.
    world.tick(ButtonState::NONE);
    assert_eq!(world.player().expect("player").actor.pos.x, 41.0);
}
