use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use crate::actor::{spawn_code, Actor, ActorKind, ActorRef, Pool};
use crate::behaviors::balloon::{Balloon, MAX_BALLOONS};
use crate::behaviors::chest::{BigChest, Chest, Key};
use crate::behaviors::effects::{
    DeadParticle, Hair, Lifeup, Particle, MAX_DEAD_PARTICLES, MAX_PARTICLES, MAX_SMOKE,
};
use crate::behaviors::fall_floor::{FallFloor, MAX_FALL_FLOORS};
use crate::behaviors::flag::{Flag, Message, RoomTitle};
use crate::behaviors::fruit::{FlyFruit, Fruit};
use crate::behaviors::platform::{Platform, MAX_PLATFORMS};
use crate::behaviors::spring::{Spring, MAX_SPRINGS};
use crate::cartridge::{Cartridge, RoomCoord, ROOM_COUNT, SUMMIT_INDEX};
use crate::host::{Audio, AudioCue, Button, ButtonState, Graphics, PaletteMask};
use crate::math::Rng;
use crate::motion::{pixel_bounds, SolidQuery, Terrain};
use crate::player::{Player, PlayerSpawn};
use crate::save::{SaveRecord, SaveStore};
use crate::tiles::{RoomGrid, ROOM_CELLS, TILE_SIZE};

/// Ticks between a death and the room reloading.
pub const RESTART_DELAY: u8 = 15;
pub const TICKS_PER_SECOND: u8 = 30;

/// Coarse state of the run, derived from the world flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldPhase {
    Title,
    /// Player spawn sequence after a room load.
    RoomTransition,
    Playing,
    /// Dead, waiting for the room to reload.
    Restarting,
}

/// Progress that survives room loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub room: RoomCoord,
    pub got_fruit: [bool; ROOM_COUNT],
    /// Tick within the current second, `0..30`.
    pub frames: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub deaths: u16,
    pub max_djump: u8,
    pub cheated: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            room: RoomCoord::START,
            got_fruit: [false; ROOM_COUNT],
            frames: 0,
            seconds: 0,
            minutes: 0,
            deaths: 0,
            max_djump: 1,
            cheated: false,
        }
    }
}

impl Session {
    pub fn fruit_mask(&self) -> u32 {
        self.got_fruit
            .iter()
            .enumerate()
            .filter(|(_, got)| **got)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn set_fruit_mask(&mut self, mask: u32) {
        for (i, got) in self.got_fruit.iter_mut().enumerate() {
            *got = mask & (1 << i) != 0;
        }
    }

    pub fn fruit_count(&self) -> u8 {
        self.got_fruit.iter().filter(|got| **got).count() as u8
    }

    /// Fruit for the current level already collected?
    pub fn has_fruit(&self) -> bool {
        self.got_fruit
            .get(self.room.index())
            .copied()
            .unwrap_or(false)
    }

    pub fn collect_fruit(&mut self) {
        if let Some(got) = self.got_fruit.get_mut(self.room.index()) {
            *got = true;
        }
    }

    pub fn reset_clock(&mut self) {
        self.frames = 0;
        self.seconds = 0;
        self.minutes = 0;
    }

    pub fn record(&self) -> SaveRecord {
        SaveRecord::new(
            self.seconds,
            self.minutes,
            self.deaths,
            self.room,
            self.fruit_mask(),
        )
    }
}

/// Music change when arriving in a room.
pub fn track_for_room(room: RoomCoord) -> Option<u8> {
    match (room.x, room.y) {
        (3, 1) | (5, 2) | (6, 3) => Some(30),
        (4, 1) => Some(20),
        _ => None,
    }
}

/// The whole simulation. Owned by one driver and advanced one tick at a
/// time; rendering reads it without mutating.
#[derive(Resource)]
pub struct World {
    pub(crate) cart: Cartridge,
    pub(crate) grid: RoomGrid,
    pub(crate) rng: Rng,
    store: Box<dyn SaveStore>,
    cues: Vec<AudioCue>,
    pub(crate) input: ButtonState,
    pub(crate) session: Session,

    pub(crate) freeze: u8,
    pub(crate) shake: u8,
    pub(crate) can_shake: bool,
    pub(crate) camera: (i32, i32),
    pub(crate) will_restart: bool,
    pub(crate) delay_restart: u8,
    pub(crate) has_dashed: bool,
    pub(crate) has_key: bool,
    pub(crate) sfx_timer: u8,
    pub(crate) music_timer: u8,
    pub(crate) pause_player: bool,
    pub(crate) flash_bg: bool,
    pub(crate) new_bg: bool,
    pub(crate) start_game: bool,
    pub(crate) start_game_flash: i16,
    pub(crate) paused: bool,
    ticks: u64,

    pub(crate) player: Option<Player>,
    pub(crate) player_spawn: Option<PlayerSpawn>,
    pub(crate) hair: Hair,
    pub(crate) fruit: Option<Fruit>,
    pub(crate) fly_fruit: Option<FlyFruit>,
    pub(crate) fake_wall: Option<Actor>,
    pub(crate) key: Option<Key>,
    pub(crate) chest: Option<Chest>,
    pub(crate) big_chest: Option<BigChest>,
    pub(crate) orb: Option<Actor>,
    pub(crate) flag: Option<Flag>,
    pub(crate) message: Option<Message>,
    pub(crate) lifeup: Option<Lifeup>,
    pub(crate) room_title: Option<RoomTitle>,

    pub(crate) springs: Pool<Spring, MAX_SPRINGS>,
    pub(crate) fall_floors: Pool<FallFloor, MAX_FALL_FLOORS>,
    pub(crate) balloons: Pool<Balloon, MAX_BALLOONS>,
    pub(crate) platforms: Pool<Platform, MAX_PLATFORMS>,
    pub(crate) smoke: Pool<Actor, MAX_SMOKE>,
    pub(crate) dead_particles: Pool<DeadParticle, MAX_DEAD_PARTICLES>,
    pub(crate) particles: Vec<Particle>,
}

impl World {
    /// A world with no room loaded. Call [`World::boot`] to start a run.
    pub fn new(cart: Cartridge, store: Box<dyn SaveStore>, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let particles = (0..MAX_PARTICLES).map(|_| Particle::new(&mut rng)).collect();
        Self {
            grid: RoomGrid::new(cart.flag_table()),
            cart,
            rng,
            store,
            cues: Vec::new(),
            input: ButtonState::NONE,
            session: Session::default(),
            freeze: 0,
            shake: 0,
            can_shake: true,
            camera: (0, 0),
            will_restart: false,
            delay_restart: 0,
            has_dashed: false,
            has_key: false,
            sfx_timer: 0,
            music_timer: 0,
            pause_player: false,
            flash_bg: false,
            new_bg: false,
            start_game: false,
            start_game_flash: 0,
            paused: false,
            ticks: 0,
            player: None,
            player_spawn: None,
            hair: Hair::default(),
            fruit: None,
            fly_fruit: None,
            fake_wall: None,
            key: None,
            chest: None,
            big_chest: None,
            orb: None,
            flag: None,
            message: None,
            lifeup: None,
            room_title: None,
            springs: Pool::default(),
            fall_floors: Pool::default(),
            balloons: Pool::default(),
            platforms: Pool::default(),
            smoke: Pool::default(),
            dead_particles: Pool::default(),
            particles,
        }
    }

    /// Resume a saved run, or show the title room.
    pub fn boot(&mut self) {
        match self.store.load().filter(SaveRecord::is_valid) {
            Some(record) => {
                info!(
                    "[Summit save] Resuming at room ({}, {}) with {} deaths",
                    record.room.x, record.room.y, record.deaths
                );
                self.session.reset_clock();
                self.session.seconds = record.seconds;
                self.session.minutes = record.minutes;
                self.session.deaths = record.deaths;
                self.session.set_fruit_mask(record.fruit);
                self.music_timer = 0;
                self.start_game = false;
                match track_for_room(record.room) {
                    Some(track) => self.music(Some(track), 500, 7),
                    None => self.music(Some(0), 0, 7),
                }
                self.load_room(record.room);
            }
            None => self.title_screen(),
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn room(&self) -> RoomCoord {
        self.session.room
    }

    pub fn grid(&self) -> &RoomGrid {
        &self.grid
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_spawn(&self) -> Option<&PlayerSpawn> {
        self.player_spawn.as_ref()
    }

    pub fn springs(&self) -> &Pool<Spring, MAX_SPRINGS> {
        &self.springs
    }

    pub fn fall_floors(&self) -> &Pool<FallFloor, MAX_FALL_FLOORS> {
        &self.fall_floors
    }

    pub fn balloons(&self) -> &Pool<Balloon, MAX_BALLOONS> {
        &self.balloons
    }

    pub fn platforms(&self) -> &Pool<Platform, MAX_PLATFORMS> {
        &self.platforms
    }

    pub fn smoke(&self) -> &Pool<Actor, MAX_SMOKE> {
        &self.smoke
    }

    pub fn fruit(&self) -> Option<&Fruit> {
        self.fruit.as_ref()
    }

    pub fn fly_fruit(&self) -> Option<&FlyFruit> {
        self.fly_fruit.as_ref()
    }

    pub fn fake_wall(&self) -> Option<&Actor> {
        self.fake_wall.as_ref()
    }

    pub fn orb(&self) -> Option<&Actor> {
        self.orb.as_ref()
    }

    pub fn flag(&self) -> Option<&Flag> {
        self.flag.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn freeze(&self) -> u8 {
        self.freeze
    }

    pub fn shake(&self) -> u8 {
        self.shake
    }

    pub fn can_shake(&self) -> bool {
        self.can_shake
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn has_dashed(&self) -> bool {
        self.has_dashed
    }

    pub fn camera(&self) -> (i32, i32) {
        self.camera
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn save_store(&self) -> &dyn SaveStore {
        self.store.as_ref()
    }

    pub fn set_can_shake(&mut self, on: bool) {
        self.can_shake = on;
    }

    pub fn phase(&self) -> WorldPhase {
        if self.session.room.is_title() {
            WorldPhase::Title
        } else if self.will_restart {
            WorldPhase::Restarting
        } else if self.player_spawn.is_some() {
            WorldPhase::RoomTransition
        } else {
            WorldPhase::Playing
        }
    }

    pub(crate) fn frames(&self) -> u8 {
        self.session.frames
    }

    // ---------------------------------------------------------------
    // Audio
    // ---------------------------------------------------------------

    pub(crate) fn sfx(&mut self, id: u8) {
        self.cues.push(AudioCue::Sfx(id));
    }

    /// Sound effect that yields to a recent priority sound.
    pub(crate) fn psfx(&mut self, id: u8) {
        if self.sfx_timer == 0 {
            self.sfx(id);
        }
    }

    pub(crate) fn music(&mut self, track: Option<u8>, fade_ms: u16, channel_mask: u8) {
        self.cues.push(AudioCue::Music {
            track,
            fade_ms,
            channel_mask,
        });
    }

    /// Hand queued cues to the audio backend.
    pub fn drain_audio(&mut self, sink: &mut dyn Audio) {
        for cue in self.cues.drain(..) {
            cue.play(sink);
        }
    }

    pub fn take_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    // ---------------------------------------------------------------
    // Collision
    // ---------------------------------------------------------------

    /// Would `actor`, shifted by `(ox, oy)`, be inside solid terrain?
    pub fn is_solid_for(&self, actor: &Actor, ox: i32, oy: i32) -> bool {
        Terrain::new(&self.grid, self.fake_wall.as_ref(), &self.platforms).is_solid_for(actor, ox, oy)
    }

    pub fn is_ice_for(&self, actor: &Actor, ox: i32, oy: i32) -> bool {
        let (x, y, w, h) = pixel_bounds(actor, ox, oy);
        self.grid.ice_at(x, y, w, h)
    }

    /// First live actor of `kind` touched by `actor` shifted by `(ox, oy)`.
    pub fn collide(&self, actor: &Actor, kind: ActorKind, ox: i32, oy: i32) -> Option<ActorRef> {
        let single = |other: Option<&Actor>| {
            other
                .filter(|other| actor.hits(other, ox, oy))
                .map(|_| ActorRef { kind, slot: 0 })
        };
        let pooled = |slot: Option<usize>| slot.map(|slot| ActorRef { kind, slot });
        match kind {
            ActorKind::Player => single(self.player.as_ref().map(|p| &p.actor)),
            ActorKind::FakeWall => single(self.fake_wall.as_ref()),
            ActorKind::Fruit => single(self.fruit.as_ref().map(|f| &f.actor)),
            ActorKind::FlyFruit => single(self.fly_fruit.as_ref().map(|f| &f.actor)),
            ActorKind::Key => single(self.key.as_ref().map(|k| &k.actor)),
            ActorKind::Chest => single(self.chest.as_ref().map(|c| &c.actor)),
            ActorKind::BigChest => single(self.big_chest.as_ref().map(|c| &c.actor)),
            ActorKind::Orb => single(self.orb.as_ref()),
            ActorKind::Flag => single(self.flag.as_ref().map(|f| &f.actor)),
            ActorKind::Message => single(self.message.as_ref().map(|m| &m.actor)),
            ActorKind::Spring => pooled(self.springs.first_hit(actor, ox, oy)),
            ActorKind::FallFloor => pooled(self.fall_floors.first_hit(actor, ox, oy)),
            ActorKind::Balloon => pooled(self.balloons.first_hit(actor, ox, oy)),
            ActorKind::Platform => pooled(self.platforms.first_hit(actor, ox, oy)),
            ActorKind::Smoke => pooled(self.smoke.first_hit(actor, ox, oy)),
            ActorKind::PlayerSpawn | ActorKind::Lifeup => None,
        }
    }

    pub(crate) fn touches_player(&self, actor: &Actor, ox: i32, oy: i32) -> bool {
        self.collide(actor, ActorKind::Player, ox, oy).is_some()
    }

    // ---------------------------------------------------------------
    // Rooms
    // ---------------------------------------------------------------

    /// Replace the current room: clear every actor, copy the room's cells,
    /// and spawn actors for entity codes.
    pub fn load_room(&mut self, room: RoomCoord) {
        self.has_dashed = false;
        self.has_key = false;

        self.player = None;
        self.player_spawn = None;
        self.fruit = None;
        self.fly_fruit = None;
        self.fake_wall = None;
        self.key = None;
        self.chest = None;
        self.big_chest = None;
        self.orb = None;
        self.flag = None;
        self.message = None;
        self.lifeup = None;
        self.room_title = None;
        self.springs.clear();
        self.fall_floors.clear();
        self.balloons.clear();
        self.platforms.clear();
        self.smoke.clear();

        self.session.room = room;
        let cells = self.cart.room_cells(room);
        for cy in 0..ROOM_CELLS {
            for cx in 0..ROOM_CELLS {
                let code = cells[(cy * ROOM_CELLS + cx) as usize];
                let kept = self.spawn_from_code(code, cx, cy);
                self.grid.set_tile(cx, cy, kept);
            }
        }

        if !room.is_title() {
            self.room_title = Some(RoomTitle::new());
        }
        info!(
            "[Summit world] Loaded room ({}, {}) level {}",
            room.x,
            room.y,
            room.index()
        );
    }

    /// Spawn whatever `code` stands for and return the tile to leave behind.
    fn spawn_from_code(&mut self, code: u16, cx: i32, cy: i32) -> u16 {
        if code == spawn_code::BIG_CHEST_LID {
            return 0;
        }
        let Some(kind) = ActorKind::from_spawn_code(code) else {
            return code;
        };
        let (x, y) = ((cx * TILE_SIZE) as f32, (cy * TILE_SIZE) as f32);
        match kind {
            ActorKind::Message => {
                self.message = Some(Message::new(x, y));
                return code;
            }
            ActorKind::FallFloor => {
                self.add_fall_floor(x, y, (cx, cy));
                return code;
            }
            ActorKind::BigChest => self.big_chest = Some(BigChest::new(x, y)),
            ActorKind::Key => {
                if !self.session.has_fruit() {
                    self.key = Some(Key::new(x, y));
                }
            }
            ActorKind::Chest => self.chest_init(x, y),
            ActorKind::Fruit => self.fruit_init(x, y),
            ActorKind::FlyFruit => self.fly_fruit_init(x, y),
            ActorKind::PlayerSpawn => self.player_spawn_init(cx, cy),
            ActorKind::FakeWall => self.fake_wall_init(x, y),
            ActorKind::Spring => self.add_spring(x, y),
            ActorKind::Balloon => self.add_balloon(x, y),
            ActorKind::Flag => self.flag = Some(Flag::new(x, y, self.session.fruit_count())),
            ActorKind::Platform => {
                let dir = if code == spawn_code::PLATFORM_LEFT { -1 } else { 1 };
                self.add_platform(x, y, dir);
            }
            _ => return code,
        }
        0
    }

    /// Advance to the next room and record progress.
    pub fn next_room(&mut self) {
        let next = self.session.room.next();
        if let Some(track) = track_for_room(next) {
            self.music(Some(track), 500, 7);
        }
        self.load_room(next);
        self.persist();
    }

    /// Reload the current room after [`RESTART_DELAY`] ticks.
    pub fn restart_room(&mut self) {
        self.will_restart = true;
        self.delay_restart = RESTART_DELAY;
    }

    /// Wipe the run and show the title room.
    pub fn title_screen(&mut self) {
        if let Err(e) = self.store.erase() {
            warn!("[Summit save] Failed to erase save: {e}");
        }
        self.session = Session::default();
        self.start_game = false;
        self.start_game_flash = 0;
        self.new_bg = false;
        self.music(Some(40), 0, 7);
        self.load_room(RoomCoord::TITLE);
        self.player_spawn = None;
    }

    pub fn begin_game(&mut self) {
        self.session.reset_clock();
        self.music_timer = 0;
        self.start_game = false;
        self.music(Some(0), 0, 7);
        self.load_room(RoomCoord::START);
    }

    fn persist(&mut self) {
        let record = self.session.record();
        if let Err(e) = self.store.save(&record) {
            warn!("[Summit save] {e}");
        }
    }

    // ---------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------

    /// One 30 Hz frame: the update phase, then the late phase that moves
    /// effects and carries platforms.
    pub fn tick(&mut self, input: ButtonState) {
        self.input = input;
        self.ticks += 1;

        if input.pressed(Button::Start) && self.session.room.index() < SUMMIT_INDEX {
            self.paused = !self.paused;
            debug!("[Summit world] Paused: {}", self.paused);
        }
        if !self.paused {
            self.update();
            if input.pressed(Button::Select) {
                self.can_shake = !self.can_shake;
            }
        }
        let reset_combo = [Button::Select, Button::Start, Button::L, Button::R]
            .into_iter()
            .all(|b| input.held(b));
        if reset_combo && !self.session.room.is_title() {
            info!("[Summit world] Reset to title");
            self.paused = false;
            self.title_screen();
        }
        if !self.paused && self.freeze == 0 {
            self.late_update();
        }
    }

    fn update(&mut self) {
        self.session.frames = (self.session.frames + 1) % TICKS_PER_SECOND;
        if self.session.frames == 0 && self.session.room.index() < SUMMIT_INDEX {
            self.session.seconds = (self.session.seconds + 1) % 60;
            if self.session.seconds == 0 {
                self.session.minutes = self.session.minutes.wrapping_add(1);
            }
        }

        if self.music_timer > 0 {
            self.music_timer -= 1;
            if self.music_timer == 0 {
                self.music(Some(10), 0, 7);
            }
        }
        if self.sfx_timer > 0 {
            self.sfx_timer -= 1;
        }

        if self.freeze > 0 {
            self.freeze -= 1;
            return;
        }

        if self.shake > 0 {
            self.shake -= 1;
            self.camera = (0, 0);
            if self.can_shake && self.shake > 0 {
                self.camera = (-2 - self.rng.rndi(5), -2 + self.rng.rndi(5));
            }
        }

        if self.will_restart && self.delay_restart > 0 {
            self.delay_restart -= 1;
            if self.delay_restart == 0 {
                self.will_restart = false;
                debug!("[Summit world] Restarting room");
                self.load_room(self.session.room);
            }
        }

        self.update_player_spawn();
        if self.player.is_some() {
            self.move_player();
            self.update_player();
        }
        self.update_key();
        self.update_chest();
        self.update_fruit();
        self.update_fly_fruit();
        self.update_fake_wall();
        for i in 0..MAX_FALL_FLOORS {
            self.update_fall_floor(i);
        }
        for i in 0..MAX_SPRINGS {
            self.update_spring(i);
        }
        for i in 0..MAX_BALLOONS {
            self.update_balloon(i);
        }
        self.update_title();
    }

    fn update_title(&mut self) {
        if !self.session.room.is_title() {
            return;
        }
        let input = self.input;
        if !self.start_game
            && (input.held(Button::Jump) || input.held(Button::Dash) || input.pressed(Button::Start))
        {
            self.music(None, 0, 0);
            self.start_game_flash = 50;
            self.start_game = true;
            self.sfx(38);
            if input.held(Button::L) && input.held(Button::R) {
                self.session.cheated = true;
            }
        }
        if self.start_game {
            self.start_game_flash -= 1;
            if self.start_game_flash <= -30 {
                self.begin_game();
                if self.session.cheated {
                    self.session.max_djump = 2;
                }
            }
        }
    }

    fn late_update(&mut self) {
        self.update_flag();
        self.update_message();
        self.update_lifeup();
        self.update_room_title();
        self.update_smoke();
        self.ease_spawn_hair();
        if self.player.is_some() {
            self.late_update_player();
        } else if !self.dead_particles.is_empty() {
            self.update_dead_particles();
        }
        self.update_orb();
        for i in 0..MAX_PLATFORMS {
            self.update_platform(i);
        }
        self.update_big_chest();
        for particle in &mut self.particles {
            particle.advance(&mut self.rng);
        }
    }

    // ---------------------------------------------------------------
    // Draw
    // ---------------------------------------------------------------

    /// Emit the current frame. Returns false while frozen, in which case the
    /// previous frame should stay on screen.
    pub fn draw(&self, gfx: &mut dyn Graphics) -> bool {
        if self.freeze > 0 {
            return false;
        }
        let frames = self.frames();
        gfx.camera(self.camera.0, self.camera.1);
        gfx.pal_reset(PaletteMask::all());
        gfx.pal(15, 0, PaletteMask::BG);

        if self.session.room.is_title() {
            gfx.pal(1, 0, PaletteMask::BG);
            gfx.print("press start", 42, 80, 5);
            gfx.print("matt thorson", 40, 96, 5);
            gfx.print("noel berry", 44, 102, 5);
        }

        if self.start_game {
            let c = if self.start_game_flash > 10 {
                if frames % 10 < 5 {
                    7
                } else {
                    10
                }
            } else if self.start_game_flash > 5 {
                2
            } else if self.start_game_flash > 0 {
                1
            } else {
                0
            };
            if c < 10 {
                let targets = PaletteMask::BG | PaletteMask::SPRITES | PaletteMask::TEXT;
                for from in [6, 12, 13, 5, 1, 7] {
                    gfx.pal(from, c, targets);
                }
            }
            gfx.pal(1, 0, PaletteMask::BG);
        }

        let mut bg = 0;
        if self.flash_bg {
            bg = frames / 5;
        } else if self.new_bg {
            bg = 2;
            gfx.pal(1, 14, PaletteMask::BG);
        }
        gfx.rectfill(0, 0, ROOM_CELLS, ROOM_CELLS, None);
        gfx.background(bg);

        self.draw_flag(gfx);
        self.draw_message(gfx);
        self.draw_lifeup(gfx);
        self.draw_room_title(gfx);
        self.draw_fruit(gfx);
        self.draw_fly_fruit(gfx);
        self.draw_smoke(gfx);
        self.draw_balloons(gfx);
        self.draw_player_spawn(gfx);
        if self.player.is_some() {
            self.draw_player(gfx);
        } else {
            self.draw_dead_particles(gfx);
        }
        self.draw_key(gfx);
        self.draw_chest(gfx);
        self.draw_orb(gfx);
        self.draw_fake_wall(gfx);
        self.draw_springs(gfx);
        self.draw_fall_floors(gfx);
        self.draw_platforms(gfx);
        self.draw_big_chest(gfx);
        for particle in &self.particles {
            particle.draw(gfx);
        }
        true
    }
}

#[cfg(test)]
mod tests;
