use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::actor::spawn_code;
use crate::tiles::{FlagTable, CELL_COUNT, ROOM_CELLS, SPIKE_UP_CODE};

pub const ROOMS_X: u8 = 8;
pub const ROOMS_Y: u8 = 4;
pub const ROOM_COUNT: usize = ROOMS_X as usize * ROOMS_Y as usize;
pub const MAP_LEN: usize = ROOM_COUNT * CELL_COUNT;
pub const FLAG_LEN: usize = 256;
pub const SUMMIT_INDEX: usize = 30;
pub const TITLE_INDEX: usize = 31;

const EMBEDDED: &str = include_str!(concat!(env!("OUT_DIR"), "/summit_embedded_cartridge.json"));

/// Terrain codes used by the built-in cartridge.
pub const GROUND: u16 = 32;
pub const ICE_GROUND: u16 = 33;
pub const ROCK: u16 = 34;

/// A room's position on the 8x4 mountain map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCoord {
    pub x: u8,
    pub y: u8,
}

impl RoomCoord {
    pub const START: RoomCoord = RoomCoord { x: 0, y: 0 };
    pub const TITLE: RoomCoord = RoomCoord { x: 7, y: 3 };

    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Linear level number, 0 at the bottom of the climb.
    pub fn index(self) -> usize {
        usize::from(self.x % ROOMS_X) + usize::from(self.y) * usize::from(ROOMS_X)
    }

    pub fn is_title(self) -> bool {
        self.index() == TITLE_INDEX
    }

    pub fn is_summit(self) -> bool {
        self.index() == SUMMIT_INDEX
    }

    /// Rooms advance left to right, wrapping to the next row.
    pub fn next(self) -> Self {
        if self.x == ROOMS_X - 1 {
            Self::new(0, self.y + 1)
        } else {
            Self::new(self.x + 1, self.y)
        }
    }
}

/// Level data: 32 rooms of 16x16 tile codes plus one flag byte per code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cartridge {
    pub map: Vec<u16>,
    pub flags: Vec<u8>,
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::blank()
    }
}

impl Cartridge {
    pub fn blank() -> Self {
        Self {
            map: vec![0; MAP_LEN],
            flags: vec![0; FLAG_LEN],
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.map.len() != MAP_LEN {
            return Err(format!(
                "map has {} cells, expected {}",
                self.map.len(),
                MAP_LEN
            ));
        }
        if self.flags.len() != FLAG_LEN {
            return Err(format!(
                "flag table has {} entries, expected {}",
                self.flags.len(),
                FLAG_LEN
            ));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        let cart: Cartridge =
            serde_json::from_str(text).map_err(|e| format!("invalid cartridge JSON: {e}"))?;
        cart.validate()?;
        Ok(cart)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::from_json(&text)
    }

    /// Cartridge baked in at build time, if one was provided.
    pub fn embedded() -> Option<Self> {
        if EMBEDDED.trim() == "{}" {
            return None;
        }
        match Self::from_json(EMBEDDED) {
            Ok(cart) => Some(cart),
            Err(e) => {
                warn!("[Summit] Embedded cartridge rejected: {e}");
                None
            }
        }
    }

    /// Resolve the cartridge for a run: explicit path, then the embedded
    /// one, then the built-in demo.
    pub fn resolve(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::load(path) {
                Ok(cart) => {
                    info!("[Summit] Loaded cartridge from {}", path.display());
                    return cart;
                }
                Err(e) => warn!("[Summit] {e}; falling back"),
            }
        }
        Self::embedded().unwrap_or_else(|| {
            info!("[Summit] Using built-in demo cartridge");
            Self::demo()
        })
    }

    pub fn flag_table(&self) -> FlagTable {
        FlagTable::from_raw(&self.flags)
    }

    /// The 256 cells of one room. Rooms past the map read as empty.
    pub fn room_cells(&self, room: RoomCoord) -> [u16; CELL_COUNT] {
        let mut cells = [0; CELL_COUNT];
        let start = room.index() * CELL_COUNT;
        if let Some(window) = self.map.get(start..start + CELL_COUNT) {
            cells.copy_from_slice(window);
        }
        cells
    }

    pub fn set_cell(&mut self, room: RoomCoord, cx: i32, cy: i32, code: u16) {
        if !(0..ROOM_CELLS).contains(&cx) || !(0..ROOM_CELLS).contains(&cy) {
            return;
        }
        let i = room.index() * CELL_COUNT + (cy * ROOM_CELLS + cx) as usize;
        if let Some(cell) = self.map.get_mut(i) {
            *cell = code;
        }
    }

    /// A small playable mountain used when no cartridge is supplied.
    pub fn demo() -> Self {
        let mut cart = Self::blank();
        for code in [GROUND, ROCK, spawn_code::FALL_FLOOR, 24, 25] {
            cart.flags[usize::from(code)] = 1;
        }
        cart.flags[usize::from(ICE_GROUND)] = 1 | (1 << 4);

        for index in 0..ROOM_COUNT {
            let room = RoomCoord::new((index % 8) as u8, (index / 8) as u8);
            if index == TITLE_INDEX {
                for cx in 0..ROOM_CELLS {
                    cart.set_cell(room, cx, 15, ROCK);
                }
                continue;
            }
            cart.demo_shell(room);
            match index {
                SUMMIT_INDEX => cart.set_cell(room, 8, 13, spawn_code::FLAG),
                10 => {
                    cart.set_cell(room, 8, 13, spawn_code::BIG_CHEST);
                    cart.set_cell(room, 9, 13, spawn_code::BIG_CHEST_LID);
                }
                _ => cart.demo_feature(room, index % 6),
            }
        }
        cart
    }

    /// Walls, floor, and a staircase up to an open ceiling.
    fn demo_shell(&mut self, room: RoomCoord) {
        for c in 0..ROOM_CELLS {
            self.set_cell(room, c, 15, GROUND);
        }
        for cy in 3..15 {
            self.set_cell(room, 0, cy, ROCK);
            self.set_cell(room, 15, cy, ROCK);
        }
        for step in 0..6 {
            let cy = 13 - step * 2;
            let cx = if step % 2 == 0 { 10 } else { 4 };
            for dx in 0..3 {
                self.set_cell(room, cx + dx, cy, GROUND);
            }
        }
        self.set_cell(room, 2, 14, spawn_code::PLAYER_SPAWN);
    }

    fn demo_feature(&mut self, room: RoomCoord, variant: usize) {
        match variant {
            0 => {
                self.set_cell(room, 7, 8, spawn_code::FRUIT);
                self.set_cell(room, 6, 15, SPIKE_UP_CODE);
                self.set_cell(room, 6, 14, 0);
            }
            1 => {
                self.set_cell(room, 7, 14, spawn_code::SPRING);
                self.set_cell(room, 7, 15, spawn_code::FALL_FLOOR);
                self.set_cell(room, 8, 9, spawn_code::FALL_FLOOR);
            }
            2 => {
                self.set_cell(room, 7, 10, spawn_code::BALLOON);
                self.set_cell(room, 6, 6, spawn_code::PLATFORM_RIGHT);
            }
            3 => {
                self.set_cell(room, 11, 12, spawn_code::KEY);
                self.set_cell(room, 5, 14, spawn_code::CHEST);
            }
            4 => {
                self.set_cell(room, 8, 4, spawn_code::FLY_FRUIT);
                self.set_cell(room, 12, 11, spawn_code::FAKE_WALL);
            }
            _ => {
                for cx in 4..12 {
                    self.set_cell(room, cx, 15, ICE_GROUND);
                }
                self.set_cell(room, 12, 14, spawn_code::MESSAGE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_index_and_succession() {
        assert_eq!(RoomCoord::new(0, 0).index(), 0);
        assert_eq!(RoomCoord::new(7, 0).next(), RoomCoord::new(0, 1));
        assert_eq!(RoomCoord::new(3, 2).next(), RoomCoord::new(4, 2));
        assert!(RoomCoord::TITLE.is_title());
        assert!(RoomCoord::new(6, 3).is_summit());
    }

    #[test]
    fn validate_rejects_short_map() {
        let mut cart = Cartridge::blank();
        cart.map.truncate(100);
        assert!(cart.validate().is_err());
        let mut cart = Cartridge::blank();
        cart.flags.push(0);
        assert!(cart.validate().is_err());
    }

    #[test]
    fn json_round_trip_keeps_cells() {
        let cart = Cartridge::demo();
        let text = serde_json::to_string(&cart).unwrap();
        let back = Cartridge::from_json(&text).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn room_window_is_offset_by_index() {
        let mut cart = Cartridge::blank();
        cart.set_cell(RoomCoord::new(2, 1), 3, 4, 77);
        let cells = cart.room_cells(RoomCoord::new(2, 1));
        assert_eq!(cells[4 * 16 + 3], 77);
        assert!(cart.room_cells(RoomCoord::new(1, 1)).iter().all(|&c| c == 0));
        assert!(cart.room_cells(RoomCoord::new(0, 9)).iter().all(|&c| c == 0));
    }

    #[test]
    fn demo_rooms_have_a_spawn_except_title() {
        let cart = Cartridge::demo();
        cart.validate().unwrap();
        for index in 0..ROOM_COUNT {
            let room = RoomCoord::new((index % 8) as u8, (index / 8) as u8);
            let has_spawn = cart
                .room_cells(room)
                .contains(&spawn_code::PLAYER_SPAWN);
            assert_eq!(has_spawn, !room.is_title(), "room {index}");
        }
        assert!(cart.flag_table().has_flag(GROUND, crate::tiles::TileFlags::SOLID));
    }
}
