use bitflags::bitflags;
use std::ops::RangeInclusive;

/// Cells per room side.
pub const ROOM_CELLS: i32 = 16;
pub const CELL_COUNT: usize = (ROOM_CELLS * ROOM_CELLS) as usize;
/// Pixels per cell side.
pub const TILE_SIZE: i32 = 8;

/// Tile codes with built-in hazard meaning, named by the way the points face.
pub const SPIKE_UP_CODE: u16 = 17;
pub const SPIKE_DOWN_CODE: u16 = 27;
pub const SPIKE_RIGHT_CODE: u16 = 43;
pub const SPIKE_LEFT_CODE: u16 = 59;

bitflags! {
    /// Per-code terrain attributes. The low byte mirrors the cartridge flag
    /// byte; spike bits are derived from the hazard codes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TileFlags: u16 {
        const SOLID = 1 << 0;
        const ICE = 1 << 4;
        const SPIKE_UP = 1 << 8;
        const SPIKE_DOWN = 1 << 9;
        const SPIKE_RIGHT = 1 << 10;
        const SPIKE_LEFT = 1 << 11;
    }
}

impl TileFlags {
    pub const SPIKES: TileFlags = TileFlags::SPIKE_UP
        .union(TileFlags::SPIKE_DOWN)
        .union(TileFlags::SPIKE_RIGHT)
        .union(TileFlags::SPIKE_LEFT);
}

/// Flag byte per tile code, indexed by the low 8 bits of the code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagTable {
    flags: [TileFlags; 256],
}

impl Default for FlagTable {
    fn default() -> Self {
        Self::from_raw(&[])
    }
}

impl FlagTable {
    /// Build from cartridge flag bytes. Missing entries read as empty.
    pub fn from_raw(raw: &[u8]) -> Self {
        let mut flags = [TileFlags::empty(); 256];
        for (code, slot) in flags.iter_mut().enumerate() {
            let byte = raw.get(code).copied().unwrap_or(0);
            *slot = TileFlags::from_bits_truncate(u16::from(byte));
        }
        flags[SPIKE_UP_CODE as usize] |= TileFlags::SPIKE_UP;
        flags[SPIKE_DOWN_CODE as usize] |= TileFlags::SPIKE_DOWN;
        flags[SPIKE_RIGHT_CODE as usize] |= TileFlags::SPIKE_RIGHT;
        flags[SPIKE_LEFT_CODE as usize] |= TileFlags::SPIKE_LEFT;
        Self { flags }
    }

    pub fn get(&self, code: u16) -> TileFlags {
        self.flags[usize::from(code & 0xff)]
    }

    pub fn has_flag(&self, code: u16, flag: TileFlags) -> bool {
        self.get(code).intersects(flag)
    }
}

/// The live 16x16 cell grid of the current room.
#[derive(Clone, Debug)]
pub struct RoomGrid {
    cells: [u16; CELL_COUNT],
    flags: FlagTable,
    revision: u64,
}

impl RoomGrid {
    pub fn new(flags: FlagTable) -> Self {
        Self {
            cells: [0; CELL_COUNT],
            flags,
            revision: 0,
        }
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }

    pub fn cells(&self) -> &[u16; CELL_COUNT] {
        &self.cells
    }

    /// Bumped on every write so renderers know when to rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Tile code at a cell. Coordinates are clamped into the room.
    pub fn tile_at(&self, cx: i32, cy: i32) -> u16 {
        let cx = cx.clamp(0, ROOM_CELLS - 1);
        let cy = cy.clamp(0, ROOM_CELLS - 1);
        self.cells[(cy * ROOM_CELLS + cx) as usize]
    }

    /// Writes outside the room are ignored.
    pub fn set_tile(&mut self, cx: i32, cy: i32, code: u16) {
        if (0..ROOM_CELLS).contains(&cx) && (0..ROOM_CELLS).contains(&cy) {
            self.cells[(cy * ROOM_CELLS + cx) as usize] = code;
            self.revision += 1;
        }
    }

    /// True when any cell touched by the pixel rectangle carries `flag`.
    pub fn region_has_flag(&self, px: i32, py: i32, w: i32, h: i32, flag: TileFlags) -> bool {
        let (Some(xs), Some(ys)) = (cell_span(px, w), cell_span(py, h)) else {
            return false;
        };
        for cx in xs {
            if ys.clone().any(|cy| self.flags.has_flag(self.tile_at(cx, cy), flag)) {
                return true;
            }
        }
        false
    }

    pub fn solid_at(&self, px: i32, py: i32, w: i32, h: i32) -> bool {
        self.region_has_flag(px, py, w, h, TileFlags::SOLID)
    }

    pub fn ice_at(&self, px: i32, py: i32, w: i32, h: i32) -> bool {
        self.region_has_flag(px, py, w, h, TileFlags::ICE)
    }

    /// Directional hazard test. A spike only kills a body entering it against
    /// its points and close enough to the spiked edge of the cell.
    pub fn spikes_at(&self, px: i32, py: i32, w: i32, h: i32, xspd: f32, yspd: f32) -> bool {
        let (Some(xs), Some(ys)) = (cell_span(px, w), cell_span(py, h)) else {
            return false;
        };
        for cx in xs {
            for cy in ys.clone() {
                let flags = self.flags.get(self.tile_at(cx, cy));
                if !flags.intersects(TileFlags::SPIKES) {
                    continue;
                }
                let bottom = py + h;
                let right = px + w;
                if flags.contains(TileFlags::SPIKE_UP)
                    && ((bottom - 1).rem_euclid(TILE_SIZE) >= 6 || bottom == cy * TILE_SIZE + TILE_SIZE)
                    && yspd >= 0.0
                {
                    return true;
                }
                if flags.contains(TileFlags::SPIKE_DOWN)
                    && py.rem_euclid(TILE_SIZE) <= 2
                    && yspd <= 0.0
                {
                    return true;
                }
                if flags.contains(TileFlags::SPIKE_RIGHT)
                    && px.rem_euclid(TILE_SIZE) <= 2
                    && xspd <= 0.0
                {
                    return true;
                }
                if flags.contains(TileFlags::SPIKE_LEFT)
                    && ((right - 1).rem_euclid(TILE_SIZE) >= 6 || right == cx * TILE_SIZE + TILE_SIZE)
                    && xspd >= 0.0
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Cells covered by `[p, p + len)`, clamped to the room.
fn cell_span(p: i32, len: i32) -> Option<RangeInclusive<i32>> {
    let lo = p.div_euclid(TILE_SIZE).max(0);
    let hi = (p + len - 1).div_euclid(TILE_SIZE).min(ROOM_CELLS - 1);
    (len > 0 && lo <= hi).then_some(lo..=hi)
}
