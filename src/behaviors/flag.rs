use bevy::log::info;

use crate::actor::{Actor, ActorKind};
use crate::host::{Button, Graphics, PaletteMask, SpriteFlip};
use crate::world::{Session, World};

pub const FLAG_SPRITE: u16 = 118;
pub const MEMORIAL_TEXT: &str =
    "-- celeste mountain --#this memorial to those# perished on the climb";
const DEATHS_CAP: u16 = 9999;

/// `hh:mm:ss` for a run clock. Hours come from whole minutes.
pub fn format_clock(minutes: u8, seconds: u8) -> String {
    format!("{:02}:{:02}:{:02}", minutes / 60, minutes % 60, seconds)
}

/// Death line of the summit card. A cheated run swaps the label.
pub fn deaths_label(deaths: u16, cheated: bool) -> String {
    let label = if cheated { "cheater" } else { "deaths:" };
    format!("{label}{}", deaths.min(DEATHS_CAP))
}

fn draw_time(gfx: &mut dyn Graphics, session: &Session, x: i32, y: i32) {
    gfx.print(&format_clock(session.minutes, session.seconds), x + 1, y + 1, 7);
}

/// Summit flag. Touching it shows the run summary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flag {
    pub actor: Actor,
    pub score: u8,
    pub show: bool,
}

impl Flag {
    pub fn new(x: f32, y: f32, score: u8) -> Self {
        Self {
            actor: Actor::new(ActorKind::Flag, x + 5.0, y),
            score,
            show: false,
        }
    }
}

/// Memorial sign that types its text while the player stands beside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Message {
    pub actor: Actor,
    /// Characters revealed so far.
    pub index: usize,
    pub lines: u8,
    /// Characters revealed on the current line.
    pub len: u8,
}

impl Message {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            actor: Actor::new(ActorKind::Message, x, y),
            index: 0,
            lines: 1,
            len: 0,
        }
    }

    pub fn revealed(&self) -> &'static str {
        &MEMORIAL_TEXT[..self.index.min(MEMORIAL_TEXT.len())]
    }

    fn reset(&mut self) {
        self.index = 0;
        self.lines = 1;
        self.len = 0;
    }
}

/// Room name card shown shortly after a room loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomTitle {
    pub delay: i8,
}

impl RoomTitle {
    pub fn new() -> Self {
        Self { delay: 5 }
    }

    pub fn is_visible(&self) -> bool {
        self.delay < 0
    }
}

impl Default for RoomTitle {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub(crate) fn update_flag(&mut self) {
        let frames = self.frames();
        let Some(flag) = self.flag.as_mut() else {
            return;
        };
        flag.actor.spr = FLAG_SPRITE + u16::from((frames / 5) % 3);
        if flag.show {
            if self.input.pressed(Button::Start) {
                self.title_screen();
            }
            return;
        }
        let actor = flag.actor;
        if self.touches_player(&actor, 0, 0) {
            self.sfx(55);
            self.sfx_timer = 30;
            if let Some(flag) = self.flag.as_mut() {
                flag.show = true;
            }
            info!(
                "[Summit world] Summit reached: {} fruit, {}, {} deaths",
                self.session.fruit_count(),
                format_clock(self.session.minutes, self.session.seconds),
                self.session.deaths
            );
        }
    }

    pub(crate) fn draw_flag(&self, gfx: &mut dyn Graphics) {
        let Some(flag) = &self.flag else {
            return;
        };
        if let Some(p) = &self.player {
            let x = p.actor.pos.x;
            let diff = if x > 64.0 { 128.0 - x } else { x };
            let width = if diff > 36.0 {
                3
            } else if diff > 24.0 {
                2
            } else if diff > 12.0 {
                1
            } else {
                0
            };
            if width > 0 {
                gfx.rectfill(0, 0, width, 16, Some(0));
                gfx.rectfill(16 - width, 0, width, 16, Some(0));
            }
        }

        let plain = PaletteMask::empty();
        let flip = SpriteFlip::default();
        gfx.spr(flag.actor.spr, flag.actor.px(), flag.actor.py(), 2, plain, flip);
        if !flag.show {
            return;
        }
        gfx.rectfill(4, 1, 8, 4, Some(0));
        gfx.spr(26, 55, 12, 0, plain, flip);
        gfx.print(&format!("x{}", flag.score), 60, 15, 7);
        draw_time(gfx, &self.session, 45, 22);

        let deaths = self.session.deaths;
        let xoff = match deaths {
            0..=9 => -2,
            10..=99 => 0,
            100..=999 => 2,
            _ => 4,
        };
        gfx.print(&deaths_label(deaths, self.session.cheated), 44 - xoff, 30, 7);
    }

    pub(crate) fn update_message(&mut self) {
        let frames = self.frames();
        let Some(message) = self.message else {
            return;
        };
        let reading = self.touches_player(&message.actor, 4, 0);
        let mut typed = false;
        if let Some(message) = self.message.as_mut() {
            if !reading {
                message.reset();
                return;
            }
            if message.index < MEMORIAL_TEXT.len() {
                if frames % 2 == 0 {
                    message.index += 1;
                    message.len = message.len.saturating_add(1);
                    if MEMORIAL_TEXT.as_bytes().get(message.index) == Some(&b'#') {
                        message.lines += 1;
                        message.len = 0;
                    }
                }
                typed = frames % 3 == 0;
            }
        }
        if typed {
            self.sfx(35);
        }
    }

    pub(crate) fn draw_message(&self, gfx: &mut dyn Graphics) {
        let Some(message) = &self.message else {
            return;
        };
        if message.index == 0 && message.lines == 1 {
            return;
        }
        for i in 0..message.lines {
            let w = if i + 1 < message.lines {
                12
            } else {
                (i32::from(message.len) / 2 + 1).min(12)
            };
            gfx.rectfill(2, 11, w, i32::from(i) + 1, Some(7));
        }
        gfx.print(message.revealed(), 16, 89, 0);
    }

    pub(crate) fn update_room_title(&mut self) {
        let Some(title) = self.room_title.as_mut() else {
            return;
        };
        title.delay -= 1;
        if title.delay < -30 {
            self.room_title = None;
        }
    }

    pub(crate) fn draw_room_title(&self, gfx: &mut dyn Graphics) {
        let Some(title) = &self.room_title else {
            return;
        };
        if !title.is_visible() {
            return;
        }
        gfx.rectfill(1, 1, 5, 1, Some(0));
        gfx.rectfill(3, 7, 10, 2, Some(0));
        let room = self.session.room;
        if room.x == 3 && room.y == 1 {
            gfx.print("old site", 48, 62, 7);
        } else if room.is_summit() {
            gfx.print("summit", 52, 62, 7);
        } else {
            let level = (1 + room.index() as u32) * 100;
            let x = if level < 1000 { 50 } else { 52 };
            gfx.print(&format!("{level} m"), x, 62, 7);
        }
        draw_time(gfx, &self.session, 8, 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_splits_hours_from_minutes() {
        assert_eq!(format_clock(0, 7), "00:00:07");
        assert_eq!(format_clock(61, 30), "01:01:30");
        assert_eq!(format_clock(255, 59), "04:15:59");
    }

    #[test]
    fn death_line_caps_and_marks_cheaters() {
        assert_eq!(deaths_label(3, false), "deaths:3");
        assert_eq!(deaths_label(12_000, false), "deaths:9999");
        assert_eq!(deaths_label(42, true), "cheater42");
    }

    #[test]
    fn message_reveals_prefix() {
        let mut message = Message::new(0.0, 0.0);
        assert_eq!(message.revealed(), "");
        message.index = 5;
        assert_eq!(message.revealed(), "-- ce");
        message.index = 500;
        assert_eq!(message.revealed(), MEMORIAL_TEXT);
    }

    #[test]
    fn room_title_waits_before_showing() {
        let mut title = RoomTitle::new();
        assert!(!title.is_visible());
        title.delay = -1;
        assert!(title.is_visible());
    }
}
