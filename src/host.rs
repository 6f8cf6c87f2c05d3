//! Boundary between the simulation and whatever presents it.
//!
//! The world reads a [`ButtonState`] each tick, emits draw calls through
//! [`Graphics`], and flushes queued [`AudioCue`]s to an [`Audio`] sink.

use bitflags::bitflags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Dash,
    Start,
    Select,
    L,
    R,
}

impl Button {
    /// Parse a scripted button name such as `"jump"` or `"left"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.trim().to_ascii_lowercase().as_str() {
            "left" => Button::Left,
            "right" => Button::Right,
            "up" => Button::Up,
            "down" => Button::Down,
            "jump" => Button::Jump,
            "dash" => Button::Dash,
            "start" => Button::Start,
            "select" => Button::Select,
            "l" => Button::L,
            "r" => Button::R,
            _ => return None,
        };
        Some(button)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ButtonSet: u16 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const JUMP = 1 << 4;
        const DASH = 1 << 5;
        const START = 1 << 6;
        const SELECT = 1 << 7;
        const L = 1 << 8;
        const R = 1 << 9;
    }
}

impl From<Button> for ButtonSet {
    fn from(button: Button) -> Self {
        match button {
            Button::Left => ButtonSet::LEFT,
            Button::Right => ButtonSet::RIGHT,
            Button::Up => ButtonSet::UP,
            Button::Down => ButtonSet::DOWN,
            Button::Jump => ButtonSet::JUMP,
            Button::Dash => ButtonSet::DASH,
            Button::Start => ButtonSet::START,
            Button::Select => ButtonSet::SELECT,
            Button::L => ButtonSet::L,
            Button::R => ButtonSet::R,
        }
    }
}

/// Buttons for one tick: what is down, and what went down this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub held: ButtonSet,
    pub pressed: ButtonSet,
}

impl ButtonState {
    pub const NONE: ButtonState = ButtonState {
        held: ButtonSet::empty(),
        pressed: ButtonSet::empty(),
    };

    /// Derive edges from the previous tick's held set.
    pub fn from_transition(previous: ButtonSet, held: ButtonSet) -> Self {
        Self {
            held,
            pressed: held.difference(previous),
        }
    }

    pub fn held(&self, button: Button) -> bool {
        self.held.contains(button.into())
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.pressed.contains(button.into())
    }

    /// -1, 0 or 1 from left/right.
    pub fn axis_x(&self) -> i32 {
        i32::from(self.held(Button::Right)) - i32::from(self.held(Button::Left))
    }

    /// -1, 0 or 1 from up/down, positive downward.
    pub fn axis_y(&self) -> i32 {
        i32::from(self.held(Button::Down)) - i32::from(self.held(Button::Up))
    }

    pub fn with_held(mut self, button: Button) -> Self {
        self.held |= button.into();
        self
    }

    /// Held and newly pressed this tick.
    pub fn with_pressed(mut self, button: Button) -> Self {
        self.held |= button.into();
        self.pressed |= button.into();
        self
    }
}

bitflags! {
    /// Layers a draw call or palette swap applies to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PaletteMask: u8 {
        const BG = 1 << 0;
        const SPRITES = 1 << 1;
        const PLAYER = 1 << 2;
        const TEXT = 1 << 3;
        const OVERLAY = 1 << 4;
    }
}

/// Sprite orientation bits passed to [`Graphics::spr`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteFlip {
    pub x: bool,
    pub y: bool,
}

pub trait Graphics {
    /// Draw sprite `id` at pixel `(x, y)`; `layer` is the sort order.
    fn spr(&mut self, id: u16, x: i32, y: i32, layer: u8, palette: PaletteMask, flip: SpriteFlip);
    /// Fill a rectangle in 8px cells; `None` clears it.
    fn rectfill(&mut self, x: i32, y: i32, w: i32, h: i32, color: Option<u8>);
    fn print(&mut self, text: &str, x: i32, y: i32, color: u8);
    /// Offset applied to everything drawn after this call.
    fn camera(&mut self, x: i32, y: i32);
    /// Swap colour `from` for `to` on the given layers.
    fn pal(&mut self, _from: u8, _to: u8, _targets: PaletteMask) {}
    fn pal_reset(&mut self, _targets: PaletteMask) {}
    /// Solid background colour behind the room.
    fn background(&mut self, _color: u8) {}
}

pub trait Audio {
    fn sfx(&mut self, id: u8);
    /// `None` stops music.
    fn music(&mut self, track: Option<u8>, fade_ms: u16, channel_mask: u8);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Sfx(u8),
    Music {
        track: Option<u8>,
        fade_ms: u16,
        channel_mask: u8,
    },
}

impl AudioCue {
    pub fn play(self, audio: &mut dyn Audio) {
        match self {
            AudioCue::Sfx(id) => audio.sfx(id),
            AudioCue::Music {
                track,
                fade_ms,
                channel_mask,
            } => audio.music(track, fade_ms, channel_mask),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCall {
    Sprite {
        id: u16,
        x: i32,
        y: i32,
        layer: u8,
        palette: PaletteMask,
        flip: SpriteFlip,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Option<u8>,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        color: u8,
    },
    Camera {
        x: i32,
        y: i32,
    },
    Pal {
        from: u8,
        to: u8,
        targets: PaletteMask,
    },
    PalReset {
        targets: PaletteMask,
    },
    Background {
        color: u8,
    },
}

/// Records everything it is given. Backs the renderer's frame list and
/// is inspected directly in tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recorder {
    pub draws: Vec<DrawCall>,
    pub cues: Vec<AudioCue>,
}

impl Recorder {
    pub fn clear(&mut self) {
        self.draws.clear();
        self.cues.clear();
    }

    pub fn sfx_ids(&self) -> Vec<u8> {
        self.cues
            .iter()
            .filter_map(|cue| match cue {
                AudioCue::Sfx(id) => Some(*id),
                AudioCue::Music { .. } => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.draws
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn sprite_ids(&self) -> Vec<u16> {
        self.draws
            .iter()
            .filter_map(|call| match call {
                DrawCall::Sprite { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Graphics for Recorder {
    fn spr(&mut self, id: u16, x: i32, y: i32, layer: u8, palette: PaletteMask, flip: SpriteFlip) {
        self.draws.push(DrawCall::Sprite {
            id,
            x,
            y,
            layer,
            palette,
            flip,
        });
    }

    fn rectfill(&mut self, x: i32, y: i32, w: i32, h: i32, color: Option<u8>) {
        self.draws.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn print(&mut self, text: &str, x: i32, y: i32, color: u8) {
        self.draws.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn camera(&mut self, x: i32, y: i32) {
        self.draws.push(DrawCall::Camera { x, y });
    }

    fn pal(&mut self, from: u8, to: u8, targets: PaletteMask) {
        self.draws.push(DrawCall::Pal { from, to, targets });
    }

    fn pal_reset(&mut self, targets: PaletteMask) {
        self.draws.push(DrawCall::PalReset { targets });
    }

    fn background(&mut self, color: u8) {
        self.draws.push(DrawCall::Background { color });
    }
}

impl Audio for Recorder {
    fn sfx(&mut self, id: u8) {
        self.cues.push(AudioCue::Sfx(id));
    }

    fn music(&mut self, track: Option<u8>, fade_ms: u16, channel_mask: u8) {
        self.cues.push(AudioCue::Music {
            track,
            fade_ms,
            channel_mask,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_marks_only_new_presses() {
        let prev = ButtonSet::JUMP;
        let state = ButtonState::from_transition(prev, ButtonSet::JUMP | ButtonSet::DASH);
        assert!(state.held(Button::Jump));
        assert!(!state.pressed(Button::Jump));
        assert!(state.pressed(Button::Dash));
    }

    #[test]
    fn axes_cancel_when_both_held() {
        let state = ButtonState::NONE
            .with_held(Button::Left)
            .with_held(Button::Right)
            .with_held(Button::Down);
        assert_eq!(state.axis_x(), 0);
        assert_eq!(state.axis_y(), 1);
    }

    #[test]
    fn cues_replay_into_sink() {
        let mut sink = Recorder::default();
        AudioCue::Sfx(3).play(&mut sink);
        AudioCue::Music {
            track: None,
            fade_ms: 500,
            channel_mask: 7,
        }
        .play(&mut sink);
        assert_eq!(sink.sfx_ids(), vec![3]);
        assert_eq!(sink.cues.len(), 2);
    }
}
