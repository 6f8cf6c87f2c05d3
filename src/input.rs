use bevy::prelude::*;

use crate::host::{Button, ButtonSet, ButtonState};

/// Abstraction layer between raw input and the fixed tick.
/// Keyboard (windowed) and scripted runs (headless) both write to this.
///
/// Render frames outnumber ticks, so presses are latched until a tick
/// consumes them.
#[derive(Resource, Default, Clone, Copy)]
pub struct VirtualButtons {
    pub held: ButtonSet,
    latched: ButtonSet,
    previous: ButtonSet,
}

impl VirtualButtons {
    /// Replace the held set, latching anything that went down.
    pub fn set_held(&mut self, held: ButtonSet) {
        self.latched |= held.difference(self.previous);
        self.previous = held;
        self.held = held;
    }

    /// Buttons for one tick. Clears the latched presses.
    pub fn take(&mut self) -> ButtonState {
        let state = ButtonState {
            held: self.held | self.latched,
            pressed: self.latched,
        };
        self.latched = ButtonSet::empty();
        state
    }
}

const KEYMAP: &[(KeyCode, Button)] = &[
    (KeyCode::ArrowLeft, Button::Left),
    (KeyCode::ArrowRight, Button::Right),
    (KeyCode::ArrowUp, Button::Up),
    (KeyCode::ArrowDown, Button::Down),
    (KeyCode::KeyZ, Button::Jump),
    (KeyCode::KeyC, Button::Jump),
    (KeyCode::KeyX, Button::Dash),
    (KeyCode::KeyV, Button::Dash),
    (KeyCode::Enter, Button::Start),
    (KeyCode::Tab, Button::Select),
    (KeyCode::KeyQ, Button::L),
    (KeyCode::KeyE, Button::R),
];

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(VirtualButtons::default()).add_systems(
            PreUpdate,
            keyboard_to_virtual.run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
    }
}

/// Translate keyboard state into logical buttons.
fn keyboard_to_virtual(keyboard: Res<ButtonInput<KeyCode>>, mut buttons: ResMut<VirtualButtons>) {
    let held = KEYMAP
        .iter()
        .filter(|(key, _)| keyboard.pressed(*key))
        .fold(ButtonSet::empty(), |set, (_, button)| set | ButtonSet::from(*button));
    buttons.set_held(held);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_survives_until_taken() {
        let mut buttons = VirtualButtons::default();
        buttons.set_held(Button::Jump.into());
        buttons.set_held(Button::Jump.into());
        let state = buttons.take();
        assert!(state.pressed(Button::Jump));
        assert!(state.held(Button::Jump));

        let state = buttons.take();
        assert!(!state.pressed(Button::Jump));
        assert!(state.held(Button::Jump));
    }

    #[test]
    fn tap_between_ticks_still_registers() {
        let mut buttons = VirtualButtons::default();
        buttons.set_held(Button::Dash.into());
        buttons.set_held(ButtonSet::empty());
        let state = buttons.take();
        assert!(state.pressed(Button::Dash));
        assert!(state.held(Button::Dash));
    }

    #[test]
    fn keyboard_system_maps_keys() {
        let mut app = App::new();
        app.insert_resource(ButtonInput::<KeyCode>::default())
            .add_plugins(InputPlugin);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyX);
        app.update();
        let state = app.world_mut().resource_mut::<VirtualButtons>().take();
        assert!(state.pressed(Button::Dash));
        assert!(!state.held(Button::Jump));
    }
}
