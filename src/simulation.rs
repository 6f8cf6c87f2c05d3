use serde::{Deserialize, Serialize};

use crate::cartridge::{Cartridge, RoomCoord};
use crate::host::{Button, ButtonSet, ButtonState};
use crate::player::DASH_TICKS;
use crate::save::MemorySaveStore;
use crate::world::World;

#[derive(Deserialize, Clone)]
pub struct SimulationRequest {
    /// Room to start in; the spawn sequence plays as on a normal load.
    #[serde(default)]
    pub room: Option<RoomCoord>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub max_djump: Option<u8>,
    pub inputs: Vec<SimInput>,
    pub max_frames: u32,
    #[serde(default = "default_record_interval")]
    pub record_interval: u32,
}

fn default_record_interval() -> u32 {
    1
}

#[derive(Deserialize, Clone)]
pub struct SimInput {
    pub frame: u32,
    pub button: String,
    #[serde(default)]
    pub duration: u32,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SimulationResult {
    pub outcome: String,
    pub frames_elapsed: u32,
    pub trace: Vec<TraceFrame>,
    pub events: Vec<SimEvent>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TraceFrame {
    pub frame: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub djump: u8,
    pub grounded: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SimEvent {
    pub frame: u32,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<(u8, u8)>,
}

impl SimEvent {
    fn new(frame: u32, event_type: &str) -> Self {
        Self {
            frame,
            event_type: event_type.to_string(),
            x: None,
            y: None,
            room: None,
        }
    }
}

pub fn parse_request(text: &str) -> Result<SimulationRequest, String> {
    let request: SimulationRequest =
        serde_json::from_str(text).map_err(|e| format!("invalid simulation request: {e}"))?;
    if request.max_frames == 0 {
        return Err("max_frames must be positive".to_string());
    }
    for input in &request.inputs {
        if Button::from_name(&input.button).is_none() {
            return Err(format!("unknown button '{}'", input.button));
        }
    }
    Ok(request)
}

/// Held buttons for every frame, expanded from the scripted inputs.
fn expand_inputs(request: &SimulationRequest) -> Vec<ButtonSet> {
    let mut frames = vec![ButtonSet::empty(); request.max_frames as usize];
    for input in &request.inputs {
        let Some(button) = Button::from_name(&input.button) else {
            continue;
        };
        let duration = input.duration.max(1);
        let end = input.frame.saturating_add(duration).min(request.max_frames);
        for f in input.frame..end {
            frames[f as usize] |= ButtonSet::from(button);
        }
    }
    frames
}

/// Run a scripted session against a fresh world with throwaway persistence.
pub fn run_simulation(cart: &Cartridge, request: &SimulationRequest) -> SimulationResult {
    let mut world = World::new(cart.clone(), Box::new(MemorySaveStore::default()), request.seed);
    if let Some(max_djump) = request.max_djump {
        world.session.max_djump = max_djump.clamp(1, 2);
    }
    world.load_room(request.room.unwrap_or(RoomCoord::START));

    let held_per_frame = expand_inputs(request);
    let interval = request.record_interval.max(1);
    let mut trace = Vec::new();
    let mut events = Vec::new();
    let mut outcome = "timeout";
    let mut previous = ButtonSet::empty();
    let mut frames_elapsed = request.max_frames;

    for (frame, held) in held_per_frame.iter().copied().enumerate() {
        let frame = frame as u32;
        let before_room = world.room();
        let before_deaths = world.session().deaths;
        let before_fruit = world.session().fruit_count();
        let had_player = world.player().is_some();

        world.tick(ButtonState::from_transition(previous, held));
        world.take_cues();
        previous = held;

        if let Some(p) = world.player() {
            if !had_player {
                let mut ev = SimEvent::new(frame, "spawn");
                ev.x = Some(p.actor.pos.x);
                ev.y = Some(p.actor.pos.y);
                events.push(ev);
            }
            if p.dash_time == DASH_TICKS {
                let mut ev = SimEvent::new(frame, "dash");
                ev.x = Some(p.actor.pos.x);
                ev.y = Some(p.actor.pos.y);
                events.push(ev);
            }
            if frame % interval == 0 {
                trace.push(TraceFrame {
                    frame,
                    x: p.actor.pos.x,
                    y: p.actor.pos.y,
                    vx: p.actor.spd.x,
                    vy: p.actor.spd.y,
                    djump: p.djump,
                    grounded: world.is_solid_for(&p.actor, 0, 1),
                });
            }
        }
        if world.session().fruit_count() > before_fruit {
            events.push(SimEvent::new(frame, "fruit"));
        }
        if world.room() != before_room {
            let mut ev = SimEvent::new(frame, "room_changed");
            ev.room = Some((world.room().x, world.room().y));
            events.push(ev);
        }
        if world.session().deaths > before_deaths {
            events.push(SimEvent::new(frame, "death"));
            outcome = "death";
            frames_elapsed = frame + 1;
            break;
        }
        if world.flag().is_some_and(|f| f.show) {
            events.push(SimEvent::new(frame, "summit"));
            outcome = "summit";
            frames_elapsed = frame + 1;
            break;
        }
    }

    SimulationResult {
        outcome: outcome.to_string(),
        frames_elapsed,
        trace,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::spawn_code;
    use crate::cartridge::{GROUND, ROOM_COUNT};
    use crate::tiles::{ROOM_CELLS, SPIKE_UP_CODE};

    fn floor_cart() -> Cartridge {
        let mut cart = Cartridge::blank();
        cart.flags[usize::from(GROUND)] = 1;
        for index in 0..ROOM_COUNT {
            let room = RoomCoord::new((index % 8) as u8, (index / 8) as u8);
            for cx in 0..ROOM_CELLS {
                cart.set_cell(room, cx, 15, GROUND);
            }
            cart.set_cell(room, 2, 14, spawn_code::PLAYER_SPAWN);
        }
        cart
    }

    fn request(json: &str) -> SimulationRequest {
        parse_request(json).expect("request")
    }

    #[test]
    fn rejects_unknown_buttons_and_empty_runs() {
        let err = parse_request(r#"{"inputs":[{"frame":0,"button":"fly"}],"max_frames":5}"#)
            .err()
            .expect("should fail");
        assert!(err.contains("unknown button"));
        assert!(parse_request(r#"{"inputs":[],"max_frames":0}"#).is_err());
    }

    #[test]
    fn inputs_expand_over_duration() {
        let req = request(
            r#"{"inputs":[{"frame":2,"button":"right","duration":3},{"frame":3,"button":"jump"}],"max_frames":10}"#,
        );
        let frames = expand_inputs(&req);
        assert_eq!(frames[1], ButtonSet::empty());
        assert_eq!(frames[2], ButtonSet::RIGHT);
        assert_eq!(frames[3], ButtonSet::RIGHT | ButtonSet::JUMP);
        assert_eq!(frames[5], ButtonSet::empty());
    }

    #[test]
    fn idle_run_spawns_and_times_out() {
        let req = request(r#"{"inputs":[],"max_frames":120,"record_interval":10}"#);
        let result = run_simulation(&floor_cart(), &req);
        assert_eq!(result.outcome, "timeout");
        assert_eq!(result.frames_elapsed, 120);
        assert!(result.events.iter().any(|ev| ev.event_type == "spawn"));
        assert!(result.trace.iter().all(|t| t.frame % 10 == 0));
        let last = result.trace.last().expect("trace");
        assert!(last.grounded);
    }

    #[test]
    fn walking_into_spikes_ends_in_death() {
        let mut cart = floor_cart();
        for cx in 4..8 {
            cart.set_cell(RoomCoord::START, cx, 14, SPIKE_UP_CODE);
        }
        let req = request(
            r#"{"inputs":[{"frame":60,"button":"right","duration":120}],"max_frames":300}"#,
        );
        let result = run_simulation(&cart, &req);
        assert_eq!(result.outcome, "death");
        assert!(result.frames_elapsed < 300);
        assert_eq!(
            result.events.last().map(|ev| ev.event_type.as_str()),
            Some("death")
        );
    }

    #[test]
    fn result_serializes_with_type_tags() {
        let result = SimulationResult {
            outcome: "timeout".to_string(),
            frames_elapsed: 1,
            trace: Vec::new(),
            events: vec![SimEvent::new(0, "spawn")],
        };
        let json = serde_json::to_value(&result).expect("json");
        assert_eq!(json["events"][0]["type"], "spawn");
        assert!(json["events"][0].get("x").is_none());
    }
}
