use bevy::log::info;
use bevy::prelude::*;
use serde::Serialize;

use crate::audio::AudioManager;
use crate::input::VirtualButtons;
use crate::world::{World, WorldPhase};

/// Coarse run state mirrored out of the simulation for the shell.
#[derive(Resource, Clone)]
pub struct RuntimeState {
    pub phase: WorldPhase,
    pub ticks: u64,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            phase: WorldPhase::Title,
            ticks: 0,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RuntimeStateSnapshot {
    pub phase: String,
    pub room: (u8, u8),
    pub level: usize,
    pub deaths: u16,
    pub fruit: u8,
    pub clock: String,
    pub paused: bool,
    pub ticks: u64,
}

pub fn snapshot(world: &World) -> RuntimeStateSnapshot {
    let session = world.session();
    RuntimeStateSnapshot {
        phase: format!("{:?}", world.phase()),
        room: (session.room.x, session.room.y),
        level: session.room.index(),
        deaths: session.deaths,
        fruit: session.fruit_count(),
        clock: crate::behaviors::flag::format_clock(session.minutes, session.seconds),
        paused: world.is_paused(),
        ticks: world.ticks(),
    }
}

/// Advance the simulation once per fixed step and flush its sounds.
fn tick_world(
    mut world: ResMut<World>,
    mut buttons: ResMut<VirtualButtons>,
    audio: Option<ResMut<AudioManager>>,
) {
    world.tick(buttons.take());
    match audio {
        Some(mut audio) => {
            audio.tick = world.ticks();
            world.drain_audio(&mut *audio);
        }
        None => {
            world.take_cues();
        }
    }
}

fn track_phase(world: Res<World>, mut runtime: ResMut<RuntimeState>) {
    runtime.ticks = world.ticks();
    let phase = world.phase();
    if phase == runtime.phase {
        return;
    }
    let snap = snapshot(&world);
    info!(
        "[Summit] {:?} -> {:?} in room ({}, {}) at {}",
        runtime.phase, phase, snap.room.0, snap.room.1, snap.clock
    );
    runtime.phase = phase;
}

pub struct RuntimePlugin;

impl Plugin for RuntimePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(RuntimeState::default())
            .add_systems(
                FixedUpdate,
                tick_world.run_if(resource_exists::<World>),
            )
            .add_systems(Update, track_phase.run_if(resource_exists::<World>));
    }
}
