use std::collections::HashMap;

use bevy::audio::Volume;
use bevy::log::{debug, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::HeadlessMode;
use crate::host::Audio;

const MAX_AUDIO_EVENTS: usize = 256;

fn default_volume() -> f32 {
    1.0
}

fn default_looping() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SfxDefinition {
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MusicDefinition {
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

/// Sound tables from `game.json`, keyed by the ids the world plays.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub sfx: HashMap<u8, SfxDefinition>,
    #[serde(default)]
    pub music: HashMap<u8, MusicDefinition>,
    /// Channel gains by name: `master`, `sfx`, `music`.
    #[serde(default)]
    pub volumes: HashMap<String, f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioEventLog {
    pub tick: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_ms: Option<u16>,
}

/// Playback request for a resolved sound, drained by the windowed player.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayRequest {
    Sfx { path: String, volume: f32 },
    Music { path: String, volume: f32, looping: bool },
    StopMusic,
}

#[derive(Resource)]
pub struct AudioManager {
    pub sfx: HashMap<u8, SfxDefinition>,
    pub music: HashMap<u8, MusicDefinition>,
    pub current_music: Option<u8>,
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub recent_events: Vec<AudioEventLog>,
    pub pending: Vec<PlayRequest>,
    /// Tick stamped on logged events.
    pub tick: u64,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self {
            sfx: HashMap::new(),
            music: HashMap::new(),
            current_music: None,
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
            recent_events: Vec::new(),
            pending: Vec::new(),
            tick: 0,
        }
    }
}

impl AudioManager {
    pub fn from_config(config: AudioConfig) -> Self {
        let mut manager = Self {
            sfx: config.sfx,
            music: config.music,
            ..Self::default()
        };
        for (channel, value) in &config.volumes {
            if let Err(e) = manager.set_volume(channel, *value) {
                warn!("[Summit audio] {e}; ignoring");
            }
        }
        manager
    }

    pub fn set_volume(&mut self, channel: &str, value: f32) -> Result<(), String> {
        let v = value.clamp(0.0, 2.0);
        match channel {
            "master" => self.master_volume = v,
            "sfx" => self.sfx_volume = v,
            "music" => self.music_volume = v,
            _ => return Err(format!("Unknown volume channel: {channel}")),
        }
        Ok(())
    }

    fn push_event(&mut self, event: AudioEventLog) {
        self.recent_events.push(event);
        if self.recent_events.len() > MAX_AUDIO_EVENTS {
            let excess = self.recent_events.len() - MAX_AUDIO_EVENTS;
            self.recent_events.drain(0..excess);
        }
    }

    fn stop_music(&mut self, fade_ms: u16) {
        if let Some(id) = self.current_music.take() {
            self.pending.push(PlayRequest::StopMusic);
            self.push_event(AudioEventLog {
                tick: self.tick,
                event_type: "music".to_string(),
                id,
                action: Some("stop".to_string()),
                volume: None,
                fade_ms: Some(fade_ms),
            });
        }
    }
}

impl Audio for AudioManager {
    fn sfx(&mut self, id: u8) {
        let volume = match self.sfx.get(&id) {
            Some(def) => {
                let volume = def.volume * self.sfx_volume * self.master_volume;
                self.pending.push(PlayRequest::Sfx {
                    path: def.path.clone(),
                    volume,
                });
                Some(volume)
            }
            None => {
                debug!("[Summit audio] No sound mapped for sfx {id}");
                None
            }
        };
        self.push_event(AudioEventLog {
            tick: self.tick,
            event_type: "sfx".to_string(),
            id,
            action: Some("play".to_string()),
            volume,
            fade_ms: None,
        });
    }

    fn music(&mut self, track: Option<u8>, fade_ms: u16, _channel_mask: u8) {
        let Some(id) = track else {
            self.stop_music(fade_ms);
            return;
        };
        self.stop_music(0);
        let volume = match self.music.get(&id) {
            Some(def) => {
                let volume = def.volume * self.music_volume * self.master_volume;
                self.pending.push(PlayRequest::Music {
                    path: def.path.clone(),
                    volume,
                    looping: def.looping,
                });
                Some(volume)
            }
            None => {
                debug!("[Summit audio] No track mapped for music {id}");
                None
            }
        };
        self.current_music = Some(id);
        self.push_event(AudioEventLog {
            tick: self.tick,
            event_type: "music".to_string(),
            id,
            action: Some("start".to_string()),
            volume,
            fade_ms: Some(fade_ms),
        });
    }
}

#[derive(Component)]
struct MusicPlayer;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<AudioManager>() {
            app.insert_resource(AudioManager::default());
        }
        app.add_systems(Update, play_pending_audio);
    }
}

/// Hand resolved sounds to Bevy's audio players. Headless runs only keep
/// the event log.
fn play_pending_audio(
    mut commands: Commands,
    mut audio: ResMut<AudioManager>,
    headless: Option<Res<HeadlessMode>>,
    asset_server: Option<Res<AssetServer>>,
    music_players: Query<Entity, With<MusicPlayer>>,
) {
    if audio.pending.is_empty() {
        return;
    }
    let requests = std::mem::take(&mut audio.pending);
    if headless.is_some_and(|h| h.0) {
        return;
    }
    let Some(asset_server) = asset_server else {
        return;
    };
    for request in requests {
        match request {
            PlayRequest::Sfx { path, volume } => {
                commands.spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings {
                        volume: Volume::new(volume),
                        ..PlaybackSettings::DESPAWN
                    },
                ));
            }
            PlayRequest::Music {
                path,
                volume,
                looping,
            } => {
                let base = if looping {
                    PlaybackSettings::LOOP
                } else {
                    PlaybackSettings::DESPAWN
                };
                commands.spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings {
                        volume: Volume::new(volume),
                        ..base
                    },
                    MusicPlayer,
                ));
            }
            PlayRequest::StopMusic => {
                for entity in &music_players {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}
