use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::{AudioBackend, BackendHandle};
use crate::error::AudioError;
use crate::spatial::BackendVector;

const DEFAULT_DURATION: f32 = 2.0;

/// A command received by the [`MockBackend`], in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Load(String),
    Unload(String),
    Play { handle: BackendHandle, name: String },
    Start(BackendHandle),
    Stop(BackendHandle),
    StopAll,
    SetVolume(BackendHandle, f32),
    SetPitch(BackendHandle, f32),
    SetMinMaxDistance(BackendHandle, f32, f32),
    Seek(BackendHandle, f32),
}

/// State of one mock voice.
#[derive(Debug, Clone, PartialEq)]
pub struct MockVoice {
    pub name: String,
    pub volume: f32,
    pub position: BackendVector,
    pub direction: BackendVector,
    pub paused: bool,
    pub muted: bool,
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub playback_position: f32,
    pub duration: f32,
    pub playing: bool,
}

/// Backend that plays nothing and remembers everything.
///
/// Used by tests and by headless runs where no output device exists. Voices
/// advance in time on [`AudioBackend::update`] and finish when they reach
/// their duration; tests can also end them early with [`MockBackend::finish`].
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Asset cache; `false` marks a load that failed
    loaded: BTreeMap<String, bool>,
    missing: Vec<String>,
    durations: BTreeMap<String, f32>,
    voices: BTreeMap<BackendHandle, MockVoice>,
    last_handle: Option<BackendHandle>,
    voice_limit: Option<usize>,
    listener: (BackendVector, BackendVector, BackendVector),
    events: Vec<BackendEvent>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an asset a fixed length in seconds.
    pub fn with_duration(mut self, name: impl Into<String>, seconds: f32) -> Self {
        self.durations.insert(name.into(), seconds);
        self
    }

    /// Make loading an asset fail.
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.missing.push(name.into());
        self
    }

    /// Cap the number of simultaneously playing voices.
    pub fn with_voice_limit(mut self, limit: usize) -> Self {
        self.voice_limit = Some(limit);
        self
    }

    /// End a voice as if it had played to completion.
    pub fn finish(&mut self, handle: BackendHandle) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.playing = false;
        }
    }

    pub fn voice(&self, handle: BackendHandle) -> Option<&MockVoice> {
        self.voices.get(&handle)
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn playing_count(&self) -> usize {
        self.voices.values().filter(|v| v.playing).count()
    }

    /// Handles of voices that are still playing, oldest first.
    pub fn playing_handles(&self) -> Vec<BackendHandle> {
        self.voices
            .iter()
            .filter(|(_, v)| v.playing)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Listener pose as (position, forward, up).
    pub fn listener(&self) -> (BackendVector, BackendVector, BackendVector) {
        self.listener
    }

    fn voice_mut(&mut self, handle: BackendHandle) -> Option<&mut MockVoice> {
        self.voices.get_mut(&handle)
    }
}

impl AudioBackend for MockBackend {
    fn load_sound(&mut self, name: &str, _stream: bool) -> Result<(), AudioError> {
        if let Some(&ok) = self.loaded.get(name) {
            return if ok {
                Ok(())
            } else {
                Err(AudioError::NotLoaded(name.to_string()))
            };
        }

        self.events.push(BackendEvent::Load(name.to_string()));
        let ok = !self.missing.iter().any(|m| m == name);
        self.loaded.insert(name.to_string(), ok);
        if ok {
            Ok(())
        } else {
            Err(AudioError::LoadFailed(PathBuf::from(name), "file not found".into()))
        }
    }

    fn unload_sound(&mut self, name: &str) {
        if self.loaded.remove(name).is_some() {
            self.events.push(BackendEvent::Unload(name.to_string()));
        }
    }

    fn play(
        &mut self,
        name: &str,
        volume: f32,
        position: BackendVector,
        direction: BackendVector,
        start_paused: bool,
    ) -> Result<BackendHandle, AudioError> {
        self.load_sound(name, false)?;

        if let Some(limit) = self.voice_limit {
            if self.playing_count() >= limit {
                return Err(AudioError::VoiceLimit(name.to_string()));
            }
        }

        let handle = BackendHandle(self.last_handle.map_or(1, |h| h.0 + 1));
        self.last_handle = Some(handle);
        let duration = self
            .durations
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_DURATION);

        self.voices.insert(
            handle,
            MockVoice {
                name: name.to_string(),
                volume,
                position,
                direction,
                paused: start_paused,
                muted: false,
                pitch: 1.0,
                min_distance: 1.0,
                max_distance: 10_000.0,
                playback_position: 0.0,
                duration,
                playing: true,
            },
        );
        self.events.push(BackendEvent::Play {
            handle,
            name: name.to_string(),
        });
        Ok(handle)
    }

    fn start(&mut self, handle: BackendHandle) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.paused = false;
            self.events.push(BackendEvent::Start(handle));
        }
    }

    fn stop(&mut self, handle: BackendHandle) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.playing = false;
            self.events.push(BackendEvent::Stop(handle));
        }
    }

    fn stop_all(&mut self) {
        for voice in self.voices.values_mut() {
            voice.playing = false;
        }
        self.events.push(BackendEvent::StopAll);
    }

    fn set_position(&mut self, handle: BackendHandle, position: BackendVector) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.position = position;
        }
    }

    fn set_volume(&mut self, handle: BackendHandle, volume: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.volume = volume;
            self.events.push(BackendEvent::SetVolume(handle, volume));
        }
    }

    fn set_muted(&mut self, handle: BackendHandle, muted: bool) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.muted = muted;
        }
    }

    fn set_pitch(&mut self, handle: BackendHandle, pitch: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.pitch = pitch;
            self.events.push(BackendEvent::SetPitch(handle, pitch));
        }
    }

    fn set_min_max_distance(&mut self, handle: BackendHandle, min: f32, max: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.min_distance = min;
            voice.max_distance = max;
            self.events
                .push(BackendEvent::SetMinMaxDistance(handle, min, max));
        }
    }

    fn set_playback_position(&mut self, handle: BackendHandle, seconds: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.playback_position = seconds.max(0.0);
            self.events.push(BackendEvent::Seek(handle, seconds));
        }
    }

    fn is_playing(&self, handle: BackendHandle) -> bool {
        self.voices.get(&handle).is_some_and(|v| v.playing)
    }

    fn duration(&self, handle: BackendHandle) -> Option<f32> {
        self.voices.get(&handle).map(|v| v.duration)
    }

    fn matches_name(&self, handle: BackendHandle, name: &str) -> bool {
        self.voices.get(&handle).is_some_and(|v| v.name == name)
    }

    fn last_handle(&self) -> Option<BackendHandle> {
        self.last_handle
    }

    fn set_listener(&mut self, position: BackendVector, forward: BackendVector, up: BackendVector) {
        self.listener = (position, forward, up);
    }

    fn update(&mut self, dt: f32) {
        for voice in self.voices.values_mut() {
            if voice.playing && !voice.paused {
                voice.playback_position += dt * voice.pitch;
                if voice.playback_position >= voice.duration {
                    voice.playing = false;
                }
            }
        }

        let before = self.voices.len();
        self.voices.retain(|_, v| v.playing);
        let reclaimed = before - self.voices.len();
        if reclaimed > 0 {
            debug!(reclaimed, "mock backend reclaimed finished voices");
        }
    }
}
