use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;
use tracing::{debug, info, warn};

use super::{AudioBackend, BackendHandle};
use crate::error::AudioError;
use crate::spatial::{self, BackendVector, Listener, SpatialParams};

fn immediate() -> Tween {
    Tween {
        duration: Duration::ZERO,
        ..Default::default()
    }
}

struct Voice {
    sound: StaticSoundHandle,
    name: String,
    duration: f32,
    position: BackendVector,
    volume: f32,
    muted: bool,
    min_distance: f32,
    max_distance: f32,
}

impl Voice {
    fn spatial(&self, listener: &Listener) -> SpatialParams {
        spatial::compute_spatial(listener, self.position, self.min_distance, self.max_distance)
    }

    fn effective_volume(&self, params: &SpatialParams) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume as f64 * params.volume
        }
    }

    /// Push listener-relative volume and panning to kira
    fn apply(&mut self, listener: &Listener) {
        let params = self.spatial(listener);
        let volume = self.effective_volume(&params);
        self.sound.set_volume(volume, Tween::default());
        self.sound.set_panning(to_kira_panning(params.panning), Tween::default());
    }

    fn is_live(&self) -> bool {
        !matches!(
            self.sound.state(),
            PlaybackState::Stopping | PlaybackState::Stopped
        )
    }
}

/// kira pans from 0.0 (left) to 1.0 (right).
fn to_kira_panning(panning: f64) -> f64 {
    ((panning + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// [`AudioBackend`] that plays through kira's default output device.
///
/// kira has no 3D listener of its own, so each voice's volume and panning are
/// recomputed from the listener pose whenever it moves and on every update.
/// Assets are decoded fully into memory and cached by name.
pub struct KiraBackend {
    manager: AudioManager<DefaultBackend>,
    asset_root: PathBuf,
    /// Decoded assets; `None` caches a load that failed
    cache: HashMap<String, Option<StaticSoundData>>,
    voices: BTreeMap<BackendHandle, Voice>,
    last_handle: Option<BackendHandle>,
    listener: Listener,
}

impl KiraBackend {
    /// Open the default output device. Asset names resolve against `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::InitFailed(e.to_string()))?;

        info!("kira audio backend initialized");

        Ok(Self {
            manager,
            asset_root: asset_root.into(),
            cache: HashMap::new(),
            voices: BTreeMap::new(),
            last_handle: None,
            listener: Listener::default(),
        })
    }

    fn sound_data(&mut self, name: &str) -> Result<StaticSoundData, AudioError> {
        self.load_sound(name, false)?;
        self.cache
            .get(name)
            .cloned()
            .flatten()
            .ok_or_else(|| AudioError::NotLoaded(name.to_string()))
    }

    fn next_handle(&mut self) -> BackendHandle {
        let handle = BackendHandle(self.last_handle.map_or(1, |h| h.0 + 1));
        self.last_handle = Some(handle);
        handle
    }
}

impl AudioBackend for KiraBackend {
    fn load_sound(&mut self, name: &str, stream: bool) -> Result<(), AudioError> {
        match self.cache.get(name) {
            Some(Some(_)) => return Ok(()),
            Some(None) => return Err(AudioError::NotLoaded(name.to_string())),
            None => {}
        }

        let path = self.asset_root.join(name);
        if stream {
            debug!(name, "streamed playback not supported, decoding fully");
        }

        match StaticSoundData::from_file(&path) {
            Ok(data) => {
                debug!(name, "loaded sound");
                self.cache.insert(name.to_string(), Some(data));
                Ok(())
            }
            Err(e) => {
                self.cache.insert(name.to_string(), None);
                Err(AudioError::LoadFailed(path, e.to_string()))
            }
        }
    }

    fn unload_sound(&mut self, name: &str) {
        self.cache.remove(name);
    }

    fn play(
        &mut self,
        name: &str,
        volume: f32,
        position: BackendVector,
        _direction: BackendVector,
        start_paused: bool,
    ) -> Result<BackendHandle, AudioError> {
        let data = self.sound_data(name)?;
        let duration = data.duration().as_secs_f32();

        let params = spatial::compute_spatial(&self.listener, position, 1.0, f32::MAX);
        let settings = StaticSoundSettings::new()
            .volume(volume as f64 * params.volume)
            .panning(to_kira_panning(params.panning));

        let mut sound = self
            .manager
            .play(data.with_settings(settings))
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        if start_paused {
            sound.pause(immediate());
        }

        let handle = self.next_handle();
        self.voices.insert(
            handle,
            Voice {
                sound,
                name: name.to_string(),
                duration,
                position,
                volume,
                muted: false,
                min_distance: 1.0,
                max_distance: f32::MAX,
            },
        );
        Ok(handle)
    }

    fn start(&mut self, handle: BackendHandle) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.apply(&self.listener);
            voice.sound.resume(immediate());
        }
    }

    fn stop(&mut self, handle: BackendHandle) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.sound.stop(Tween::default());
        }
    }

    fn stop_all(&mut self) {
        for voice in self.voices.values_mut() {
            voice.sound.stop(Tween::default());
        }
    }

    fn set_position(&mut self, handle: BackendHandle, position: BackendVector) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.position = position;
            voice.apply(&self.listener);
        }
    }

    fn set_volume(&mut self, handle: BackendHandle, volume: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.volume = volume;
            voice.apply(&self.listener);
        }
    }

    fn set_muted(&mut self, handle: BackendHandle, muted: bool) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            if voice.muted != muted {
                voice.muted = muted;
                voice.apply(&self.listener);
            }
        }
    }

    fn set_pitch(&mut self, handle: BackendHandle, pitch: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice
                .sound
                .set_playback_rate(pitch.max(0.01) as f64, Tween::default());
        }
    }

    fn set_min_max_distance(&mut self, handle: BackendHandle, min: f32, max: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.min_distance = min;
            voice.max_distance = max;
            voice.apply(&self.listener);
        }
    }

    fn set_playback_position(&mut self, handle: BackendHandle, seconds: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            if seconds >= voice.duration {
                warn!(%handle, seconds, "seek past end of sound, stopping");
                voice.sound.stop(immediate());
            } else {
                voice.sound.seek_to(seconds.max(0.0) as f64);
            }
        }
    }

    fn is_playing(&self, handle: BackendHandle) -> bool {
        self.voices.get(&handle).is_some_and(Voice::is_live)
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
        self.listener = Listener {
            position,
            forward,
            up,
        };
    }

    fn update(&mut self, _dt: f32) {
        let listener = &self.listener;
        self.voices.retain(|handle, voice| {
            if voice.sound.state() == PlaybackState::Stopped {
                debug!(%handle, name = %voice.name, "reclaimed finished voice");
                return false;
            }
            voice.apply(listener);
            true
        });
    }
}
