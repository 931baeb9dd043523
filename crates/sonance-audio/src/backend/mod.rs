//! Playback backends
//!
//! The registry and emission policy never talk to an audio library directly;
//! they drive an [`AudioBackend`]. [`KiraBackend`] plays through kira,
//! [`MockBackend`] records every command for tests and headless runs.

mod kira_backend;
mod mock;

use std::fmt;

pub use self::kira_backend::KiraBackend;
pub use self::mock::{BackendEvent, MockBackend, MockVoice};

use crate::error::AudioError;
use crate::spatial::BackendVector;

/// Opaque id of one playing sound inside a backend.
///
/// Ids grow monotonically and are never handed out twice by the same backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendHandle(pub u32);

impl fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands the sound system issues to an audio library.
///
/// Every position and direction is already in backend space. Setters on an
/// unknown handle are ignored; a finished sound simply stops reporting
/// [`AudioBackend::is_playing`].
pub trait AudioBackend {
    /// Load an asset by path. Loading twice is a no-op.
    fn load_sound(&mut self, name: &str, stream: bool) -> Result<(), AudioError>;

    /// Drop a cached asset. Sounds already playing keep their data.
    fn unload_sound(&mut self, name: &str);

    /// Start a new voice, loading the asset first if needed.
    fn play(
        &mut self,
        name: &str,
        volume: f32,
        position: BackendVector,
        direction: BackendVector,
        start_paused: bool,
    ) -> Result<BackendHandle, AudioError>;

    /// Unpause a voice created with `start_paused`.
    fn start(&mut self, handle: BackendHandle);
    fn stop(&mut self, handle: BackendHandle);
    fn stop_all(&mut self);

    fn set_position(&mut self, handle: BackendHandle, position: BackendVector);
    fn set_volume(&mut self, handle: BackendHandle, volume: f32);
    fn set_muted(&mut self, handle: BackendHandle, muted: bool);
    /// Playback rate multiplier; 1.0 is the recorded pitch.
    fn set_pitch(&mut self, handle: BackendHandle, pitch: f32);
    fn set_min_max_distance(&mut self, handle: BackendHandle, min: f32, max: f32);
    /// Seek, in seconds from the start of the sample.
    fn set_playback_position(&mut self, handle: BackendHandle, seconds: f32);

    fn is_playing(&self, handle: BackendHandle) -> bool;
    /// Length of the sample the voice plays, in seconds.
    fn duration(&self, handle: BackendHandle) -> Option<f32>;
    /// Whether the voice is playing the asset `name`.
    fn matches_name(&self, handle: BackendHandle, name: &str) -> bool;
    /// Most recently issued handle, if any.
    fn last_handle(&self) -> Option<BackendHandle>;

    fn set_listener(&mut self, position: BackendVector, forward: BackendVector, up: BackendVector);

    /// Per-frame housekeeping. Finished voices are reclaimed here.
    fn update(&mut self, dt: f32);
}
