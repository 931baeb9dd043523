use std::path::PathBuf;

use crate::backend::BackendHandle;

/// Errors that can occur in the audio system.
///
/// None of these are fatal: the emission path logs them and carries on as if
/// the sound had never been requested.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to initialize audio backend: {0}")]
    InitFailed(String),

    #[error("failed to load audio file '{0}': {1}")]
    LoadFailed(PathBuf, String),

    #[error("sound '{0}' is not loaded")]
    NotLoaded(String),

    #[error("audio playback failed: {0}")]
    PlaybackFailed(String),

    #[error("no free voice to play '{0}'")]
    VoiceLimit(String),

    #[error("empty sample name")]
    EmptySample,

    #[error("sentences cannot be played as spatial sounds: '{0}'")]
    SentenceNotSupported(String),

    #[error("handle {0} is already tracked by a channel")]
    DuplicateHandle(BackendHandle),
}
