//! Sample names as requested by game code.
//!
//! Game code may prefix a sample with mixing hints (`*` for streamed, `!` for a
//! sentence, `#` for dry mix, ...). Those characters never reach the backend:
//! the asset is always looked up as `sound/<name>`.

use std::fmt;

use crate::error::AudioError;

const STREAM: char = '*';
const SENTENCE: char = '!';

/// Leading characters that carry mixing hints rather than part of the path.
const PREFIX_CHARS: [char; 10] = ['*', '?', '!', '#', '>', '<', '^', '@', ')', '}'];

const SOUND_DIR: &str = "sound/";

/// A validated sample reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleName {
    requested: String,
    asset_path: String,
    stream: bool,
}

impl SampleName {
    /// Validate a requested sample name.
    ///
    /// Empty names and sentence references are rejected.
    pub fn parse(requested: &str) -> Result<Self, AudioError> {
        if requested.is_empty() {
            return Err(AudioError::EmptySample);
        }
        if is_sentence(requested) {
            return Err(AudioError::SentenceNotSupported(requested.to_string()));
        }

        let stripped = requested.trim_start_matches(PREFIX_CHARS);
        if stripped.is_empty() {
            return Err(AudioError::EmptySample);
        }

        let prefix = &requested[..requested.len() - stripped.len()];
        Ok(Self {
            requested: requested.to_string(),
            asset_path: format!("{SOUND_DIR}{}", stripped.replace('\\', "/")),
            stream: prefix.contains(STREAM),
        })
    }

    /// The name exactly as it was requested
    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// Backend asset path (`sound/...`, forward slashes)
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Whether the sample asked to be streamed rather than fully decoded
    pub fn is_stream(&self) -> bool {
        self.stream
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.asset_path)
    }
}

/// A sentence marker may sit in either of the first two characters.
pub fn is_sentence(sample: &str) -> bool {
    sample.chars().take(2).any(|c| c == SENTENCE)
}
