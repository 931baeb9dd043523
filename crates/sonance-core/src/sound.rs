//! Logical sound channels, emission flags and soundlevels

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Normal playback pitch (percent).
pub const PITCH_NORM: i32 = 100;

/// Logical source channel a sound is emitted on.
///
/// Channels group sounds per entity so a new weapon shot can replace the
/// previous one without touching the same entity's voice lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SourceChannel {
    #[default]
    Auto,
    Weapon,
    Voice,
    Item,
    Body,
    Stream,
    /// Long-lived sounds that are never stolen
    Static,
    Voice2,
}

impl SourceChannel {
    /// Wire/engine code for this channel
    pub fn code(self) -> i32 {
        match self {
            Self::Auto => 0,
            Self::Weapon => 1,
            Self::Voice => 2,
            Self::Item => 3,
            Self::Body => 4,
            Self::Stream => 5,
            Self::Static => 6,
            Self::Voice2 => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "CHAN_AUTO",
            Self::Weapon => "CHAN_WEAPON",
            Self::Voice => "CHAN_VOICE",
            Self::Item => "CHAN_ITEM",
            Self::Body => "CHAN_BODY",
            Self::Stream => "CHAN_STREAM",
            Self::Static => "CHAN_STATIC",
            Self::Voice2 => "CHAN_VOICE2",
        }
    }

    /// Voice channels follow the voice volume rather than the effects volume
    pub fn is_voice(self) -> bool {
        matches!(self, Self::Voice | Self::Voice2)
    }
}

impl fmt::Display for SourceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A channel code that does not name any known channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown source channel code {0}")]
pub struct SourceChannelError(pub i32);

impl TryFrom<i32> for SourceChannel {
    type Error = SourceChannelError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Auto,
            1 => Self::Weapon,
            2 => Self::Voice,
            3 => Self::Item,
            4 => Self::Body,
            5 => Self::Stream,
            6 => Self::Static,
            7 => Self::Voice2,
            other => return Err(SourceChannelError(other)),
        })
    }
}

impl From<SourceChannel> for i32 {
    fn from(channel: SourceChannel) -> Self {
        channel.code()
    }
}

/// Bit set of emission flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundFlags(u32);

impl SoundFlags {
    pub const NONE: SoundFlags = SoundFlags(0);
    /// Change the volume of an already playing sound
    pub const CHANGE_VOL: SoundFlags = SoundFlags(1 << 0);
    /// Change the pitch of an already playing sound
    pub const CHANGE_PITCH: SoundFlags = SoundFlags(1 << 1);
    /// Stop the matching sound instead of starting one
    pub const STOP: SoundFlags = SoundFlags(1 << 2);
    /// Emitted while the entity is spawning
    pub const SPAWNING: SoundFlags = SoundFlags(1 << 3);
    pub const DELAY: SoundFlags = SoundFlags(1 << 4);
    pub const STOP_LOOPING: SoundFlags = SoundFlags(1 << 5);
    /// Routed through a speaker entity
    pub const SPEAKER: SoundFlags = SoundFlags(1 << 6);
    pub const SHOULD_PAUSE: SoundFlags = SoundFlags(1 << 7);
    pub const IGNORE_PHONEMES: SoundFlags = SoundFlags(1 << 8);
    pub const IGNORE_NAME: SoundFlags = SoundFlags(1 << 9);
    pub const DO_NOT_OVERWRITE_EXISTING_ON_CHANNEL: SoundFlags = SoundFlags(1 << 10);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set
    pub const fn contains(self, other: SoundFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set
    pub const fn intersects(self, other: SoundFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether the request only modifies an existing sound
    pub const fn is_update(self) -> bool {
        self.intersects(SoundFlags(Self::CHANGE_VOL.0 | Self::CHANGE_PITCH.0))
    }
}

impl BitOr for SoundFlags {
    type Output = SoundFlags;

    fn bitor(self, rhs: SoundFlags) -> SoundFlags {
        SoundFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SoundFlags {
    fn bitor_assign(&mut self, rhs: SoundFlags) {
        self.0 |= rhs.0;
    }
}

/// Loudness falloff in decibels at the reference distance.
///
/// `Soundlevel::NONE` means the sound does not attenuate with distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Soundlevel(pub u8);

impl Soundlevel {
    pub const NONE: Soundlevel = Soundlevel(0);
    pub const IDLE: Soundlevel = Soundlevel(60);
    pub const STATIC: Soundlevel = Soundlevel(66);
    pub const NORM: Soundlevel = Soundlevel(75);
    pub const TALKING: Soundlevel = Soundlevel(80);
    pub const GUNFIRE: Soundlevel = Soundlevel(140);

    /// Convert a linear attenuation factor (0 = none, 0.8 = normal) to a soundlevel
    pub fn from_attenuation(attenuation: f32) -> Self {
        if attenuation > 0.0 {
            let level = 50.0 + 20.0 / attenuation;
            Soundlevel(level.clamp(0.0, u8::MAX as f32) as u8)
        } else {
            Soundlevel::NONE
        }
    }

    pub fn decibels(self) -> f32 {
        self.0 as f32
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}
