use glam::Vec3;
use serde::{Deserialize, Serialize};
use sonance_core::{EntityIndex, SoundFlags, Soundlevel, SourceChannel, PITCH_NORM};

use crate::codec::NetMessage;
use crate::error::NetError;

/// Type id of [`SoundMessage`] on the wire.
pub const SOUND_MESSAGE_TYPE: u8 = 34;

/// Longest sample name a sound message may carry, in bytes.
pub const MAX_SAMPLE_NAME: usize = 255;

/// A sound event broadcast by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundMessage {
    pub entity: EntityIndex,
    pub channel: SourceChannel,
    pub sample: String,
    pub volume: f32,
    pub soundlevel: Soundlevel,
    pub flags: SoundFlags,
    pub pitch: i32,
    #[serde(default)]
    pub special_dsp: i32,
    pub origin: Vec3,
    #[serde(default)]
    pub direction: Vec3,
    /// Seconds from receipt until the sound should start; negative when late
    pub delay: f32,
    #[serde(default)]
    pub speaker: Option<EntityIndex>,
}

impl SoundMessage {
    /// A message playing `sample` on `entity` at normal volume, level and pitch.
    pub fn new(entity: EntityIndex, channel: SourceChannel, sample: impl Into<String>) -> Self {
        Self {
            entity,
            channel,
            sample: sample.into(),
            volume: 1.0,
            soundlevel: Soundlevel::NORM,
            flags: SoundFlags::NONE,
            pitch: PITCH_NORM,
            special_dsp: 0,
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
            delay: 0.0,
            speaker: None,
        }
    }

    /// A message stopping `sample` on `entity`'s channel.
    pub fn stop(entity: EntityIndex, channel: SourceChannel, sample: impl Into<String>) -> Self {
        Self {
            flags: SoundFlags::STOP,
            ..Self::new(entity, channel, sample)
        }
    }
}

impl NetMessage for SoundMessage {
    const TYPE_ID: u8 = SOUND_MESSAGE_TYPE;
    const RELIABLE: bool = true;

    fn validate(&self) -> Result<(), NetError> {
        if self.sample.is_empty() {
            return Err(NetError::EmptySample);
        }
        if self.sample.len() > MAX_SAMPLE_NAME {
            return Err(NetError::SampleNameTooLong(self.sample.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode};

    fn gunshot() -> SoundMessage {
        SoundMessage {
            volume: 0.9,
            soundlevel: Soundlevel::GUNFIRE,
            origin: Vec3::new(128.0, -64.0, 32.0),
            delay: 0.05,
            speaker: Some(EntityIndex(12)),
            ..SoundMessage::new(EntityIndex(3), SourceChannel::Weapon, "weapons/ar2/fire1.wav")
        }
    }

    #[test]
    fn message_survives_the_wire() {
        let message = gunshot();
        let text = encode(&message).unwrap();
        assert_eq!(decode::<SoundMessage>(&text).unwrap(), message);
    }

    #[test]
    fn envelope_carries_type_and_reliability() {
        let text = encode(&gunshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], 34);
        assert_eq!(value["reliable"], true);
        assert_eq!(value["body"]["channel"], 1);
    }

    #[test]
    fn sample_name_length_is_bounded() {
        let mut message = gunshot();
        message.sample = "a".repeat(MAX_SAMPLE_NAME);
        assert!(encode(&message).is_ok());

        message.sample.push('a');
        assert!(matches!(
            encode(&message),
            Err(NetError::SampleNameTooLong(256))
        ));
    }

    #[test]
    fn oversized_incoming_sample_is_rejected() {
        let text = encode(&gunshot())
            .unwrap()
            .replace("weapons/ar2/fire1.wav", &"x".repeat(300));
        assert!(matches!(
            decode::<SoundMessage>(&text),
            Err(NetError::SampleNameTooLong(300))
        ));
    }

    #[test]
    fn wrong_type_id_is_rejected() {
        let text = encode(&gunshot()).unwrap().replace("\"type\":34", "\"type\":7");
        assert!(matches!(
            decode::<SoundMessage>(&text),
            Err(NetError::UnexpectedType { expected: 34, found: 7 })
        ));
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let text = encode(&gunshot()).unwrap().replace("\"channel\":1", "\"channel\":99");
        assert!(matches!(decode::<SoundMessage>(&text), Err(NetError::Json(_))));
    }

    #[test]
    fn stop_message_sets_stop_flag() {
        let message = SoundMessage::stop(EntityIndex(3), SourceChannel::Weapon, "weapons/ar2/fire1.wav");
        assert!(message.flags.contains(SoundFlags::STOP));
    }
}
