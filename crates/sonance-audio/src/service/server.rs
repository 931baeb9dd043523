use glam::Vec3;
use sonance_core::{EntityIndex, Soundlevel, SourceChannel};
use sonance_net::{NetMessage, SoundMessage};
use tracing::{debug, warn};

use super::{AudioService, ServiceRole};
use crate::attenuation;
use crate::config::{AttenuationConfig, AudioConfig};
use crate::context::SoundContext;
use crate::emission::EmitRequest;

/// Turns sound requests into messages for clients.
///
/// Nothing is played on the server. Messages queue up until the broadcaster
/// collects them with [`ServerAudioService::drain_outgoing`].
#[derive(Debug, Default)]
pub struct ServerAudioService {
    attenuation: AttenuationConfig,
    outgoing: Vec<SoundMessage>,
}

impl ServerAudioService {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            attenuation: config.attenuation.clone(),
            outgoing: Vec::new(),
        }
    }

    /// Messages waiting to be broadcast, oldest first
    pub fn outgoing(&self) -> &[SoundMessage] {
        &self.outgoing
    }

    pub fn drain_outgoing(&mut self) -> Vec<SoundMessage> {
        std::mem::take(&mut self.outgoing)
    }

    /// Drain and encode every queued message as a text frame.
    pub fn drain_frames(&mut self) -> Vec<String> {
        self.drain_outgoing()
            .iter()
            .filter_map(|message| match sonance_net::encode(message) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!(sample = %message.sample, "failed to encode sound message: {e}");
                    None
                }
            })
            .collect()
    }

    fn queue(&mut self, message: SoundMessage) {
        if let Err(e) = message.validate() {
            warn!(entity = %message.entity, "not sending sound: {e}");
            return;
        }
        debug!(entity = %message.entity, sample = %message.sample, "queued sound message");
        self.outgoing.push(message);
    }
}

impl AudioService for ServerAudioService {
    fn role(&self) -> ServiceRole {
        ServiceRole::Server
    }

    fn emit_sound(&mut self, ctx: &SoundContext<'_>, request: EmitRequest) {
        let origin = request
            .origin
            .or_else(|| {
                ctx.entities
                    .entity(request.entity)
                    .map(|e| e.transform().position)
            })
            .unwrap_or(Vec3::ZERO);
        let delay = if let Some(soundtime) = request.soundtime {
            (soundtime - ctx.curtime) as f32
        } else {
            0.0
        };

        self.queue(SoundMessage {
            entity: request.entity,
            channel: request.channel,
            sample: request.sample,
            volume: request.volume,
            soundlevel: request.soundlevel,
            flags: request.flags,
            pitch: request.pitch,
            special_dsp: request.special_dsp,
            origin,
            direction: request.direction.unwrap_or(Vec3::ZERO),
            delay,
            speaker: request.speaker.filter(|s| s.is_spatial()),
        });
    }

    fn stop_sound(
        &mut self,
        _ctx: &SoundContext<'_>,
        entity: EntityIndex,
        channel: SourceChannel,
        sample: &str,
    ) {
        self.queue(SoundMessage::stop(entity, channel, sample));
    }

    fn dist_gain_from_soundlevel(&self, level: Soundlevel, distance: f32) -> f32 {
        attenuation::dist_gain(level, distance, &self.attenuation)
    }

    fn tick(&mut self, _ctx: &SoundContext<'_>, _dt: f32) {}
}
