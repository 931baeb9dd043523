use glam::Vec3;
use sonance_core::{EntityIndex, SoundFlags, Soundlevel, SourceChannel, Transform};
use sonance_net::SoundMessage;
use tracing::{debug, info, warn};

use super::{AudioService, ServiceRole};
use crate::attenuation;
use crate::backend::{AudioBackend, BackendHandle};
use crate::config::AudioConfig;
use crate::context::SoundContext;
use crate::emission::{EmissionPolicy, EmitRequest};
use crate::environment::{AcousticEnvironment, AcousticSpace};
use crate::registry::ChannelRegistry;
use crate::spatial::Listener;

/// Plays sounds locally.
pub struct ClientAudioService<B: AudioBackend> {
    registry: ChannelRegistry<B>,
    policy: EmissionPolicy,
    environment: AcousticEnvironment,
    /// Requests whose start time has not arrived yet
    pending: Vec<EmitRequest>,
}

impl<B: AudioBackend> ClientAudioService<B> {
    pub fn new(backend: B, config: AudioConfig) -> Self {
        info!(
            master = config.master_volume,
            sfx = config.sfx_volume,
            voice = config.voice_volume,
            "client audio service ready"
        );
        Self {
            registry: ChannelRegistry::new(backend),
            environment: AcousticEnvironment::new(&config),
            policy: EmissionPolicy::new(config),
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &AudioConfig {
        self.policy.config()
    }

    pub fn registry(&self) -> &ChannelRegistry<B> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ChannelRegistry<B> {
        &mut self.registry
    }

    pub fn environment(&self) -> &AcousticEnvironment {
        &self.environment
    }

    /// Number of delayed sounds waiting for their start time
    pub fn pending_sounds(&self) -> usize {
        self.pending.len()
    }

    /// Handle a request now, or hold it until its start time.
    pub fn emit(&mut self, ctx: &SoundContext<'_>, request: EmitRequest) -> Option<BackendHandle> {
        let wait = request.soundtime.map_or(0.0, |t| t - ctx.curtime);
        if wait > 0.0 && !request.flags.contains(SoundFlags::STOP) {
            debug!(sample = %request.sample, wait, "delaying sound");
            self.pending.push(request);
            return None;
        }
        self.policy.emit(&mut self.registry, ctx, &request)
    }

    /// Play a sound announced by the server.
    pub fn handle_message(
        &mut self,
        ctx: &SoundContext<'_>,
        message: &SoundMessage,
    ) -> Option<BackendHandle> {
        let request = EmitRequest {
            entity: message.entity,
            channel: message.channel,
            sample: message.sample.clone(),
            volume: message.volume,
            soundlevel: message.soundlevel,
            flags: message.flags,
            pitch: message.pitch,
            special_dsp: message.special_dsp,
            origin: Some(message.origin),
            direction: Some(message.direction),
            soundtime: Some(ctx.curtime + message.delay as f64),
            speaker: message.speaker.filter(|s| s.is_spatial()),
            from_network: true,
        };
        self.emit(ctx, request)
    }

    /// Decode a sound message frame and play it. Malformed frames are dropped.
    pub fn handle_frame(&mut self, ctx: &SoundContext<'_>, frame: &str) -> Option<BackendHandle> {
        match sonance_net::decode::<SoundMessage>(frame) {
            Ok(message) => self.handle_message(ctx, &message),
            Err(e) => {
                warn!("dropping sound message: {e}");
                None
            }
        }
    }

    /// Per-frame update: start due delayed sounds, sweep the channels and
    /// re-classify the acoustic space when due. Returns the new
    /// classification when one ran.
    pub fn update(&mut self, ctx: &SoundContext<'_>, dt: f32) -> Option<AcousticSpace> {
        self.start_due(ctx);
        self.registry.tick(ctx.entities, dt);
        self.environment.update(ctx.tracer, dt)
    }

    fn start_due(&mut self, ctx: &SoundContext<'_>) {
        if self.pending.is_empty() {
            return;
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|r| r.soundtime.map_or(true, |t| t <= ctx.curtime));
        self.pending = waiting;
        for request in due {
            self.policy.emit(&mut self.registry, ctx, &request);
        }
    }

    /// Move the listener. `angles` are pitch, yaw and roll in degrees.
    pub fn set_audio_state(&mut self, origin: Vec3, angles: Vec3) {
        let transform = Transform::from_angles(origin, angles.x, angles.y, angles.z);
        let listener = Listener::from_transform(&transform);
        self.registry
            .backend_mut()
            .set_listener(listener.position, listener.forward, listener.up);
        self.environment.set_listener(origin, transform.rotation);
    }

    pub fn set_underwater(&mut self, underwater: bool) {
        self.environment.set_underwater(underwater);
    }

    /// Force a fresh classification on the next update, e.g. after a teleport.
    pub fn invalidate_environment(&mut self) {
        self.environment.invalidate();
    }

    /// Handle of the most recently started sound
    pub fn last_guid(&self) -> Option<BackendHandle> {
        self.registry.backend().last_handle()
    }

    pub fn is_sound_still_playing(&self, guid: BackendHandle) -> bool {
        self.registry.backend().is_playing(guid)
    }

    pub fn stop_sound_by_guid(&mut self, guid: BackendHandle) {
        self.registry.stop_handle(guid);
    }

    pub fn set_volume_by_guid(&mut self, guid: BackendHandle, volume: f32) {
        self.registry.set_volume(guid, volume);
    }

    /// Stop everything, including sounds still waiting to start.
    pub fn stop_all_sounds(&mut self) {
        self.pending.clear();
        self.registry.stop_all();
    }

    pub fn on_disconnected(&mut self) {
        info!("disconnected, stopping all sounds");
        self.stop_all_sounds();
    }

    /// Apply new volume settings. Affects sounds started from now on.
    pub fn update_volumes(&mut self, config: AudioConfig) {
        self.policy.set_config(config);
    }
}

impl<B: AudioBackend> AudioService for ClientAudioService<B> {
    fn role(&self) -> ServiceRole {
        ServiceRole::Client
    }

    fn emit_sound(&mut self, ctx: &SoundContext<'_>, request: EmitRequest) {
        self.emit(ctx, request);
    }

    fn stop_sound(
        &mut self,
        ctx: &SoundContext<'_>,
        entity: EntityIndex,
        channel: SourceChannel,
        sample: &str,
    ) {
        let request = EmitRequest::new(entity, channel, sample).with_flags(SoundFlags::STOP);
        self.emit(ctx, request);
    }

    fn dist_gain_from_soundlevel(&self, level: Soundlevel, distance: f32) -> f32 {
        attenuation::dist_gain(level, distance, &self.config().attenuation)
    }

    fn tick(&mut self, ctx: &SoundContext<'_>, dt: f32) {
        self.update(ctx, dt);
    }
}
