//! Turning sound requests into channels.

use glam::Vec3;
use sonance_core::{EntityIndex, SoundFlags, Soundlevel, SourceChannel, PITCH_NORM};
use tracing::{debug, warn};

use crate::attenuation::FalloffRange;
use crate::backend::{AudioBackend, BackendHandle};
use crate::config::AudioConfig;
use crate::context::SoundContext;
use crate::error::AudioError;
use crate::registry::ChannelRegistry;
use crate::sample::SampleName;
use crate::spatial::BackendVector;

/// A request to play, update or stop a sound.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitRequest {
    pub entity: EntityIndex,
    pub channel: SourceChannel,
    pub sample: String,
    pub volume: f32,
    pub soundlevel: Soundlevel,
    pub flags: SoundFlags,
    /// Percent of the recorded pitch
    pub pitch: i32,
    pub special_dsp: i32,
    pub origin: Option<Vec3>,
    pub direction: Option<Vec3>,
    /// Absolute simulation time the sound should start at; `None` means now
    pub soundtime: Option<f64>,
    pub speaker: Option<EntityIndex>,
    pub from_network: bool,
}

impl EmitRequest {
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
            origin: None,
            direction: None,
            soundtime: None,
            speaker: None,
            from_network: false,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_soundlevel(mut self, soundlevel: Soundlevel) -> Self {
        self.soundlevel = soundlevel;
        self
    }

    pub fn with_flags(mut self, flags: SoundFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_pitch(mut self, pitch: i32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn at_position(mut self, origin: Vec3) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn at_time(mut self, soundtime: f64) -> Self {
        self.soundtime = Some(soundtime);
        self
    }

    /// Route the sound through `speaker`. Indices that cannot name a real
    /// entity leave the sound without one.
    pub fn with_speaker(mut self, speaker: EntityIndex) -> Self {
        self.speaker = EntityIndex::speaker(speaker.get());
        self
    }

    pub fn networked(mut self) -> Self {
        self.from_network = true;
        self
    }
}

/// Decides what a request does to the live channel set.
#[derive(Debug, Clone, Default)]
pub struct EmissionPolicy {
    config: AudioConfig,
}

impl EmissionPolicy {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AudioConfig) {
        self.config = config;
    }

    /// Handle a request. Returns the handle of the channel that was started or
    /// updated; any failure is logged and reads as "nothing played".
    pub fn emit<B: AudioBackend>(
        &self,
        registry: &mut ChannelRegistry<B>,
        ctx: &SoundContext<'_>,
        request: &EmitRequest,
    ) -> Option<BackendHandle> {
        match self.try_emit(registry, ctx, request) {
            Ok(handle) => handle,
            Err(e @ (AudioError::EmptySample | AudioError::SentenceNotSupported(_))) => {
                debug!(entity = %request.entity, "ignoring sound request: {e}");
                None
            }
            Err(e) => {
                warn!(entity = %request.entity, channel = %request.channel, "sound did not play: {e}");
                None
            }
        }
    }

    fn try_emit<B: AudioBackend>(
        &self,
        registry: &mut ChannelRegistry<B>,
        ctx: &SoundContext<'_>,
        request: &EmitRequest,
    ) -> Result<Option<BackendHandle>, AudioError> {
        let sample = SampleName::parse(&request.sample)?;
        let entity = ctx.resolve(request.entity);
        let channel = request.channel;

        if request.flags.contains(SoundFlags::STOP) {
            registry.stop(entity, channel, sample.asset_path());
            return Ok(None);
        }

        if request.flags.is_update() {
            if let Some(handle) = self.update_existing(registry, ctx, entity, &sample, request) {
                return Ok(Some(handle));
            }
        }

        if !request
            .flags
            .contains(SoundFlags::DO_NOT_OVERWRITE_EXISTING_ON_CHANNEL)
        {
            self.steal(registry, entity, channel);
        }

        let volume = request.volume * self.config.channel_volume(channel);
        let origin = request
            .origin
            .or_else(|| ctx.entities.entity(entity).map(|e| e.transform().position))
            .unwrap_or(Vec3::ZERO);
        let direction = request.direction.unwrap_or(Vec3::ZERO);

        let backend = registry.backend_mut();
        backend.load_sound(sample.asset_path(), sample.is_stream())?;
        let handle = backend.play(
            sample.asset_path(),
            volume,
            BackendVector::from_engine(origin),
            BackendVector::from_engine(direction),
            true,
        )?;

        if let Err(e) = registry.add(
            handle,
            entity,
            channel,
            request.speaker,
            request.from_network,
            volume,
        ) {
            registry.backend_mut().stop(handle);
            return Err(e);
        }

        let range = FalloffRange::from_soundlevel(request.soundlevel, &self.config.attenuation);
        let backend = registry.backend_mut();
        if request.pitch != PITCH_NORM {
            backend.set_pitch(handle, request.pitch as f32 / PITCH_NORM as f32);
        }
        backend.set_min_max_distance(handle, range.min_distance, range.max_distance);

        let late = late_offset(request.soundtime, ctx.curtime);
        if late > 0.0 {
            debug!(%handle, late, "starting late sound partway in");
            backend.set_playback_position(handle, late);
        }

        registry.update_position(handle, ctx.entities, request.origin);
        registry.backend_mut().start(handle);

        debug!(%handle, %entity, %channel, sample = %sample, "started sound");
        Ok(Some(handle))
    }

    /// Apply a pitch/volume change to sounds already playing `sample` on the
    /// entity's channel. Returns the first handle changed.
    fn update_existing<B: AudioBackend>(
        &self,
        registry: &mut ChannelRegistry<B>,
        ctx: &SoundContext<'_>,
        entity: EntityIndex,
        sample: &SampleName,
        request: &EmitRequest,
    ) -> Option<BackendHandle> {
        let matching: Vec<BackendHandle> = registry
            .playing_on(entity, request.channel)
            .into_iter()
            .filter(|&h| registry.backend().matches_name(h, sample.asset_path()))
            .collect();

        let volume = request.volume * self.config.channel_volume(request.channel);
        for &handle in &matching {
            if request.flags.contains(SoundFlags::CHANGE_PITCH) {
                registry
                    .backend_mut()
                    .set_pitch(handle, request.pitch as f32 / PITCH_NORM as f32);
            }
            if request.flags.contains(SoundFlags::CHANGE_VOL) {
                registry.set_volume(handle, volume);
            }
            registry.update_position(handle, ctx.entities, request.origin);
        }
        matching.first().copied()
    }

    /// Stop the oldest sounds on (`entity`, `channel`) until there is room for one more.
    fn steal<B: AudioBackend>(
        &self,
        registry: &mut ChannelRegistry<B>,
        entity: EntityIndex,
        channel: SourceChannel,
    ) {
        let exempt = (entity.is_world() && channel != SourceChannel::Weapon)
            || channel == SourceChannel::Static;
        if exempt {
            return;
        }

        let steal = &self.config.steal;
        let mut candidates: Vec<BackendHandle> = registry
            .playing_on(entity, channel)
            .into_iter()
            .filter(|&h| {
                channel != SourceChannel::Weapon
                    || registry
                        .backend()
                        .duration(h)
                        .is_some_and(|d| d > steal.steal_length)
            })
            .collect();

        while !candidates.is_empty() && candidates.len() >= steal.steal_max {
            let oldest = candidates.remove(0);
            debug!(handle = %oldest, %entity, %channel, "stealing channel");
            registry.stop_handle(oldest);
        }
    }
}

/// Seconds a sound is behind schedule; zero when it is on time, early or
/// unscheduled.
fn late_offset(soundtime: Option<f64>, curtime: f64) -> f32 {
    soundtime.map_or(0.0, |t| (curtime - t).max(0.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendEvent, MockBackend};
    use crate::testing::{TestEntities, TestEntity, Void};

    const PLAYER: EntityIndex = EntityIndex(1);
    const NPC: EntityIndex = EntityIndex(5);
    const GUN: &str = "weapons/rifle/fire.wav";
    const CLICK: &str = "weapons/rifle/click.wav";

    struct Fixture {
        registry: ChannelRegistry<MockBackend>,
        policy: EmissionPolicy,
        entities: TestEntities,
    }

    impl Fixture {
        fn new() -> Self {
            let backend = MockBackend::new()
                .with_duration("sound/weapons/rifle/fire.wav", 1.5)
                .with_duration("sound/weapons/rifle/click.wav", 0.1)
                .with_missing("sound/missing.wav");
            let mut entities = TestEntities::new();
            entities.insert(PLAYER, TestEntity::at(Vec3::new(0.0, 0.0, 64.0)));
            entities.insert(NPC, TestEntity::at(Vec3::new(200.0, 0.0, 64.0)));
            Self {
                registry: ChannelRegistry::new(backend),
                policy: EmissionPolicy::default(),
                entities,
            }
        }

        fn emit(&mut self, request: EmitRequest) -> Option<BackendHandle> {
            let ctx = SoundContext::new(&self.entities, &Void, 10.0).with_local_player(PLAYER);
            self.policy.emit(&mut self.registry, &ctx, &request)
        }

        fn events(&self) -> &[BackendEvent] {
            self.registry.backend().events()
        }

        fn position_of(&self, event: &BackendEvent) -> usize {
            self.events()
                .iter()
                .position(|e| e == event)
                .unwrap_or_else(|| panic!("{event:?} not in {:?}", self.events()))
        }
    }

    #[test]
    fn empty_and_sentence_samples_do_nothing() {
        let mut fx = Fixture::new();
        assert!(fx.emit(EmitRequest::new(NPC, SourceChannel::Voice, "")).is_none());
        assert!(fx
            .emit(EmitRequest::new(NPC, SourceChannel::Voice, "!HG_GREET"))
            .is_none());
        assert!(fx.events().is_empty());
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn started_sound_is_registered_and_unpaused() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(EmitRequest::new(NPC, SourceChannel::Body, "npc/step.wav"))
            .unwrap();

        let channel = fx.registry.get(handle).unwrap();
        assert_eq!(channel.entity(), NPC);
        assert_eq!(channel.source(), SourceChannel::Body);

        let voice = fx.registry.backend().voice(handle).unwrap();
        assert_eq!(voice.name, "sound/npc/step.wav");
        assert!(!voice.paused);
        assert_eq!(
            voice.position,
            BackendVector::from_engine(Vec3::new(200.0, 0.0, 64.0))
        );

        let range = FalloffRange::from_soundlevel(Soundlevel::NORM, &Default::default());
        assert!(fx.position_of(&BackendEvent::SetMinMaxDistance(
            handle,
            range.min_distance,
            range.max_distance
        )) < fx.position_of(&BackendEvent::Start(handle)));
    }

    #[test]
    fn local_player_sentinel_resolves() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(EmitRequest::new(EntityIndex::LOCAL_PLAYER, SourceChannel::Item, "items/pickup.wav"))
            .unwrap();
        assert_eq!(fx.registry.get(handle).unwrap().entity(), PLAYER);

        let ctx = SoundContext::new(&fx.entities, &Void, 10.0);
        let request = EmitRequest::new(EntityIndex::LOCAL_PLAYER, SourceChannel::Item, "ui/menu.wav");
        let handle = fx.policy.emit(&mut fx.registry, &ctx, &request).unwrap();
        assert_eq!(fx.registry.get(handle).unwrap().entity(), EntityIndex::UI_PANEL);
    }

    #[test]
    fn stop_flag_stops_matching_sound() {
        let mut fx = Fixture::new();
        let handle = fx.emit(EmitRequest::new(NPC, SourceChannel::Weapon, GUN)).unwrap();
        let result = fx.emit(EmitRequest::new(NPC, SourceChannel::Weapon, GUN).with_flags(SoundFlags::STOP));
        assert!(result.is_none());
        assert!(!fx.registry.backend().is_playing(handle));
    }

    #[test]
    fn volume_change_updates_in_place() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(EmitRequest::new(NPC, SourceChannel::Static, "ambient/hum.wav").with_volume(0.8))
            .unwrap();
        let plays_before = fx.registry.backend().events().len();

        let updated = fx
            .emit(
                EmitRequest::new(NPC, SourceChannel::Static, "ambient/hum.wav")
                    .with_volume(0.3)
                    .with_flags(SoundFlags::CHANGE_VOL),
            )
            .unwrap();

        assert_eq!(updated, handle);
        assert_eq!(fx.registry.len(), 1);
        assert!((fx.registry.backend().voice(handle).unwrap().volume - 0.3).abs() < 1e-6);
        assert!(!fx.events()[plays_before..]
            .iter()
            .any(|e| matches!(e, BackendEvent::Play { .. })));
    }

    #[test]
    fn pitch_change_without_match_starts_new_sound() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(
                EmitRequest::new(NPC, SourceChannel::Body, "npc/engine.wav")
                    .with_pitch(150)
                    .with_flags(SoundFlags::CHANGE_PITCH),
            )
            .unwrap();
        assert!(fx
            .events()
            .contains(&BackendEvent::SetPitch(handle, 1.5)));
    }

    #[test]
    fn pitch_change_retunes_matching_sound_in_place() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(EmitRequest::new(NPC, SourceChannel::Body, "npc/engine.wav"))
            .unwrap();
        let other = fx
            .emit(EmitRequest::new(PLAYER, SourceChannel::Body, "npc/engine.wav"))
            .unwrap();
        let events_before = fx.events().len();

        let updated = fx
            .emit(
                EmitRequest::new(NPC, SourceChannel::Body, "npc/engine.wav")
                    .with_pitch(80)
                    .with_flags(SoundFlags::CHANGE_PITCH),
            )
            .unwrap();

        assert_eq!(updated, handle);
        assert_eq!(fx.registry.len(), 2);
        assert!((fx.registry.backend().voice(handle).unwrap().pitch - 0.8).abs() < 1e-6);
        assert!((fx.registry.backend().voice(other).unwrap().pitch - 1.0).abs() < 1e-6);
        let since = &fx.events()[events_before..];
        assert!(since.contains(&BackendEvent::SetPitch(handle, 0.8)));
        assert!(!since.iter().any(|e| matches!(e, BackendEvent::Play { .. })));
    }

    #[test]
    fn speaker_builder_ignores_non_entities() {
        let request = EmitRequest::new(NPC, SourceChannel::Voice, "npc/hello.wav");
        assert_eq!(request.clone().with_speaker(EntityIndex(7)).speaker, Some(EntityIndex(7)));
        assert_eq!(request.clone().with_speaker(EntityIndex::WORLD).speaker, None);
        assert_eq!(request.with_speaker(EntityIndex::LOCAL_PLAYER).speaker, None);
    }

    #[test]
    fn long_weapon_sound_is_stolen_before_next_starts() {
        let mut fx = Fixture::new();
        let first = fx.emit(EmitRequest::new(PLAYER, SourceChannel::Weapon, GUN)).unwrap();
        let second = fx.emit(EmitRequest::new(PLAYER, SourceChannel::Weapon, GUN)).unwrap();

        assert_ne!(first, second);
        assert!(!fx.registry.backend().is_playing(first));
        assert!(fx.registry.backend().is_playing(second));
        assert!(
            fx.position_of(&BackendEvent::Stop(first))
                < fx.position_of(&BackendEvent::Play {
                    handle: second,
                    name: format!("sound/{GUN}"),
                })
        );
    }

    #[test]
    fn short_weapon_sounds_overlap() {
        let mut fx = Fixture::new();
        let first = fx.emit(EmitRequest::new(PLAYER, SourceChannel::Weapon, CLICK)).unwrap();
        let second = fx.emit(EmitRequest::new(PLAYER, SourceChannel::Weapon, CLICK)).unwrap();
        assert!(fx.registry.backend().is_playing(first));
        assert!(fx.registry.backend().is_playing(second));
    }

    #[test]
    fn other_channels_steal_unconditionally() {
        let mut fx = Fixture::new();
        let first = fx.emit(EmitRequest::new(NPC, SourceChannel::Voice, "npc/hello.wav")).unwrap();
        let second = fx.emit(EmitRequest::new(NPC, SourceChannel::Voice, "npc/bye.wav")).unwrap();
        assert!(!fx.registry.backend().is_playing(first));
        assert!(fx.registry.backend().is_playing(second));

        // A different slot on the same entity is untouched.
        let body = fx.emit(EmitRequest::new(NPC, SourceChannel::Body, "npc/step.wav")).unwrap();
        assert!(fx.registry.backend().is_playing(second));
        assert!(fx.registry.backend().is_playing(body));
    }

    #[test]
    fn static_and_world_sounds_are_exempt() {
        let mut fx = Fixture::new();
        let a = fx.emit(EmitRequest::new(NPC, SourceChannel::Static, "ambient/a.wav")).unwrap();
        let b = fx.emit(EmitRequest::new(NPC, SourceChannel::Static, "ambient/b.wav")).unwrap();
        let c = fx
            .emit(EmitRequest::new(EntityIndex::WORLD, SourceChannel::Auto, "ambient/c.wav"))
            .unwrap();
        let d = fx
            .emit(EmitRequest::new(EntityIndex::WORLD, SourceChannel::Auto, "ambient/d.wav"))
            .unwrap();
        for handle in [a, b, c, d] {
            assert!(fx.registry.backend().is_playing(handle));
        }

        // World weapons still steal.
        let w1 = fx.emit(EmitRequest::new(EntityIndex::WORLD, SourceChannel::Weapon, GUN)).unwrap();
        fx.emit(EmitRequest::new(EntityIndex::WORLD, SourceChannel::Weapon, GUN)).unwrap();
        assert!(!fx.registry.backend().is_playing(w1));
    }

    #[test]
    fn do_not_overwrite_keeps_existing_sound() {
        let mut fx = Fixture::new();
        let first = fx.emit(EmitRequest::new(NPC, SourceChannel::Voice, "npc/hello.wav")).unwrap();
        fx.emit(
            EmitRequest::new(NPC, SourceChannel::Voice, "npc/bye.wav")
                .with_flags(SoundFlags::DO_NOT_OVERWRITE_EXISTING_ON_CHANNEL),
        )
        .unwrap();
        assert!(fx.registry.backend().is_playing(first));
    }

    #[test]
    fn backend_failures_record_nothing() {
        let mut fx = Fixture::new();
        assert!(fx.emit(EmitRequest::new(NPC, SourceChannel::Item, "missing.wav")).is_none());
        assert!(fx.registry.is_empty());

        let mut full = Fixture::new();
        full.registry = ChannelRegistry::new(MockBackend::new().with_voice_limit(1));
        full.emit(EmitRequest::new(NPC, SourceChannel::Item, "a.wav")).unwrap();
        assert!(full.emit(EmitRequest::new(PLAYER, SourceChannel::Item, "b.wav")).is_none());
        assert_eq!(full.registry.len(), 1);
    }

    #[test]
    fn world_sound_uses_remapped_origin() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(
                EmitRequest::new(EntityIndex::WORLD, SourceChannel::Static, "ambient/drip.wav")
                    .at_position(Vec3::new(10.0, 20.0, 30.0)),
            )
            .unwrap();
        let voice = fx.registry.backend().voice(handle).unwrap();
        assert_eq!(voice.position.0, Vec3::new(10.0, 30.0, -20.0));
    }

    #[test]
    fn late_sound_starts_partway_in() {
        let mut fx = Fixture::new();
        let handle = fx
            .emit(EmitRequest::new(NPC, SourceChannel::Body, "npc/step.wav").at_time(9.75))
            .unwrap();
        assert!(fx.events().contains(&BackendEvent::Seek(handle, 0.25)));

        let on_time = fx
            .emit(EmitRequest::new(PLAYER, SourceChannel::Body, "npc/step.wav"))
            .unwrap();
        assert!(!fx
            .events()
            .iter()
            .any(|e| matches!(e, BackendEvent::Seek(h, _) if *h == on_time)));
    }

    #[test]
    fn channel_volume_scales_request() {
        let mut fx = Fixture::new();
        fx.policy = EmissionPolicy::new(AudioConfig {
            master_volume: 0.5,
            voice_volume: 0.5,
            ..Default::default()
        });
        let handle = fx
            .emit(EmitRequest::new(NPC, SourceChannel::Voice, "npc/hello.wav"))
            .unwrap();
        assert!((fx.registry.get(handle).unwrap().volume() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn late_offset_only_counts_past_times() {
        assert_eq!(late_offset(None, 10.0), 0.0);
        assert_eq!(late_offset(Some(12.0), 10.0), 0.0);
        assert!((late_offset(Some(9.5), 10.0) - 0.5).abs() < 1e-6);
        // Times at or before zero are still real schedules.
        assert!((late_offset(Some(0.0), 0.4) - 0.4).abs() < 1e-6);
        assert!((late_offset(Some(-0.3), 0.2) - 0.5).abs() < 1e-6);
    }
}
