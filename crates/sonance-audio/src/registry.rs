//! The set of live sound channels.
//!
//! The registry owns the backend and every [`Channel`] record. Each frame,
//! [`ChannelRegistry::tick`] sweeps the channels in age order, pushes entity
//! positions to the backend and collects channels that should go away. The
//! collected removals are applied in one [`ChannelRegistry::reap`] after the
//! sweep, so no channel disappears while the sweep is still running.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use sonance_core::{EntityIndex, SourceChannel, Transform};
use tracing::{debug, trace};

use crate::backend::{AudioBackend, BackendHandle};
use crate::channel::Channel;
use crate::error::AudioError;
use crate::spatial::BackendVector;

/// Where and how loudly an entity is heard on one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spatialization {
    pub origin: Vec3,
    pub rotation: Quat,
    /// Audible radius; zero means unbounded
    pub radius: f32,
}

impl Spatialization {
    fn from_transform(transform: &Transform) -> Self {
        Self {
            origin: transform.position,
            rotation: transform.rotation,
            radius: 0.0,
        }
    }
}

/// An engine entity that can emit sound.
pub trait SoundEntity {
    fn transform(&self) -> Transform;

    /// Whether the entity is audible on `channel`. Implementors may move the
    /// emission point by editing `info`. Entities that do not override this
    /// are never audible.
    fn sound_spatialization(&self, _channel: SourceChannel, _info: &mut Spatialization) -> bool {
        false
    }
}

/// Resolves entity indices to live entities.
pub trait EntityLookup {
    fn entity(&self, index: EntityIndex) -> Option<&dyn SoundEntity>;
}

impl<T: SoundEntity> EntityLookup for HashMap<EntityIndex, T> {
    fn entity(&self, index: EntityIndex) -> Option<&dyn SoundEntity> {
        self.get(&index).map(|e| e as &dyn SoundEntity)
    }
}

/// Push an entity's current spatialization for `channel` to the backend.
fn push_spatialization<B: AudioBackend>(backend: &mut B, channel: &Channel, entity: &dyn SoundEntity) {
    let mut info = Spatialization::from_transform(&entity.transform());
    let audible = entity.sound_spatialization(channel.source(), &mut info);
    backend.set_position(channel.handle(), BackendVector::from_engine(info.origin));
    backend.set_muted(channel.handle(), !audible);
}

/// Owns the backend and every live channel, oldest first.
pub struct ChannelRegistry<B: AudioBackend> {
    backend: B,
    channels: Vec<Channel>,
    pending_removals: Vec<BackendHandle>,
}

impl<B: AudioBackend> ChannelRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            channels: Vec::new(),
            pending_removals: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Live channels, oldest first
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, handle: BackendHandle) -> Option<&Channel> {
        self.channels.iter().find(|c| c.handle() == handle)
    }

    pub fn contains(&self, handle: BackendHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Track a sound the backend just started. A speaker that cannot name a
    /// real entity is dropped.
    pub fn add(
        &mut self,
        handle: BackendHandle,
        entity: EntityIndex,
        source: SourceChannel,
        speaker: Option<EntityIndex>,
        from_network: bool,
        volume: f32,
    ) -> Result<BackendHandle, AudioError> {
        if self.contains(handle) {
            return Err(AudioError::DuplicateHandle(handle));
        }
        trace!(%handle, %entity, %source, "channel added");
        self.channels.push(Channel::new(
            handle,
            entity,
            source,
            speaker.filter(|s| s.is_spatial()),
            from_network,
            volume,
        ));
        Ok(handle)
    }

    /// Forget a channel immediately, without stopping its sound.
    pub fn remove(&mut self, handle: BackendHandle) -> Option<Channel> {
        let index = self.channels.iter().position(|c| c.handle() == handle)?;
        Some(self.channels.remove(index))
    }

    /// Schedule a channel for removal at the next reap.
    pub fn queue_removal(&mut self, handle: BackendHandle) {
        if !self.pending_removals.contains(&handle) {
            self.pending_removals.push(handle);
        }
    }

    /// Apply every queued removal. Returns how many channels were removed.
    pub fn reap(&mut self) -> usize {
        if self.pending_removals.is_empty() {
            return 0;
        }
        let pending = std::mem::take(&mut self.pending_removals);
        let before = self.channels.len();
        self.channels.retain(|c| !pending.contains(&c.handle()));
        let reaped = before - self.channels.len();
        if reaped > 0 {
            debug!(reaped, live = self.channels.len(), "reaped channels");
        }
        reaped
    }

    /// Stop a channel's sound and schedule its removal.
    pub fn stop_handle(&mut self, handle: BackendHandle) {
        self.backend.stop(handle);
        self.queue_removal(handle);
    }

    /// Stop every channel on (`entity`, `source`) playing the asset `asset_path`.
    pub fn stop(&mut self, entity: EntityIndex, source: SourceChannel, asset_path: &str) -> usize {
        let handles: Vec<BackendHandle> = self
            .channels
            .iter()
            .filter(|c| c.is_on(entity, source))
            .map(Channel::handle)
            .filter(|&h| self.backend.matches_name(h, asset_path))
            .collect();
        for &handle in &handles {
            self.stop_handle(handle);
        }
        handles.len()
    }

    /// Stop every sound the backend is playing; channels are reaped next tick.
    pub fn stop_all(&mut self) {
        self.backend.stop_all();
        let handles: Vec<BackendHandle> = self.channels.iter().map(Channel::handle).collect();
        for handle in handles {
            self.queue_removal(handle);
        }
    }

    /// Handles on (`entity`, `source`) the backend still reports as playing, oldest first.
    pub fn playing_on(&self, entity: EntityIndex, source: SourceChannel) -> Vec<BackendHandle> {
        self.channels
            .iter()
            .filter(|c| c.is_on(entity, source))
            .map(Channel::handle)
            .filter(|&h| self.backend.is_playing(h))
            .collect()
    }

    /// Change a channel's volume in the backend and the record.
    pub fn set_volume(&mut self, handle: BackendHandle, volume: f32) {
        if let Some(channel) = self.channels.iter_mut().find(|c| c.handle() == handle) {
            channel.set_volume(volume);
            self.backend.set_volume(handle, volume);
        }
    }

    /// Bring a channel's position up to date.
    ///
    /// World sounds keep the position they were started with. A channel whose
    /// entity resolves follows the entity; otherwise `origin`, when given, is
    /// used and the sound is unmuted.
    pub fn update_position(
        &mut self,
        handle: BackendHandle,
        entities: &dyn EntityLookup,
        origin: Option<Vec3>,
    ) {
        let Some(channel) = self.channels.iter_mut().find(|c| c.handle() == handle) else {
            return;
        };
        if channel.entity().is_world() {
            return;
        }

        if let Some(entity) = entities.entity(channel.entity()) {
            channel.mark_resolved();
            push_spatialization(&mut self.backend, channel, entity);
        } else if let Some(origin) = origin {
            self.backend
                .set_position(handle, BackendVector::from_engine(origin));
            self.backend.set_muted(handle, false);
        }
    }

    /// Per-frame sweep. Returns the number of channels reaped.
    ///
    /// For each channel, oldest first:
    /// a channel whose speaker is gone is stopped; one the backend no longer
    /// plays is dropped; world and UI sounds are left alone; a channel whose
    /// entity resolves follows it; a local channel whose entity vanished is
    /// stopped. Network channels wait for their entity to show up.
    pub fn tick(&mut self, entities: &dyn EntityLookup, dt: f32) -> usize {
        let backend = &mut self.backend;
        let pending = &mut self.pending_removals;

        for channel in &mut self.channels {
            let handle = channel.handle();

            if let Some(speaker) = channel.speaker() {
                if entities.entity(speaker).is_none() {
                    debug!(%handle, %speaker, "speaker entity gone, stopping");
                    backend.stop(handle);
                    pending.push(handle);
                    continue;
                }
            }

            if !backend.is_playing(handle) {
                pending.push(handle);
                continue;
            }

            if !channel.entity().is_spatial() {
                continue;
            }

            match entities.entity(channel.entity()) {
                Some(entity) => {
                    channel.mark_resolved();
                    push_spatialization(backend, channel, entity);
                }
                None if channel.from_network() || channel.source() == SourceChannel::Static => {}
                None => {
                    debug!(%handle, entity = %channel.entity(), "emitting entity gone, stopping");
                    backend.stop(handle);
                    pending.push(handle);
                }
            }
        }

        let reaped = self.reap();
        self.backend.update(dt);
        reaped
    }
}
