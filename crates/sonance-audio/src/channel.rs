use sonance_core::{EntityIndex, SourceChannel};

use crate::backend::BackendHandle;

/// One live sound instance tracked by the [`ChannelRegistry`](crate::ChannelRegistry).
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    handle: BackendHandle,
    entity: EntityIndex,
    source: SourceChannel,
    speaker: Option<EntityIndex>,
    from_network: bool,
    volume: f32,
}

impl Channel {
    pub(crate) fn new(
        handle: BackendHandle,
        entity: EntityIndex,
        source: SourceChannel,
        speaker: Option<EntityIndex>,
        from_network: bool,
        volume: f32,
    ) -> Self {
        Self {
            handle,
            entity,
            source,
            speaker,
            from_network,
            volume,
        }
    }

    pub fn handle(&self) -> BackendHandle {
        self.handle
    }

    pub fn entity(&self) -> EntityIndex {
        self.entity
    }

    pub fn source(&self) -> SourceChannel {
        self.source
    }

    /// Entity whose lifetime bounds this sound, if any
    pub fn speaker(&self) -> Option<EntityIndex> {
        self.speaker
    }

    /// Created from a network message and not yet matched to a local entity
    pub fn from_network(&self) -> bool {
        self.from_network
    }

    /// Volume the channel was last asked to play at, before spatial falloff
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether this channel plays on `entity`'s `source` slot
    pub fn is_on(&self, entity: EntityIndex, source: SourceChannel) -> bool {
        self.entity == entity && self.source == source
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.from_network = false;
    }
}
