use sonance_core::{EntityIndex, SceneTracer};

use crate::registry::EntityLookup;

/// Engine state the sound system borrows for one frame.
///
/// Built by the caller each frame; nothing in it outlives the call it is
/// passed to.
#[derive(Clone, Copy)]
pub struct SoundContext<'a> {
    pub entities: &'a dyn EntityLookup,
    pub tracer: &'a dyn SceneTracer,
    /// The connected player's entity, `None` while not connected
    pub local_player: Option<EntityIndex>,
    /// Current simulation time in seconds
    pub curtime: f64,
}

impl<'a> SoundContext<'a> {
    pub fn new(entities: &'a dyn EntityLookup, tracer: &'a dyn SceneTracer, curtime: f64) -> Self {
        Self {
            entities,
            tracer,
            local_player: None,
            curtime,
        }
    }

    pub fn with_local_player(mut self, player: EntityIndex) -> Self {
        self.local_player = Some(player);
        self
    }

    /// Replace the local-player sentinel with the connected player, or the
    /// UI panel when not connected.
    pub fn resolve(&self, entity: EntityIndex) -> EntityIndex {
        if entity == EntityIndex::LOCAL_PLAYER {
            self.local_player.unwrap_or(EntityIndex::UI_PANEL)
        } else {
            entity
        }
    }
}
