//! Client and server front ends of the sound system.
//!
//! Game code talks to an [`AudioService`]. On a client it plays sounds
//! through the channel registry; on a dedicated server it turns the same
//! requests into [`SoundMessage`](sonance_net::SoundMessage)s for clients.

mod client;
mod server;

use std::fmt;

use serde::{Deserialize, Serialize};
use sonance_core::{EntityIndex, Soundlevel, SourceChannel};

pub use client::ClientAudioService;
pub use server::ServerAudioService;

use crate::context::SoundContext;
use crate::emission::EmitRequest;

/// Which side of the connection a service runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    #[default]
    Client,
    Server,
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRole::Client => f.write_str("client"),
            ServiceRole::Server => f.write_str("server"),
        }
    }
}

/// Entry point for game code that wants to make noise.
pub trait AudioService {
    fn role(&self) -> ServiceRole;

    /// Play, update or stop a sound, depending on the request's flags.
    fn emit_sound(&mut self, ctx: &SoundContext<'_>, request: EmitRequest);

    /// Stop `sample` on `entity`'s `channel`.
    fn stop_sound(
        &mut self,
        ctx: &SoundContext<'_>,
        entity: EntityIndex,
        channel: SourceChannel,
        sample: &str,
    );

    /// Linear gain of a sound with `level` heard from `distance` units away.
    fn dist_gain_from_soundlevel(&self, level: Soundlevel, distance: f32) -> f32;

    /// Per-frame work.
    fn tick(&mut self, ctx: &SoundContext<'_>, dt: f32);
}
