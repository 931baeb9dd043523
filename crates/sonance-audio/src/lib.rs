//! Sonance Audio - Acoustic space classification and spatial sound channels
//!
//! Probes the geometry around the listener to pick a room type for reverb,
//! and manages the live set of spatialized sounds: starting, updating,
//! stealing and reaping them against entity state and a playback backend.

mod attenuation;
mod backend;
mod channel;
mod config;
mod context;
mod emission;
mod environment;
mod error;
mod probe;
mod registry;
mod room;
mod sample;
mod service;
mod spatial;

#[cfg(test)]
mod testing;

pub use attenuation::{dist_gain, dist_mult, FalloffRange};
pub use backend::{AudioBackend, BackendEvent, BackendHandle, KiraBackend, MockBackend, MockVoice};
pub use channel::Channel;
pub use config::{
    AttenuationConfig, AudioConfig, ClassifierConfig, ProbeConfig, StealConfig, MAX_TRACE_LENGTH,
};
pub use context::SoundContext;
pub use emission::{EmissionPolicy, EmitRequest};
pub use environment::{AcousticEnvironment, AcousticSpace, AudioListenerState};
pub use error::AudioError;
pub use probe::{GeometryProber, SpaceSample, RING_RAYS};
pub use registry::{ChannelRegistry, EntityLookup, SoundEntity, Spatialization};
pub use room::{classify, RoomClassifier, RoomType};
pub use sample::{is_sentence, SampleName};
pub use service::{AudioService, ClientAudioService, ServerAudioService, ServiceRole};
pub use spatial::{compute_spatial, BackendVector, Listener, SpatialParams};
