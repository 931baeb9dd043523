//! Sonance Net - Wire messages for networked sound events
//!
//! The server tells clients about sounds with a [`SoundMessage`]. Messages
//! travel as JSON text frames wrapped in an envelope carrying the message type
//! id and delivery class; transport is left to the caller.

mod codec;
mod error;
mod message;

pub use codec::{decode, encode, NetMessage};
pub use error::NetError;
pub use message::{SoundMessage, MAX_SAMPLE_NAME, SOUND_MESSAGE_TYPE};
