//! Remote position updates for a running scene.
//!
//! A peer sends `{x, y, z}` patches as JSON text over an ordered channel.
//! Recognized messages become position-only
//! [`TransformPatch`](prism_scene::TransformPatch)es; anything else is logged
//! and dropped.

pub mod channel;
pub mod error;
pub mod message;
pub mod tcp;

pub use channel::{LoopbackChannel, RelayChannel, drain};
pub use error::{RelayResult, TransportError};
pub use message::{PositionPatch, decode, encode};
pub use tcp::{OUTBOUND_CAPACITY, TcpRelay};
