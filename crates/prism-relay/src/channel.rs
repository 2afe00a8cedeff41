use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::{RelayResult, TransportError};
use crate::message::{PositionPatch, decode, encode};

/// A reliable, ordered, single-peer message pipe.
pub trait RelayChannel {
    /// Queues `patch` for the peer. Never waits on the network.
    fn send(&mut self, patch: &PositionPatch) -> RelayResult<()>;

    /// Next inbound message, if one has arrived. Never blocks.
    ///
    /// A lost peer is reported as [`TransportError::Disconnected`] exactly
    /// once; after that this returns `None`.
    fn try_recv(&mut self) -> Option<RelayResult<PositionPatch>>;
}

/// Hands every pending patch to `apply`, logging and skipping bad messages.
///
/// Returns `false` if the peer disconnect was observed during this call.
pub fn drain<C>(channel: &mut C, mut apply: impl FnMut(PositionPatch)) -> bool
where
    C: RelayChannel + ?Sized,
{
    let mut connected = true;
    while let Some(msg) = channel.try_recv() {
        match msg {
            Ok(patch) => apply(patch),
            Err(TransportError::Disconnected) => {
                log::warn!("relay peer disconnected");
                connected = false;
            }
            Err(e) => log::warn!("dropping relay message: {e}"),
        }
    }
    connected
}

/// In-process channel carrying the same encoded text as the TCP relay.
pub struct LoopbackChannel {
    tx: Sender<String>,
    rx: Receiver<String>,
    closed: bool,
}

impl LoopbackChannel {
    /// Two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                closed: false,
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                closed: false,
            },
        )
    }

    /// Sends raw text, bypassing the encoder.
    pub fn send_raw(&mut self, text: impl Into<String>) -> RelayResult<()> {
        self.tx
            .send(text.into())
            .map_err(|_| TransportError::Disconnected)
    }
}

impl RelayChannel for LoopbackChannel {
    fn send(&mut self, patch: &PositionPatch) -> RelayResult<()> {
        let text = encode(patch)?;
        self.send_raw(text)
    }

    fn try_recv(&mut self) -> Option<RelayResult<PositionPatch>> {
        match self.rx.try_recv() {
            Ok(text) => Some(decode(&text)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) if self.closed => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                Some(Err(TransportError::Disconnected))
            }
        }
    }
}
