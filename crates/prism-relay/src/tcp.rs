use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::channel::RelayChannel;
use crate::error::{RelayResult, TransportError};
use crate::message::{PositionPatch, decode, encode};

/// Encoded lines that may wait for the writer task before sends are refused.
pub const OUTBOUND_CAPACITY: usize = 64;

/// Newline-delimited JSON over one TCP connection.
///
/// Both directions run as tokio tasks, so constructors must be called from
/// within a runtime. `send` only enqueues and can be called from any thread.
/// Inbound lines are either queued for [`RelayChannel::try_recv`] or handed
/// straight to a forwarding callback, depending on the constructor.
pub struct TcpRelay {
    outbound: mpsc::Sender<String>,
    peer: SocketAddr,
    local: SocketAddr,
    connected: Arc<AtomicBool>,
    incoming: Option<mpsc::UnboundedReceiver<RelayResult<PositionPatch>>>,
    reader: Option<JoinHandle<()>>,
}

impl TcpRelay {
    pub async fn connect(addr: impl ToSocketAddrs) -> RelayResult<Self> {
        Self::new(TcpStream::connect(addr).await?)
    }

    /// Waits for a single peer to connect.
    pub async fn accept(listener: &TcpListener) -> RelayResult<Self> {
        let (stream, _) = listener.accept().await?;
        Self::new(stream)
    }

    /// Queues inbound messages for `try_recv`.
    pub fn new(stream: TcpStream) -> RelayResult<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut relay = Self::spawn(stream, move |msg| tx.send(msg).is_ok())?;
        relay.incoming = Some(rx);
        Ok(relay)
    }

    /// Calls `on_patch` from the reader task for every recognized message.
    ///
    /// Bad messages and the final disconnect are logged there. Reading stops
    /// once `on_patch` returns `false`. `try_recv` on such a relay always
    /// yields `None`.
    pub fn forwarding<F>(stream: TcpStream, mut on_patch: F) -> RelayResult<Self>
    where
        F: FnMut(PositionPatch) -> bool + Send + 'static,
    {
        Self::spawn(stream, move |msg| match msg {
            Ok(patch) => on_patch(patch),
            Err(TransportError::Disconnected) => {
                log::warn!("relay peer disconnected");
                false
            }
            Err(e) => {
                log::warn!("dropping relay message: {e}");
                true
            }
        })
    }

    fn spawn<F>(stream: TcpStream, sink: F) -> RelayResult<Self>
    where
        F: FnMut(RelayResult<PositionPatch>) -> bool + Send + 'static,
    {
        let peer = stream.peer_addr()?;
        let local = stream.local_addr()?;
        let (read_half, write_half) = stream.into_split();
        let connected = Arc::new(AtomicBool::new(true));
        let (outbound, lines) = mpsc::channel(OUTBOUND_CAPACITY);

        tokio::spawn(write_lines(write_half, lines, Arc::clone(&connected)));
        let reader = tokio::spawn(read_lines(read_half, sink, Arc::clone(&connected)));
        log::info!("relay connected to {peer}");

        Ok(Self {
            outbound,
            peer,
            local,
            connected,
            incoming: None,
            reader: Some(reader),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// `false` once the peer hung up or a write failed.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Resolves when the reader task finishes, i.e. when the peer hangs up.
    pub async fn join(mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.await;
        }
    }
}

impl RelayChannel for TcpRelay {
    /// Hands the encoded line to the writer task without waiting on the
    /// socket. A full queue drops this patch.
    fn send(&mut self, patch: &PositionPatch) -> RelayResult<()> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        let mut line = encode(patch)?;
        line.push('\n');
        self.outbound.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Backlogged,
            TrySendError::Closed(_) => TransportError::Disconnected,
        })
    }

    fn try_recv(&mut self) -> Option<RelayResult<PositionPatch>> {
        self.incoming.as_mut()?.try_recv().ok()
    }
}

impl Drop for TcpRelay {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn write_lines(
    mut writer: OwnedWriteHalf,
    mut lines: mpsc::Receiver<String>,
    connected: Arc<AtomicBool>,
) {
    while let Some(line) = lines.recv().await {
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            log::debug!("relay write failed: {e}");
            connected.store(false, Ordering::Release);
            return;
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_lines<F>(reader: OwnedReadHalf, mut sink: F, connected: Arc<AtomicBool>)
where
    F: FnMut(RelayResult<PositionPatch>) -> bool,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let msg = match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => decode(&line),
            Ok(None) => break,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(TransportError::Unrecognized("line is not valid UTF-8".into()))
            }
            Err(e) => {
                log::debug!("relay read failed: {e}");
                break;
            }
        };
        if !sink(msg) {
            return;
        }
    }
    connected.store(false, Ordering::Release);
    sink(Err(TransportError::Disconnected));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::io::AsyncReadExt;

    async fn connected_pair() -> (TcpRelay, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (server, client) = tokio::join!(TcpRelay::accept(&listener), TcpStream::connect(addr));
        (server.unwrap(), client.unwrap())
    }

    async fn next_message(relay: &mut TcpRelay) -> RelayResult<PositionPatch> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(msg) = relay.try_recv() {
                return msg;
            }
            assert!(Instant::now() < deadline, "timed out waiting for relay message");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn lines_are_decoded_in_order() {
        let (mut server, mut client) = connected_pair().await;
        client
            .write_all(b"{\"x\": 1}\n\nnot json\n{\"y\": 2, \"z\": 3}\n")
            .await
            .unwrap();

        assert_eq!(next_message(&mut server).await.unwrap().x, Some(1.0));
        assert!(matches!(
            next_message(&mut server).await,
            Err(TransportError::Malformed(_))
        ));
        let patch = next_message(&mut server).await.unwrap();
        assert_eq!((patch.y, patch.z), (Some(2.0), Some(3.0)));
    }

    #[tokio::test]
    async fn hangup_reports_disconnect_once() {
        let (mut server, client) = connected_pair().await;
        assert!(server.is_connected());
        drop(client);
        assert!(matches!(
            next_message(&mut server).await,
            Err(TransportError::Disconnected)
        ));
        assert!(!server.is_connected());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(server.try_recv().is_none());
        assert!(matches!(
            server.send(&PositionPatch::new(0.0, 0.0, 0.0)),
            Err(TransportError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn relays_talk_to_each_other() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (server, client) = tokio::join!(TcpRelay::accept(&listener), TcpRelay::connect(addr));
        let (mut server, mut client) = (server.unwrap(), client.unwrap());

        client.send(&PositionPatch::new(0.5, -1.0, 2.0)).unwrap();
        assert_eq!(
            next_message(&mut server).await.unwrap(),
            PositionPatch::new(0.5, -1.0, 2.0)
        );
        assert_eq!(server.peer_addr(), client.local_addr());
    }

    #[tokio::test]
    async fn sends_are_newline_terminated() {
        let (mut server, mut client) = connected_pair().await;
        server.send(&PositionPatch::new(1.0, 2.0, 3.0)).unwrap();
        drop(server);

        let mut text = String::new();
        client.read_to_string(&mut text).await.unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(decode(text.trim_end()).unwrap(), PositionPatch::new(1.0, 2.0, 3.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stalled_peer_never_blocks_send() {
        // The client end is held open but never read.
        let (mut server, _client) = connected_pair().await;
        let started = Instant::now();
        let mut backlogged = false;
        for i in 0..2_000_000u32 {
            match server.send(&PositionPatch::new(i as f32, 0.0, 0.0)) {
                Ok(()) => {}
                Err(TransportError::Backlogged) => {
                    backlogged = true;
                    break;
                }
                Err(e) => panic!("unexpected send error: {e}"),
            }
        }
        assert!(backlogged, "send queue never filled");
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(server.is_connected());
    }

    #[tokio::test]
    async fn forwarding_relay_calls_back_until_hangup() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"{\"x\": 1}\n[1,2]\n{\"z\": -1}\n")
                .await
                .unwrap();
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let relay = TcpRelay::forwarding(stream, move |p| tx.send(p).is_ok()).unwrap();
        client.await.unwrap();
        relay.join().await;

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].x, Some(1.0));
        assert_eq!(got[1].z, Some(-1.0));
    }
}
