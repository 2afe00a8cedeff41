use std::net::SocketAddr;

use prism_relay::{PositionPatch, RelayChannel, TcpRelay, TransportError};
use prism_runtime::PatchSender;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::{RelayMode, RelaySection};

/// The app's end of the relay.
///
/// Connecting, reading and writing all happen on a small tokio runtime so a
/// slow or absent peer never holds up a frame. Inbound patches go straight
/// into the runtime's `PatchSender`.
pub struct RelayLink {
    relay: Option<TcpRelay>,
    pending: Option<oneshot::Receiver<TcpRelay>>,
    #[allow(dead_code)]
    runtime: Runtime,
}

impl RelayLink {
    /// `None` when the relay is off or its runtime cannot start.
    pub fn start(config: &RelaySection, sender: PatchSender) -> Option<Self> {
        let mode = config.mode;
        if mode == RelayMode::Off {
            return None;
        }

        let runtime = match Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("prism-relay")
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("could not start relay runtime: {e}");
                return None;
            }
        };

        let address = config.address.clone();
        let (tx, rx) = oneshot::channel();
        runtime.spawn(async move {
            let stream = match mode {
                RelayMode::Listen => listen_once(&address).await,
                RelayMode::Connect => TcpStream::connect(&address).await,
                RelayMode::Off => return,
            };
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("relay unavailable on {address}: {e}");
                    return;
                }
            };

            match TcpRelay::forwarding(stream, move |patch| sender.send(patch.into())) {
                Ok(relay) => {
                    let _ = tx.send(relay);
                }
                Err(e) => log::warn!("relay setup failed: {e}"),
            }
        });

        Some(Self {
            relay: None,
            pending: Some(rx),
            runtime,
        })
    }

    /// Picks up a finished connection and forgets a peer that hung up.
    pub fn poll(&mut self) {
        if let Some(pending) = &mut self.pending {
            match pending.try_recv() {
                Ok(relay) => {
                    self.relay = Some(relay);
                    self.pending = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => self.pending = None,
            }
        }
        if self.relay.as_ref().is_some_and(|relay| !relay.is_connected()) {
            log::debug!("dropping closed relay");
            self.relay = None;
        }
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.relay.as_ref().map(TcpRelay::peer_addr)
    }

    /// Queues `patch` for the peer, if one is connected. Failures are logged
    /// and the patch is dropped.
    pub fn send(&mut self, patch: &PositionPatch) {
        let Some(relay) = &mut self.relay else {
            return;
        };
        match relay.send(patch) {
            Ok(()) => {}
            Err(TransportError::Disconnected) => {
                log::warn!("relay peer disconnected");
                self.relay = None;
            }
            Err(e) => log::warn!("relay send failed: {e}"),
        }
    }
}

async fn listen_once(address: &str) -> std::io::Result<TcpStream> {
    let listener = TcpListener::bind(address).await?;
    log::info!("waiting for relay peer on {}", listener.local_addr()?);
    let (stream, _) = listener.accept().await?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::time::{Duration, Instant};

    use glam::Vec3;
    use prism_runtime::{HeadlessSurface, RuntimeOptions, SceneRuntime, Viewport};

    fn connect_to(listener: &std::net::TcpListener) -> RelaySection {
        RelaySection {
            mode: RelayMode::Connect,
            address: listener.local_addr().unwrap().to_string(),
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn relay_off_starts_nothing() {
        let inbox = prism_runtime::PatchInbox::new();
        assert!(RelayLink::start(&RelaySection::default(), inbox.sender()).is_none());
    }

    #[test]
    fn peer_patches_reach_the_scene_past_bad_lines() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let surface = HeadlessSurface::new();
        let log = surface.log();
        let options = RuntimeOptions {
            enable_spin: false,
            ..RuntimeOptions::default()
        };
        let mut rt = SceneRuntime::initialize(Viewport::new(640, 480), options, surface).unwrap();
        let mut link = RelayLink::start(&connect_to(&listener), rt.patch_sender()).unwrap();

        let (mut peer, _) = listener.accept().unwrap();
        peer.write_all(b"{\"x\": 1.5}\nnot json\n{\"hello\": 1}\n{\"y\": -2, \"z\": 0.25}\n")
            .unwrap();

        let id = rt.primary_object();
        let started = Instant::now();
        wait_for(|| {
            rt.tick(started.elapsed());
            rt.transform(id).unwrap().position == Vec3::new(1.5, -2.0, 0.25)
        });
        let frames = log.borrow().frames;
        assert!(frames > 0);
        assert_eq!(log.borrow().last_frame[0].position, Vec3::new(1.5, -2.0, 0.25));

        wait_for(|| {
            link.poll();
            link.peer().is_some()
        });
        assert_eq!(link.peer(), Some(peer.local_addr().unwrap()));

        rt.tick(started.elapsed());
        assert_eq!(log.borrow().frames, frames + 1);
    }

    #[test]
    fn hung_up_peer_is_forgotten() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let inbox = prism_runtime::PatchInbox::new();
        let mut link = RelayLink::start(&connect_to(&listener), inbox.sender()).unwrap();
        let (peer, _) = listener.accept().unwrap();
        wait_for(|| {
            link.poll();
            link.peer().is_some()
        });

        drop(peer);
        wait_for(|| {
            link.poll();
            link.peer().is_none()
        });
        link.send(&PositionPatch::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn outbound_edits_reach_the_peer() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let inbox = prism_runtime::PatchInbox::new();
        let mut link = RelayLink::start(&connect_to(&listener), inbox.sender()).unwrap();
        let (peer, _) = listener.accept().unwrap();
        wait_for(|| {
            link.poll();
            link.peer().is_some()
        });

        link.send(&PositionPatch {
            x: Some(3.0),
            ..PositionPatch::default()
        });
        let mut line = String::new();
        BufReader::new(peer).read_line(&mut line).unwrap();
        assert_eq!(prism_relay::decode(line.trim_end()).unwrap().x, Some(3.0));
    }
}
