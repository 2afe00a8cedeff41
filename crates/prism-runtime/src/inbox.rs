use std::sync::mpsc::{self, Receiver, Sender};

use prism_scene::{ObjectId, TransformPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchTarget {
    /// The object created by `initialize`.
    Primary,
    Object(ObjectId),
}

#[derive(Debug, Clone, Copy)]
pub struct QueuedPatch {
    pub target: PatchTarget,
    pub patch: TransformPatch,
}

/// Queue of patches produced off the frame thread.
///
/// Drained at the start of every tick so a pose never changes mid-render.
pub struct PatchInbox {
    tx: Sender<QueuedPatch>,
    rx: Receiver<QueuedPatch>,
}

impl PatchInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> PatchSender {
        PatchSender {
            tx: self.tx.clone(),
        }
    }

    pub fn try_recv(&self) -> Option<QueuedPatch> {
        self.rx.try_recv().ok()
    }
}

impl Default for PatchInbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, `Send` handle for queueing patches from any thread.
#[derive(Clone)]
pub struct PatchSender {
    tx: Sender<QueuedPatch>,
}

impl PatchSender {
    /// Returns `false` once the runtime is gone.
    pub fn send(&self, patch: TransformPatch) -> bool {
        self.send_to(PatchTarget::Primary, patch)
    }

    pub fn send_to(&self, target: PatchTarget, patch: TransformPatch) -> bool {
        self.tx.send(QueuedPatch { target, patch }).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_arrive_in_send_order_across_threads() {
        let inbox = PatchInbox::new();
        let sender = inbox.sender();
        std::thread::spawn(move || {
            for i in 0..3 {
                sender.send(TransformPatch::default().with_x(i as f32));
            }
        })
        .join()
        .unwrap();

        let xs: Vec<_> = std::iter::from_fn(|| inbox.try_recv())
            .map(|q| q.patch.x.unwrap())
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn sender_reports_closed_runtime() {
        let inbox = PatchInbox::new();
        let sender = inbox.sender();
        drop(inbox);
        assert!(!sender.send(TransformPatch::position(0.0, 0.0, 0.0)));
    }
}
