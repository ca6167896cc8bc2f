//! Once-only configuration broadcast from the master node to workers.
//!
//! The transport belongs to the host; this module only decides what is
//! sent and when. The master commits its [`ViewerConfig`] exactly once and
//! then stops sharing. A worker takes the first payload it receives and
//! ignores the channel afterwards. Nothing may be drawn on a worker before
//! that first payload has arrived.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::config::{ConfigWarning, ViewerConfig};

/// Outgoing side of the host's data-sharing channel.
pub trait SharedSink {
    /// Deliver `payload` to every worker.
    fn send(&mut self, payload: &str) -> Result<(), SyncError>;
}

/// Incoming side of the host's data-sharing channel.
pub trait SharedSource {
    /// Block until the next payload arrives.
    fn recv(&mut self) -> Result<String, SyncError>;
}

/// Configuration sync failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The other end of the channel is gone.
    Disconnected,
    /// A worker was asked for its config before receiving one.
    NotConfigured,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("shared data channel disconnected"),
            Self::NotConfigured => f.write_str("worker has not received its configuration yet"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SyncError {}

/// Node role in the cluster.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Owns the command line and broadcasts the configuration.
    Master,
    /// Render node that receives the configuration.
    Worker,
}

/// Per-node configuration sync state.
#[derive(Clone, Debug)]
pub struct ConfigSync {
    role: Role,
    config: Option<ViewerConfig>,
    sharing: bool,
}

impl ConfigSync {
    /// Master node holding the startup configuration.
    pub fn master(config: ViewerConfig) -> Self {
        Self {
            role: Role::Master,
            config: Some(config),
            sharing: true,
        }
    }

    /// Worker node waiting for the broadcast.
    pub fn worker() -> Self {
        Self {
            role: Role::Worker,
            config: None,
            sharing: true,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the channel is still in use by this node.
    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    /// The configuration, once known.
    pub fn config(&self) -> Result<&ViewerConfig, SyncError> {
        self.config.as_ref().ok_or(SyncError::NotConfigured)
    }

    /// Master: send the configuration if it has not been sent yet, then stop
    /// sharing. Returns whether anything was sent. Workers never send.
    pub fn commit<S: SharedSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool, SyncError> {
        if self.role != Role::Master || !self.sharing {
            return Ok(false);
        }
        let config = self.config()?;
        let payload = config.encode();
        sink.send(&payload)?;
        log::debug!("config broadcast: {payload}");
        self.sharing = false;
        Ok(true)
    }

    /// Worker: receive and decode the configuration if it has not arrived
    /// yet. Returns the decode warnings. Masters never receive.
    pub fn update<S: SharedSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Vec<ConfigWarning>, SyncError> {
        if self.role != Role::Worker || !self.sharing {
            return Ok(Vec::new());
        }
        let payload = source.recv()?;
        log::debug!("config received: {payload}");
        let result = ViewerConfig::decode(&payload);
        self.config = Some(result.config);
        self.sharing = false;
        Ok(result.warnings)
    }
}

#[cfg(feature = "std")]
pub use local::{BroadcastReceiver, BroadcastSender, local_broadcast};

#[cfg(feature = "std")]
mod local {
    use std::sync::mpsc;

    use super::{SharedSink, SharedSource, SyncError};

    /// In-process fan-out sender.
    #[derive(Debug)]
    pub struct BroadcastSender {
        peers: Vec<mpsc::Sender<String>>,
    }

    /// In-process receiver for one worker.
    #[derive(Debug)]
    pub struct BroadcastReceiver {
        rx: mpsc::Receiver<String>,
    }

    /// One sender connected to `workers` receivers over `mpsc` channels.
    pub fn local_broadcast(workers: usize) -> (BroadcastSender, Vec<BroadcastReceiver>) {
        let (peers, receivers) = (0..workers)
            .map(|_| {
                let (tx, rx) = mpsc::channel();
                (tx, BroadcastReceiver { rx })
            })
            .unzip();
        (BroadcastSender { peers }, receivers)
    }

    impl SharedSink for BroadcastSender {
        /// Fails if any worker has hung up; live workers still get the payload.
        fn send(&mut self, payload: &str) -> Result<(), SyncError> {
            let mut result = Ok(());
            for peer in &self.peers {
                if peer.send(String::from(payload)).is_err() {
                    result = Err(SyncError::Disconnected);
                }
            }
            result
        }
    }

    impl SharedSource for BroadcastReceiver {
        fn recv(&mut self) -> Result<String, SyncError> {
            self.rx.recv().map_err(|_| SyncError::Disconnected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::LayoutMode;

    /// Records every payload sent.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl SharedSink for Recorder {
        fn send(&mut self, payload: &str) -> Result<(), SyncError> {
            self.0.push(String::from(payload));
            Ok(())
        }
    }

    /// Replays queued payloads.
    struct Replay(Vec<String>);

    impl SharedSource for Replay {
        fn recv(&mut self) -> Result<String, SyncError> {
            if self.0.is_empty() {
                Err(SyncError::Disconnected)
            } else {
                Ok(self.0.remove(0))
            }
        }
    }

    fn sample() -> ViewerConfig {
        ViewerConfig::builder()
            .image("grid.png")
            .mode(LayoutMode::Tile)
            .scale(2.0)
            .pattern(true)
            .build()
            .config
    }

    #[test]
    fn master_commits_once() {
        let mut sync = ConfigSync::master(sample());
        let mut sink = Recorder::default();
        assert_eq!(sync.commit(&mut sink), Ok(true));
        assert_eq!(sync.commit(&mut sink), Ok(false));
        assert_eq!(sink.0.len(), 1);
        assert!(!sync.is_sharing());
    }

    #[test]
    fn worker_never_commits() {
        let mut sync = ConfigSync::worker();
        let mut sink = Recorder::default();
        assert_eq!(sync.commit(&mut sink), Ok(false));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn worker_unconfigured_until_update() {
        let mut sync = ConfigSync::worker();
        assert_eq!(sync.config(), Err(SyncError::NotConfigured));

        let mut source = Replay(vec![sample().encode(), String::from("scale=9")]);
        assert_eq!(sync.update(&mut source), Ok(Vec::new()));
        assert_eq!(sync.config(), Ok(&sample()));

        // Second payload is left on the channel.
        assert_eq!(sync.update(&mut source), Ok(Vec::new()));
        assert_eq!(sync.config().map(ViewerConfig::scale), Ok(2.0));
        assert_eq!(source.0.len(), 1);
    }

    #[test]
    fn update_reports_disconnect() {
        let mut sync = ConfigSync::worker();
        assert_eq!(sync.update(&mut Replay(Vec::new())), Err(SyncError::Disconnected));
        assert!(sync.is_sharing());
    }

    #[test]
    fn master_ignores_update() {
        let mut sync = ConfigSync::master(sample());
        let mut source = Replay(vec![String::from("scale=9")]);
        assert_eq!(sync.update(&mut source), Ok(Vec::new()));
        assert_eq!(source.0.len(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn local_broadcast_reaches_every_worker() {
        let (mut tx, rxs) = local_broadcast(3);
        let mut master = ConfigSync::master(sample());
        assert_eq!(master.commit(&mut tx), Ok(true));
        for mut rx in rxs {
            let mut worker = ConfigSync::worker();
            worker.update(&mut rx).unwrap();
            assert_eq!(worker.config(), master.config());
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn local_broadcast_detects_hangup() {
        let (mut tx, mut rxs) = local_broadcast(2);
        rxs.pop();
        assert_eq!(tx.send("x"), Err(SyncError::Disconnected));
        assert_eq!(rxs[0].recv(), Ok(String::from("x")));
    }
}
