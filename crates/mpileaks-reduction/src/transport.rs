/// Failures sending or receiving a reduction message between peers.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("peer {0} is unreachable")]
    Unreachable(u32),
    #[error("transport channel closed")]
    Closed,
}

/// The job-global communicator's profiling-variant send/recv, reduced to
/// exactly what the binomial-tree reduction needs. The production
/// implementation (in `mpileaks-interpose`) calls `PMPI_Send`/`PMPI_Recv`
/// directly; this crate's test suite uses [`LoopbackTransport`] and
/// [`ChannelTransport`] to exercise the algorithm without linking a real
/// message-passing library.
pub trait PeerTransport: Send + Sync {
    fn rank(&self) -> u32;
    fn world_size(&self) -> u32;
    fn send(&self, dest: u32, bytes: &[u8]) -> Result<(), TransportError>;
    fn recv(&self, src: u32) -> Result<Vec<u8>, TransportError>;
}

/// A single-rank transport: `world_size() == 1`, so the reduction engine's
/// tree loop never actually sends or receives and rank 0 always prints
/// immediately. Useful for tests that only care about the local
/// sort/print behavior.
pub struct LoopbackTransport;

impl PeerTransport for LoopbackTransport {
    fn rank(&self) -> u32 {
        0
    }

    fn world_size(&self) -> u32 {
        1
    }

    fn send(&self, dest: u32, _bytes: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Unreachable(dest))
    }

    fn recv(&self, src: u32) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Unreachable(src))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod channel {
    use super::{PeerTransport, TransportError};
    use std::sync::mpsc::{Receiver, Sender};
    use std::sync::Mutex;

    /// A multi-rank transport built from `std::sync::mpsc` channels, one per
    /// simulated peer, for exercising the binomial-tree reduction across
    /// several ranks within a single test process.
    pub struct ChannelTransport {
        rank: u32,
        world_size: u32,
        senders: Vec<Sender<Vec<u8>>>,
        receivers: Vec<Mutex<Receiver<Vec<u8>>>>,
    }

    impl ChannelTransport {
        /// Builds one [`ChannelTransport`] per rank in `0..world_size`, each
        /// wired to every other rank via a dedicated channel.
        pub fn fleet(world_size: u32) -> Vec<ChannelTransport> {
            let n = world_size as usize;
            let mut senders_by_pair = vec![vec![None; n]; n];
            let mut receivers_by_pair = (0..n).map(|_| Vec::new()).collect::<Vec<_>>();

            for src in 0..n {
                for dst in 0..n {
                    let (tx, rx) = std::sync::mpsc::channel();
                    senders_by_pair[src][dst] = Some(tx);
                    receivers_by_pair[dst].push(Some(rx));
                }
            }

            let mut fleet = Vec::with_capacity(n);
            for rank in 0..n {
                let senders = senders_by_pair[rank]
                    .iter_mut()
                    .map(|s| s.take().unwrap())
                    .collect();
                let receivers = receivers_by_pair[rank]
                    .iter_mut()
                    .map(|r| Mutex::new(r.take().unwrap()))
                    .collect();
                fleet.push(ChannelTransport {
                    rank: rank as u32,
                    world_size,
                    senders,
                    receivers,
                });
            }
            fleet
        }
    }

    impl PeerTransport for ChannelTransport {
        fn rank(&self) -> u32 {
            self.rank
        }

        fn world_size(&self) -> u32 {
            self.world_size
        }

        fn send(&self, dest: u32, bytes: &[u8]) -> Result<(), TransportError> {
            self.senders
                .get(dest as usize)
                .ok_or(TransportError::Unreachable(dest))?
                .send(bytes.to_vec())
                .map_err(|_| TransportError::Closed)
        }

        fn recv(&self, src: u32) -> Result<Vec<u8>, TransportError> {
            self.receivers
                .get(src as usize)
                .ok_or(TransportError::Unreachable(src))?
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| TransportError::Closed)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use channel::ChannelTransport;
