//! Cross-peer reduction of accounting data: wire encoding of
//! `(CallPath, count)` lists, the binomial-tree merge, and the
//! human-readable report printer.

mod merge;
mod printer;
mod transport;
mod wire;

pub use merge::{merge_sorted, sort_by_callpath, sort_by_count_desc};
pub use printer::{dump_all, reduce_and_print};
pub use transport::{LoopbackTransport, PeerTransport, TransportError};
#[cfg(any(test, feature = "test-support"))]
pub use transport::ChannelTransport;
pub use wire::{decode_list, encode_list};
