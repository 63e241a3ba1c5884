use std::os::raw::c_void;

use mpileaks_reduction::{PeerTransport, TransportError};

use crate::ffi::*;

/// Production [`PeerTransport`] over the real MPI library's profiling
/// entry points, used with `MPI_COMM_WORLD` exactly as the reduction
/// engine's `list_send`/`list_recv` did in the original tool.
pub struct MpiTransport {
    rank: u32,
    world_size: u32,
}

impl MpiTransport {
    pub fn new(rank: u32, world_size: u32) -> Self {
        MpiTransport { rank, world_size }
    }
}

impl PeerTransport for MpiTransport {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn world_size(&self) -> u32 {
        self.world_size
    }

    fn send(&self, dest: u32, bytes: &[u8]) -> Result<(), TransportError> {
        let rc = unsafe {
            PMPI_Send(
                bytes.as_ptr() as *const c_void,
                bytes.len() as i32,
                MPI_BYTE,
                dest as i32,
                0,
                MPI_COMM_WORLD,
            )
        };
        if rc == MPI_SUCCESS {
            Ok(())
        } else {
            Err(TransportError::Unreachable(dest))
        }
    }

    fn recv(&self, src: u32) -> Result<Vec<u8>, TransportError> {
        // MPI preserves message boundaries, so one `recv` call here
        // corresponds to exactly one `send` call on the other side — the
        // caller (`mpileaks-reduction`'s `list_send`/`list_recv`) issues two
        // such calls per logical message: byte count, then payload. Probe
        // first to size the buffer without assuming a fixed-width message.
        const STATUS_BYTES: usize = 96;
        let mut status = [0u8; STATUS_BYTES];
        let status_ptr = status.as_mut_ptr() as *mut MPI_Status;

        let rc = unsafe { PMPI_Probe(src as i32, 0, MPI_COMM_WORLD, status_ptr) };
        if rc != MPI_SUCCESS {
            return Err(TransportError::Unreachable(src));
        }

        let mut count: i32 = 0;
        let rc = unsafe { PMPI_Get_count(status_ptr, MPI_BYTE, &mut count) };
        if rc != MPI_SUCCESS {
            return Err(TransportError::Unreachable(src));
        }

        let mut buf = vec![0u8; count.max(0) as usize];
        let rc = unsafe {
            PMPI_Recv(
                buf.as_mut_ptr() as *mut c_void,
                count,
                MPI_BYTE,
                src as i32,
                0,
                MPI_COMM_WORLD,
                status_ptr,
            )
        };
        if rc == MPI_SUCCESS {
            Ok(buf)
        } else {
            Err(TransportError::Unreachable(src))
        }
    }
}
