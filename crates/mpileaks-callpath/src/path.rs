use std::cmp::Ordering;
use std::io::Cursor;
use std::sync::Arc;

use crate::frame::Frame;
use crate::wire::{self, ModuleTable, UnpackError};

/// An immutable, cheaply-cloneable call stack captured at a profiled
/// allocation or free site, innermost frame first.
///
/// `CallPath` is the key type threaded through every accounting structure in
/// `mpileaks-accounting`: two call-paths compare equal exactly when their
/// frame sequences compare equal, which (via [`Frame`]'s symbolic ordering)
/// means "same call site" regardless of which peer or run produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallPath {
    frames: Arc<[Frame]>,
}

impl CallPath {
    pub fn new(frames: Vec<Frame>) -> Self {
        CallPath {
            frames: frames.into(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames retained after chop/depth slicing at capture time.
    pub fn size(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sub-path over `[start, end)`, clamped to the path's bounds. Used by
    /// the Stack accountant (C6) when trimming a completed call off the top
    /// of a handle's path stack.
    pub fn slice(&self, start: usize, end: usize) -> CallPath {
        let end = end.min(self.frames.len());
        let start = start.min(end);
        CallPath {
            frames: self.frames[start..end].into(),
        }
    }

    /// Packs this path together with a private module table, producing a
    /// fully self-describing buffer: unpacking it needs nothing but these
    /// bytes. For packing many paths into one message, prefer
    /// [`CallPath::pack_frames`] against a table shared across the whole
    /// list instead.
    pub fn pack(&self) -> Vec<u8> {
        let mut table = ModuleTable::new();
        let mut body = Vec::new();
        self.pack_frames(&mut table, &mut body);

        let mut buf = Vec::new();
        table.pack(&mut buf);
        buf.extend_from_slice(&body);
        buf
    }

    pub fn unpack(buf: &[u8]) -> Result<CallPath, UnpackError> {
        let mut cur = Cursor::new(buf);
        let table = ModuleTable::unpack(&mut cur)?;
        CallPath::unpack_frames(&table, &mut cur)
    }

    /// Packs just this path's frames, interning module/file names into
    /// `table` as needed rather than writing a private table. This is the
    /// form the reduction engine's list codec uses so that N call-paths
    /// headed to the same peer share one table instead of N redundant ones.
    pub fn pack_frames(&self, table: &mut ModuleTable, buf: &mut Vec<u8>) {
        wire::write_u32(buf, self.frames.len() as u32);
        for frame in self.frames.iter() {
            let module_id = frame.module.as_deref().map(|m| table.intern(m));
            wire::write_option_u32(buf, module_id);
            wire::write_option_string(buf, frame.symbol.as_deref());
            wire::write_option_u32(buf, frame.line);
            wire::write_u64(buf, frame.addr);
        }
    }

    pub fn unpack_frames(
        table: &ModuleTable,
        cur: &mut Cursor<&[u8]>,
    ) -> Result<CallPath, UnpackError> {
        let count = wire::read_u32(cur)?;
        let mut frames = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let module = match wire::read_option_u32(cur)? {
                Some(id) => Some(table.get(id)?.to_string()),
                None => None,
            };
            let symbol = wire::read_option_string(cur)?;
            let line = wire::read_option_u32(cur)?;
            let addr = wire::read_u64(cur)?;
            frames.push(Frame {
                module,
                symbol,
                line,
                addr,
            });
        }
        Ok(CallPath::new(frames))
    }
}

impl PartialOrd for CallPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CallPath {
    /// Lexicographic comparison over frames, matching the merge-sort order
    /// the reduction engine expects of the lists it two-way merges: peer
    /// lists arrive already sorted, and equal call-paths have their counts
    /// summed rather than duplicated.
    fn cmp(&self, other: &Self) -> Ordering {
        self.frames.as_ref().cmp(other.frames.as_ref())
    }
}

impl std::fmt::Display for CallPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                write!(f, " <- ")?;
            }
            match &frame.symbol {
                Some(s) => write!(f, "{s}")?,
                None => write!(f, "0x{:x}", frame.addr)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(module: &str, symbol: &str, line: u32, addr: u64) -> Frame {
        Frame {
            module: Some(module.to_string()),
            symbol: Some(symbol.to_string()),
            line: Some(line),
            addr,
        }
    }

    #[test]
    fn roundtrip_pack_unpack() {
        let path = CallPath::new(vec![
            frame("app", "main", 10, 0x1000),
            frame("libmpi", "MPI_Isend", 220, 0x2000),
        ]);
        let buf = path.pack();
        let decoded = CallPath::unpack(&buf).unwrap();
        assert_eq!(path, decoded);
    }

    #[test]
    fn equal_call_paths_differ_only_by_address_still_compare_equal() {
        let a = CallPath::new(vec![frame("app", "main", 10, 0x1000)]);
        let b = CallPath::new(vec![frame("app", "main", 10, 0x9999)]);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn slice_clamps_to_bounds() {
        let path = CallPath::new(vec![
            frame("a", "f1", 1, 0x1),
            frame("a", "f2", 2, 0x2),
            frame("a", "f3", 3, 0x3),
        ]);
        assert_eq!(path.slice(1, 100).size(), 2);
        assert_eq!(path.slice(5, 100).size(), 0);
    }

    #[test]
    fn shared_table_pack_dedupes_modules() {
        let a = CallPath::new(vec![frame("libmpi", "MPI_Isend", 1, 0x1)]);
        let b = CallPath::new(vec![frame("libmpi", "MPI_Irecv", 2, 0x2)]);

        let mut table = ModuleTable::new();
        let mut buf = Vec::new();
        a.pack_frames(&mut table, &mut buf);
        b.pack_frames(&mut table, &mut buf);

        let mut full = Vec::new();
        table.pack(&mut full);
        full.extend_from_slice(&buf);

        let mut cur = Cursor::new(full.as_slice());
        let decoded_table = ModuleTable::unpack(&mut cur).unwrap();
        let decoded_a = CallPath::unpack_frames(&decoded_table, &mut cur).unwrap();
        let decoded_b = CallPath::unpack_frames(&decoded_table, &mut cur).unwrap();
        assert_eq!(decoded_a, a);
        assert_eq!(decoded_b, b);
    }
}
