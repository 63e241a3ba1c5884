use std::io::Write;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use mpileaks_accounting::Roster;
use mpileaks_callpath::{CallPath, CallPathRuntime};

use crate::merge::{merge_sorted, sort_by_callpath, sort_by_count_desc};
use crate::transport::{PeerTransport, TransportError};
use crate::wire::{decode_list, encode_list};

const BANNER: &str =
    "----------------------------------------------------------------------";

/// Sends a list over two messages: byte count, then payload. Ported from
/// `list_send`.
fn list_send(transport: &dyn PeerTransport, dest: u32, list: &[(CallPath, u32)]) -> Result<(), TransportError> {
    let bytes = encode_list(list);
    let mut len_msg = Vec::with_capacity(4);
    len_msg.write_i32::<LittleEndian>(bytes.len() as i32).unwrap();
    transport.send(dest, &len_msg)?;
    transport.send(dest, &bytes)
}

/// Receives a list sent by [`list_send`]. Ported from `list_recv`.
fn list_recv(transport: &dyn PeerTransport, src: u32) -> Result<Vec<(CallPath, u32)>, TransportError> {
    let len_msg = transport.recv(src)?;
    let mut cur = std::io::Cursor::new(len_msg.as_slice());
    let _pack_size = cur.read_i32::<LittleEndian>().map_err(|_| TransportError::Closed)?;
    let bytes = transport.recv(src)?;
    decode_list(&bytes).map_err(|_| TransportError::Closed)
}

/// One frame rendered for the report, mirroring `mpileaks_print_path`'s use
/// of `FrameInfo`'s `Display` impl.
fn print_path(
    runtime: &CallPathRuntime,
    path: &CallPath,
    count: u32,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let size = path.size();
    write!(out, "Count: {count}")?;
    if size > 1 {
        writeln!(out)?;
    } else {
        write!(out, "  ::")?;
    }
    for info in runtime.translate(path) {
        writeln!(out, "  {info}")?;
    }
    if size > 1 {
        writeln!(out)?;
    }
    Ok(())
}

/// Binomial-tree reduction of one report section across all peers: each
/// non-root rank receives from its tree children, merges, and forwards to
/// its parent; rank 0 merges everything and, if the final list is
/// non-empty, prints it bracketed by `START SECTION`/`END SECTION`
/// banners. Ported from `mpileaks_reduce_callpaths`.
pub fn reduce_and_print(
    transport: &dyn PeerTransport,
    mut list: Vec<(CallPath, u32)>,
    section: &str,
    runtime: &CallPathRuntime,
    out: &mut dyn Write,
) -> Result<(), TransportError> {
    sort_by_callpath(&mut list);

    let rank = transport.rank();
    let world_size = transport.world_size();

    let mut mask: u32 = 1;
    let mut dest = None;
    while mask < world_size {
        if (mask & rank) == 0 {
            let src = rank | mask;
            if src < world_size {
                let received = list_recv(transport, src)?;
                list = merge_sorted(list, received);
            }
        } else {
            dest = Some(rank & !mask);
            break;
        }
        mask <<= 1;
    }

    if let Some(dest) = dest {
        list_send(transport, dest, &list)?;
        return Ok(());
    }

    sort_by_count_desc(&mut list);
    if list.is_empty() {
        return Ok(());
    }

    writeln!(out, "{BANNER}").ok();
    writeln!(out, "START SECTION: {section}").ok();
    writeln!(out, "{BANNER}").ok();
    for (path, count) in &list {
        print_path(runtime, path, *count, out).ok();
    }
    writeln!(out, "{BANNER}").ok();
    writeln!(out, "END SECTION: {section}").ok();
    writeln!(out, "{BANNER}").ok();
    Ok(())
}

/// Drives the three report sections in order, bracketed by `START
/// REPORT`/`END REPORT` banners on rank 0 only. Ported from
/// `mpileaks_dump_outstanding`.
pub fn dump_all(
    transport: &dyn PeerTransport,
    roster: &Roster,
    runtime: &CallPathRuntime,
    out: &mut dyn Write,
) -> Result<(), TransportError> {
    let is_root = transport.rank() == 0;

    if is_root {
        writeln!(out, "{BANNER}").ok();
        writeln!(out, "mpileaks: START REPORT -----------------------------------------------").ok();
        writeln!(out, "{BANNER}").ok();
    }

    reduce_and_print(transport, roster.definite_leaks(), "LEAKED OBJECTS", runtime, out)?;
    reduce_and_print(
        transport,
        roster.possible_leaks(),
        "POSSIBLY LEAKED OBJECTS",
        runtime,
        out,
    )?;
    reduce_and_print(
        transport,
        roster.missing_alloc(),
        "ALLOCATION CALL UNKNOWN",
        runtime,
        out,
    )?;

    if is_root {
        writeln!(out, "{BANNER}").ok();
        writeln!(out, "mpileaks: END REPORT -------------------------------------------------").ok();
        writeln!(out, "{BANNER}").ok();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;
    use mpileaks_callpath::Frame;

    fn path(symbol: &str) -> CallPath {
        CallPath::new(vec![Frame {
            module: Some("app".into()),
            symbol: Some(symbol.into()),
            line: Some(42),
            addr: 0x1,
        }])
    }

    #[test]
    fn empty_list_emits_no_banner() {
        let transport = LoopbackTransport;
        let runtime = CallPathRuntime::new();
        let mut out = Vec::new();
        reduce_and_print(&transport, vec![], "LEAKED OBJECTS", &runtime, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_rank_report_is_sorted_and_bannered() {
        let transport = LoopbackTransport;
        let runtime = CallPathRuntime::new();
        let mut out = Vec::new();
        let list = vec![(path("low"), 1), (path("high"), 9)];
        reduce_and_print(&transport, list, "LEAKED OBJECTS", &runtime, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("START SECTION: LEAKED OBJECTS"));
        assert!(text.contains("END SECTION: LEAKED OBJECTS"));
        let high_pos = text.find("Count: 9").unwrap();
        let low_pos = text.find("Count: 1").unwrap();
        assert!(high_pos < low_pos, "higher count should print first");
    }

    #[test]
    fn single_frame_path_renders_inline_marker() {
        let transport = LoopbackTransport;
        let runtime = CallPathRuntime::new();
        let mut out = Vec::new();
        reduce_and_print(&transport, vec![(path("only"), 1)], "S", &runtime, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Count: 1  ::"));
    }

    #[test]
    fn report_text_matches_snapshot() {
        let transport = LoopbackTransport;
        let runtime = CallPathRuntime::new();
        let mut out = Vec::new();
        let list = vec![(path("leaky_alloc"), 3), (path("other_alloc"), 1)];
        reduce_and_print(&transport, list, "LEAKED OBJECTS", &runtime, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        insta::assert_snapshot!(text, @r###"
        ----------------------------------------------------------------------
        START SECTION: LEAKED OBJECTS
        ----------------------------------------------------------------------
        Count: 3  ::  leaky_alloc at app:42
        Count: 1  ::  other_alloc at app:42
        ----------------------------------------------------------------------
        END SECTION: LEAKED OBJECTS
        ----------------------------------------------------------------------
        "###);
    }

    #[test]
    fn four_ranks_merge_shared_callpaths_to_rank_zero() {
        use crate::transport::ChannelTransport;
        use std::thread;

        let fleet = ChannelTransport::fleet(4);
        let per_rank_lists = vec![
            vec![(path("shared"), 1), (path("rank0-only"), 2)],
            vec![(path("shared"), 1)],
            vec![(path("shared"), 1)],
            vec![(path("shared"), 1), (path("rank3-only"), 5)],
        ];

        let mut handles = Vec::new();
        for (transport, list) in fleet.into_iter().zip(per_rank_lists.into_iter()) {
            handles.push(thread::spawn(move || {
                let runtime = CallPathRuntime::new();
                let mut out = Vec::new();
                reduce_and_print(&transport, list, "LEAKED OBJECTS", &runtime, &mut out).unwrap();
                out
            }));
        }

        let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let root_text = String::from_utf8(outputs[0].clone()).unwrap();
        assert!(root_text.contains("Count: 4"));
        assert!(root_text.contains("Count: 2"));
        assert!(root_text.contains("Count: 5"));
        for text in outputs.iter().skip(1) {
            assert!(text.is_empty(), "only rank 0 should print");
        }
    }
}
