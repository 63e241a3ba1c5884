use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use mpileaks_callpath::{CallPath, ModuleTable, UnpackError};

/// Encodes a list of `(CallPath, count)` pairs as an `i32` size, then, only
/// if `size > 0`, one shared packed [`ModuleTable`] followed by `size`
/// repetitions of `[packed CallPath][i32 count]`. Sharing one table across
/// the whole list (rather
/// than packing each `CallPath` self-describing, as
/// `mpileaks_callpath::CallPath::pack` does standalone) is what keeps the
/// wire format compact when many call-paths share frames from the same
/// handful of library modules.
pub fn encode_list(list: &[(CallPath, u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_i32::<LittleEndian>(list.len() as i32).unwrap();
    if list.is_empty() {
        return buf;
    }

    let mut table = ModuleTable::new();
    let mut body = Vec::new();
    for (path, count) in list {
        path.pack_frames(&mut table, &mut body);
        body.write_i32::<LittleEndian>(*count as i32).unwrap();
    }

    table.pack(&mut buf);
    buf.extend_from_slice(&body);
    buf
}

pub fn decode_list(bytes: &[u8]) -> Result<Vec<(CallPath, u32)>, UnpackError> {
    let mut cur = Cursor::new(bytes);
    let size = cur.read_i32::<LittleEndian>().map_err(|_| UnpackError::Truncated {
        expected: 4,
        found: 0,
    })?;
    if size <= 0 {
        return Ok(Vec::new());
    }

    let table = ModuleTable::unpack(&mut cur)?;
    let mut out = Vec::with_capacity(size as usize);
    for _ in 0..size {
        let path = CallPath::unpack_frames(&table, &mut cur)?;
        let count = cur
            .read_i32::<LittleEndian>()
            .map_err(|_| UnpackError::Truncated {
                expected: 4,
                found: 0,
            })?;
        out.push((path, count as u32));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpileaks_callpath::Frame;

    fn path(symbol: &str) -> CallPath {
        CallPath::new(vec![Frame {
            module: Some("libmpi".into()),
            symbol: Some(symbol.into()),
            line: Some(10),
            addr: 0x1,
        }])
    }

    #[test]
    fn roundtrips_nonempty_list() {
        let list = vec![(path("a"), 3), (path("b"), 1)];
        let bytes = encode_list(&list);
        let decoded = decode_list(&bytes).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn empty_list_encodes_to_bare_zero_size() {
        let bytes = encode_list(&[]);
        assert_eq!(bytes.len(), 4);
        assert_eq!(decode_list(&bytes).unwrap(), Vec::new());
    }
}
