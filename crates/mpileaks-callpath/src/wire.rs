//! Binary codec shared by [`crate::path::CallPath`]'s standalone pack/unpack
//! and by `mpileaks-reduction`'s list wire format, which embeds one
//! [`ModuleTable`] shared across many packed paths instead of one per path.
//! Fixed-width little-endian integers via `byteorder`, matching the framing
//! style of the original tool's `PMPI_Pack`/`PMPI_Unpack` calls.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    #[error("truncated buffer: expected {expected} more bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("module id {0} out of range")]
    BadModuleId(u32),
    #[error("invalid utf-8 in packed string")]
    BadUtf8(#[from] std::string::FromUtf8Error),
}

/// De-duplicated table of module/source-file path strings, packed once per
/// wire message (a single `CallPath`, or an entire reduction-engine list)
/// rather than once per frame.
#[derive(Debug, Default)]
pub struct ModuleTable {
    by_id: Vec<String>,
    by_name: HashMap<String, u32>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, interning it if this is the first time
    /// the table has seen it.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = self.by_id.len() as u32;
        self.by_id.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: u32) -> Result<&str, UnpackError> {
        self.by_id
            .get(id as usize)
            .map(String::as_str)
            .ok_or(UnpackError::BadModuleId(id))
    }

    pub fn pack(&self, buf: &mut Vec<u8>) {
        buf.write_u32::<LittleEndian>(self.by_id.len() as u32).unwrap();
        for name in &self.by_id {
            write_string(buf, name);
        }
    }

    pub fn unpack(cur: &mut Cursor<&[u8]>) -> Result<ModuleTable, UnpackError> {
        let count = read_u32(cur)?;
        let mut table = ModuleTable::new();
        for _ in 0..count {
            let name = read_string(cur)?;
            table.intern(&name);
        }
        Ok(table)
    }
}

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.write_u32::<LittleEndian>(v).unwrap();
}

pub fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.write_u64::<LittleEndian>(v).unwrap();
}

pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

pub fn write_option_u32(buf: &mut Vec<u8>, v: Option<u32>) {
    match v {
        Some(v) => {
            buf.write_u8(1).unwrap();
            write_u32(buf, v);
        }
        None => buf.write_u8(0).unwrap(),
    }
}

pub fn write_option_string(buf: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => {
            buf.write_u8(1).unwrap();
            write_string(buf, s);
        }
        None => buf.write_u8(0).unwrap(),
    }
}

pub fn read_u32(cur: &mut Cursor<&[u8]>) -> Result<u32, UnpackError> {
    cur.read_u32::<LittleEndian>()
        .map_err(|_| UnpackError::Truncated {
            expected: 4,
            found: remaining(cur),
        })
}

pub fn read_u64(cur: &mut Cursor<&[u8]>) -> Result<u64, UnpackError> {
    cur.read_u64::<LittleEndian>()
        .map_err(|_| UnpackError::Truncated {
            expected: 8,
            found: remaining(cur),
        })
}

pub fn read_u8(cur: &mut Cursor<&[u8]>) -> Result<u8, UnpackError> {
    cur.read_u8().map_err(|_| UnpackError::Truncated {
        expected: 1,
        found: remaining(cur),
    })
}

pub fn read_string(cur: &mut Cursor<&[u8]>) -> Result<String, UnpackError> {
    let len = read_u32(cur)? as usize;
    let start = cur.position() as usize;
    let bytes = cur.get_ref();
    if start + len > bytes.len() {
        return Err(UnpackError::Truncated {
            expected: len,
            found: bytes.len().saturating_sub(start),
        });
    }
    let s = String::from_utf8(bytes[start..start + len].to_vec())?;
    cur.set_position((start + len) as u64);
    Ok(s)
}

pub fn read_option_u32(cur: &mut Cursor<&[u8]>) -> Result<Option<u32>, UnpackError> {
    Ok(if read_u8(cur)? != 0 {
        Some(read_u32(cur)?)
    } else {
        None
    })
}

pub fn read_option_string(cur: &mut Cursor<&[u8]>) -> Result<Option<String>, UnpackError> {
    Ok(if read_u8(cur)? != 0 {
        Some(read_string(cur)?)
    } else {
        None
    })
}

fn remaining(cur: &Cursor<&[u8]>) -> usize {
    (cur.get_ref().len() as u64).saturating_sub(cur.position()) as usize
}
