use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A single stack frame captured by [`crate::runtime::CallPathRuntime`].
///
/// Equality, ordering, and hashing are defined over the *symbolic* identity
/// of the frame (source module, function name, and line) rather than its raw
/// instruction-pointer address. Addresses shift under ASLR between
/// processes and even between runs of the same binary, so comparing raw
/// addresses would make call-paths captured on different peers of a job
/// never compare equal even when they originate from the same call site.
/// `addr` is retained purely for diagnostics when a frame fails to resolve
/// to a symbol, module, and line.
#[derive(Debug, Clone)]
pub struct Frame {
    pub module: Option<String>,
    pub symbol: Option<String>,
    pub line: Option<u32>,
    pub addr: u64,
}

impl Frame {
    pub fn unresolved(addr: u64) -> Self {
        Frame {
            module: None,
            symbol: None,
            line: None,
            addr,
        }
    }

    /// True if none of the symbolic fields resolved.
    pub fn is_unresolved(&self) -> bool {
        self.module.is_none() && self.symbol.is_none() && self.line.is_none()
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        (&self.module, &self.symbol, &self.line) == (&other.module, &other.symbol, &other.line)
    }
}
impl Eq for Frame {}

impl PartialOrd for Frame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Frame {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.module, &self.symbol, &self.line).cmp(&(&other.module, &other.symbol, &other.line))
    }
}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module.hash(state);
        self.symbol.hash(state);
        self.line.hash(state);
    }
}

/// Human-readable rendering of a [`Frame`], produced by
/// [`crate::runtime::translate`]. Kept distinct from `Frame` itself so that
/// the printer (crate `mpileaks-reduction`) never needs to re-derive
/// symbolic text from raw addresses.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl std::fmt::Display for FrameInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let function = self.function.as_deref().unwrap_or("??");
        write!(f, "{function}")?;
        if let Some(file) = &self.file {
            write!(f, " at {file}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        Ok(())
    }
}
