/// A host-library opaque handle (request, communicator, window, ...)
/// normalized to a `u64` at the FFI boundary in `mpileaks-interpose`,
/// regardless of whether the native representation is an `int` or a
/// pointer-sized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl Handle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Handle {
    fn from(v: u64) -> Self {
        Handle(v)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
