//! Call-path capture, symbolication, and wire encoding.
//!
//! This crate is the foundation the rest of the workspace builds on:
//! `mpileaks-accounting` keys every tracked handle by [`CallPath`], and
//! `mpileaks-reduction` packs lists of them over [`wire::ModuleTable`] to
//! merge counts across peers.

mod frame;
mod path;
mod runtime;
mod wire;

pub use frame::{Frame, FrameInfo};
pub use path::CallPath;
pub use runtime::CallPathRuntime;
pub use wire::{ModuleTable, UnpackError};
