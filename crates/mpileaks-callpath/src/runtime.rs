use crate::frame::{Frame, FrameInfo};
use crate::path::CallPath;

/// Captures and symbolicates call-paths using `backtrace`.
///
/// Kept as a zero-sized type (rather than free functions) so call sites read
/// the same way regardless of which accounting variant invokes them, and so
/// a future profiling backend can be swapped in behind the same shape
/// without touching callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallPathRuntime;

impl CallPathRuntime {
    pub fn new() -> Self {
        CallPathRuntime
    }

    /// Captures the current stack, innermost frame first, dropping the
    /// `chop` innermost frames (the interpose wrapper and its immediate
    /// helpers, which are never interesting to a caller) and keeping at
    /// most `depth` frames after that. `depth < 0` means unlimited; `depth
    /// == 0` yields an empty call-path.
    ///
    /// Uses the `_unsynchronized` entry points: the interposer runs this on
    /// every tracked allocate/free, so capture must not take a global lock
    /// shared with the profiled application's own symbol resolution.
    pub fn capture(&self, chop: usize, depth: i32) -> CallPath {
        let mut addrs: Vec<u64> = Vec::new();
        unsafe {
            backtrace::trace_unsynchronized(|frame| {
                addrs.push(frame.ip() as u64);
                true
            });
        }

        let skipped = addrs.into_iter().skip(chop);
        let limited: Vec<u64> = if depth < 0 {
            skipped.collect()
        } else {
            skipped.take(depth as usize).collect()
        };

        let mut frames = Vec::with_capacity(limited.len());
        for addr in limited {
            frames.push(self.resolve_one(addr));
        }
        CallPath::new(frames)
    }

    fn resolve_one(&self, addr: u64) -> Frame {
        let mut resolved = Frame::unresolved(addr);
        unsafe {
            backtrace::resolve_unsynchronized(addr as *mut std::ffi::c_void, |symbol| {
                if resolved.module.is_none() {
                    resolved.module = symbol
                        .filename()
                        .map(|p| p.to_string_lossy().into_owned());
                }
                if resolved.symbol.is_none() {
                    resolved.symbol = symbol.name().map(|n| n.to_string());
                }
                if resolved.line.is_none() {
                    resolved.line = symbol.lineno();
                }
            });
        }
        resolved
    }

    /// Produces display-ready [`FrameInfo`] for each frame of `path`, from
    /// the symbolic fields resolved at capture time. The printer
    /// (`mpileaks-reduction`) calls this once per distinct call-path just
    /// before emitting a report, never per-capture.
    pub fn translate(&self, path: &CallPath) -> Vec<FrameInfo> {
        path.frames()
            .iter()
            .map(|frame| FrameInfo {
                function: frame.symbol.clone(),
                file: frame.module.clone(),
                line: frame.line,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_nonempty_and_respects_depth() {
        let rt = CallPathRuntime::new();
        let full = rt.capture(0, -1);
        assert!(!full.is_empty(), "expected at least one captured frame");

        let limited = rt.capture(0, 1);
        assert_eq!(limited.size(), 1);
    }

    #[test]
    fn zero_depth_yields_empty_path() {
        let rt = CallPathRuntime::new();
        let empty = rt.capture(0, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn chop_removes_innermost_frames() {
        let rt = CallPathRuntime::new();
        let full = rt.capture(0, -1);
        let chopped = rt.capture(1, -1);
        assert_eq!(chopped.size(), full.size().saturating_sub(1));
    }

    #[test]
    fn translate_preserves_frame_count() {
        let rt = CallPathRuntime::new();
        let path = rt.capture(0, 4);
        let infos = rt.translate(&path);
        assert_eq!(infos.len(), path.size());
    }
}
