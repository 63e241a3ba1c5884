use std::io::Write;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU8, Ordering};
use std::sync::OnceLock;

use lazy_static::lazy_static;

use mpileaks_accounting::{LeakReport, Roster};
use mpileaks_callpath::CallPathRuntime;
use mpileaks_reduction::{dump_all, PeerTransport};

use crate::config::Config;

const ENABLED: u8 = 1;
const DISABLED: u8 = 0;

/// The single process-wide object bundling everything `mpileaks-interpose`
/// needs to guard and drive tracking: the enabled flag, the configured
/// stack depth, the lazily-constructed call-path runtime, and the roster of
/// every registered accountant.
pub struct Context {
    enabled: AtomicU8,
    depth: AtomicI32,
    rank: AtomicU32,
    world_size: AtomicU32,
    runtime: OnceLock<CallPathRuntime>,
    roster: Roster,
}

impl Context {
    fn new() -> Self {
        Context {
            enabled: AtomicU8::new(DISABLED),
            depth: AtomicI32::new(-1),
            rank: AtomicU32::new(0),
            world_size: AtomicU32::new(1),
            runtime: OnceLock::new(),
            roster: Roster::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) == ENABLED
    }

    pub fn depth(&self) -> i32 {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn rank(&self) -> u32 {
        self.rank.load(Ordering::Relaxed)
    }

    pub fn world_size(&self) -> u32 {
        self.world_size.load(Ordering::Relaxed)
    }

    /// Registers a concrete accountant with the process-wide roster. Called
    /// once per handle kind at startup, before `on_init` runs.
    pub fn register(&self, accountant: std::sync::Arc<dyn LeakReport>) {
        self.roster.register(accountant);
    }

    pub fn runtime(&self) -> &CallPathRuntime {
        self.runtime.get_or_init(CallPathRuntime::new)
    }
}

lazy_static! {
    pub static ref CONTEXT: Context = Context::new();
}

/// Records rank/world size, reads configuration from the environment, and
/// enables tracking. Ported from `MPI_Init`'s profiling setup.
pub fn on_init(rank: u32, world_size: u32) {
    CONTEXT.rank.store(rank, Ordering::Relaxed);
    CONTEXT.world_size.store(world_size, Ordering::Relaxed);
    let config = Config::from_env();
    CONTEXT.depth.store(config.stack_depth, Ordering::Relaxed);
    CONTEXT.enabled.store(ENABLED, Ordering::Relaxed);
}

/// Dispatches an `MPI_PControl` level: `0` disables tracking, `1`
/// re-enables it, `2` dumps the current outstanding-handle report without
/// disabling. Any other level is logged and otherwise ignored rather than
/// treated as an error.
pub fn on_control(level: i32, transport: &dyn PeerTransport, out: &mut dyn Write) {
    match level {
        0 => CONTEXT.enabled.store(DISABLED, Ordering::Relaxed),
        1 => CONTEXT.enabled.store(ENABLED, Ordering::Relaxed),
        2 => {
            if let Err(err) = dump_all(transport, &CONTEXT.roster, CONTEXT.runtime(), out) {
                tracing::error!("mpileaks: Internal Error: report dump failed: {err}");
            }
        }
        other => tracing::debug!("mpileaks: ignoring unrecognized PControl level {other}"),
    }
}

/// Dumps the final report and disables tracking. Ported from
/// `MPI_Finalize`'s profiling teardown.
pub fn on_finalize(transport: &dyn PeerTransport, out: &mut dyn Write) {
    if let Err(err) = dump_all(transport, &CONTEXT.roster, CONTEXT.runtime(), out) {
        tracing::error!("mpileaks: Internal Error: report dump failed: {err}");
    }
    CONTEXT.enabled.store(DISABLED, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpileaks_accounting::{SetAccountant, Tracked};
    use mpileaks_reduction::LoopbackTransport;
    use std::sync::{Arc, Mutex};

    // `CONTEXT` is a single process-wide global, same as in production; these
    // tests serialize on it so they don't race each other's mutations.
    lazy_static! {
        static ref TEST_LOCK: Mutex<()> = Mutex::new(());
    }

    #[test]
    fn on_init_enables_tracking_and_records_topology() {
        let _guard = TEST_LOCK.lock().unwrap();
        on_init(2, 8);
        assert!(CONTEXT.is_enabled());
        assert_eq!(CONTEXT.rank(), 2);
        assert_eq!(CONTEXT.world_size(), 8);
    }

    #[test]
    fn control_level_zero_then_one_toggles_enabled() {
        let _guard = TEST_LOCK.lock().unwrap();
        on_init(0, 1);
        on_control(0, &LoopbackTransport, &mut Vec::new());
        assert!(!CONTEXT.is_enabled());
        on_control(1, &LoopbackTransport, &mut Vec::new());
        assert!(CONTEXT.is_enabled());
    }

    #[test]
    fn control_level_two_dumps_without_disabling() {
        let _guard = TEST_LOCK.lock().unwrap();
        on_init(0, 1);
        let accountant = Arc::new(Tracked::new(SetAccountant::new()));
        CONTEXT.register(accountant);
        let mut out = Vec::new();
        on_control(2, &LoopbackTransport, &mut out);
        assert!(CONTEXT.is_enabled());
    }
}
