use std::sync::Arc;

use lazy_static::lazy_static;

use mpileaks_accounting::{Handle, SetAccountant, SingleAccountant, Tracked};
use mpileaks_control::CONTEXT;

use crate::ffi::{MPI_GROUP_EMPTY, MPI_GROUP_NULL};

fn is_group_null(handle: Handle) -> bool {
    handle.0 == MPI_GROUP_NULL as u64 || handle.0 == MPI_GROUP_EMPTY as u64
}

/// A base pointer handed back by `MPI_Alloc_mem` is never reset to null on
/// `MPI_Free_mem`, so it is never excluded from tracking on that basis.
fn is_mem_never_null(_handle: Handle) -> bool {
    false
}

lazy_static! {
    pub static ref REQUEST: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref COMM: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref GROUP: Arc<Tracked<SetAccountant>> =
        Arc::new(Tracked::new(SetAccountant::with_null_test(is_group_null)));
    pub static ref DATATYPE: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref FILE: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref ERRHANDLER: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref INFO: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref OP: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref MEM: Arc<Tracked<SingleAccountant>> =
        Arc::new(Tracked::new(SingleAccountant::with_null_test(is_mem_never_null)));
    pub static ref WIN: Arc<Tracked<SingleAccountant>> = Arc::new(Tracked::new(SingleAccountant::new()));
    pub static ref COMM_KEYVAL: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref WIN_KEYVAL: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
    pub static ref TYPE_KEYVAL: Arc<Tracked<SetAccountant>> = Arc::new(Tracked::new(SetAccountant::new()));
}

/// Registers every handle-kind accountant with the global roster. Called
/// once, from the `MPI_Init` wrapper, before tracking begins — mirroring
/// `Callpath2Count`'s constructor registering each instance into
/// `h2cpc_objs` at static-init time, except ours is explicit since Rust
/// statics have no registration side effect on construction.
pub fn register_all() {
    CONTEXT.register(REQUEST.clone());
    CONTEXT.register(COMM.clone());
    CONTEXT.register(GROUP.clone());
    CONTEXT.register(DATATYPE.clone());
    CONTEXT.register(FILE.clone());
    CONTEXT.register(ERRHANDLER.clone());
    CONTEXT.register(INFO.clone());
    CONTEXT.register(OP.clone());
    CONTEXT.register(MEM.clone());
    CONTEXT.register(WIN.clone());
    CONTEXT.register(COMM_KEYVAL.clone());
    CONTEXT.register(WIN_KEYVAL.clone());
    CONTEXT.register(TYPE_KEYVAL.clone());
}

/// Current configured stack depth and frame-chop offset, read fresh on
/// every call so the wrappers always reflect the live `Context`.
pub fn depth() -> i32 {
    CONTEXT.depth()
}

pub fn enabled() -> bool {
    CONTEXT.is_enabled()
}
