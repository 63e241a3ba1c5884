use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, WIN};

const CHOP: i32 = 0;

/// Tracked with [`mpileaks_accounting::SingleAccountant`]: a window is
/// created and freed through exactly one call site per handle value, unlike
/// the original tool's set-based `MPI_Win2CallpathSet`.
#[no_mangle]
pub unsafe extern "C" fn MPI_Win_create(
    base: *mut std::os::raw::c_void,
    size: MPI_Aint,
    disp_unit: std::os::raw::c_int,
    info: MPI_Info,
    comm: MPI_Comm,
    win: *mut MPI_Win,
) -> std::os::raw::c_int {
    let rc = PMPI_Win_create(base, size, disp_unit, info, comm, win);
    if enabled() {
        WIN.allocate(Handle(*win as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Win_free(win: *mut MPI_Win) -> std::os::raw::c_int {
    let handle_copy = *win;
    let rc = PMPI_Win_free(win);
    if enabled() && handle_copy != MPI_WIN_NULL {
        WIN.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
