use std::os::raw::c_void;

use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, MEM};

const CHOP: i32 = 0;

/// `MPI_Alloc_mem` writes the allocated base address through `baseptr`;
/// unlike other handle kinds the resulting pointer is never reset to null
/// on free, so this accountant's `is_handle_null` is always false (ported
/// from `MPI_Mem2Callpath::is_handle_null`).
#[no_mangle]
pub unsafe extern "C" fn MPI_Alloc_mem(
    size: MPI_Aint,
    info: MPI_Info,
    baseptr: *mut c_void,
) -> std::os::raw::c_int {
    let rc = PMPI_Alloc_mem(size, info, baseptr);
    if enabled() {
        let base = *(baseptr as *mut *mut c_void);
        MEM.allocate(Handle(base as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Free_mem(base: *mut c_void) -> std::os::raw::c_int {
    let handle_copy = base;
    let rc = PMPI_Free_mem(base);
    if enabled() {
        MEM.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
