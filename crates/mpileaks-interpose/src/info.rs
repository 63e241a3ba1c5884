use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, INFO};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Info_create(info: *mut MPI_Info) -> std::os::raw::c_int {
    let rc = PMPI_Info_create(info);
    if enabled() {
        INFO.allocate(Handle(*info as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Info_free(info: *mut MPI_Info) -> std::os::raw::c_int {
    let handle_copy = *info;
    let rc = PMPI_Info_free(info);
    if enabled() && handle_copy != MPI_INFO_NULL {
        INFO.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
