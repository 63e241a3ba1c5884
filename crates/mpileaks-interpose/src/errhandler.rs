use std::os::raw::c_void;

use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, ERRHANDLER};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Comm_create_errhandler(
    function: *const c_void,
    errhandler: *mut MPI_Errhandler,
) -> std::os::raw::c_int {
    let rc = PMPI_Comm_create_errhandler(function, errhandler);
    if enabled() {
        ERRHANDLER.allocate(Handle(*errhandler as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Errhandler_free(errhandler: *mut MPI_Errhandler) -> std::os::raw::c_int {
    let handle_copy = *errhandler;
    let rc = PMPI_Errhandler_free(errhandler);
    if enabled() && handle_copy != MPI_ERRHANDLER_NULL {
        ERRHANDLER.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
