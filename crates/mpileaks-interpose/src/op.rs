use std::os::raw::c_void;

use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, OP};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Op_create(
    function: *const c_void,
    commute: std::os::raw::c_int,
    op: *mut MPI_Op,
) -> std::os::raw::c_int {
    let rc = PMPI_Op_create(function, commute, op);
    if enabled() {
        OP.allocate(Handle(*op as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Op_free(op: *mut MPI_Op) -> std::os::raw::c_int {
    let handle_copy = *op;
    let rc = PMPI_Op_free(op);
    if enabled() && handle_copy != MPI_OP_NULL {
        OP.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
