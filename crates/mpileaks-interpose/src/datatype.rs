use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, DATATYPE};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Type_contiguous(
    count: std::os::raw::c_int,
    old: MPI_Datatype,
    new: *mut MPI_Datatype,
) -> std::os::raw::c_int {
    let rc = PMPI_Type_contiguous(count, old, new);
    if enabled() {
        DATATYPE.allocate(Handle(*new as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Type_free(dt: *mut MPI_Datatype) -> std::os::raw::c_int {
    let handle_copy = *dt;
    let rc = PMPI_Type_free(dt);
    if enabled() && handle_copy != MPI_DATATYPE_NULL {
        DATATYPE.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
