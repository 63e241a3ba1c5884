use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, COMM};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Comm_dup(comm: MPI_Comm, newcomm: *mut MPI_Comm) -> std::os::raw::c_int {
    let rc = PMPI_Comm_dup(comm, newcomm);
    if enabled() {
        COMM.allocate(Handle(*newcomm as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Comm_free(comm: *mut MPI_Comm) -> std::os::raw::c_int {
    let handle_copy = *comm;
    let rc = PMPI_Comm_free(comm);
    if enabled() && handle_copy != MPI_COMM_NULL {
        COMM.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
