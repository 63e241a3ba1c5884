use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, GROUP};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Group_union(
    g1: MPI_Group,
    g2: MPI_Group,
    out: *mut MPI_Group,
) -> std::os::raw::c_int {
    let rc = PMPI_Group_union(g1, g2, out);
    if enabled() {
        GROUP.allocate(Handle(*out as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Group_free(group: *mut MPI_Group) -> std::os::raw::c_int {
    let handle_copy = *group;
    let rc = PMPI_Group_free(group);
    if enabled() && handle_copy != MPI_GROUP_NULL {
        GROUP.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
