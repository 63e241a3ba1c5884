use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, FILE};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_File_open(
    comm: MPI_Comm,
    filename: *const i8,
    amode: std::os::raw::c_int,
    info: MPI_Info,
    fh: *mut MPI_File,
) -> std::os::raw::c_int {
    let rc = PMPI_File_open(comm, filename, amode, info, fh);
    if enabled() {
        FILE.allocate(Handle(*fh as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_File_close(fh: *mut MPI_File) -> std::os::raw::c_int {
    let handle_copy = *fh;
    let rc = PMPI_File_close(fh);
    if enabled() && handle_copy != MPI_FILE_NULL {
        FILE.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
