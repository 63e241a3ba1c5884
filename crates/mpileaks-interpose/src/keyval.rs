use std::os::raw::{c_int, c_void};

use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, COMM_KEYVAL, TYPE_KEYVAL, WIN_KEYVAL};

const CHOP: i32 = 0;

#[no_mangle]
pub unsafe extern "C" fn MPI_Comm_create_keyval(
    comm_copy_attr_fn: *const c_void,
    comm_delete_attr_fn: *const c_void,
    comm_keyval: *mut c_int,
    extra_state: *mut c_void,
) -> c_int {
    let rc = PMPI_Comm_create_keyval(
        comm_copy_attr_fn,
        comm_delete_attr_fn,
        comm_keyval,
        extra_state,
    );
    if enabled() {
        COMM_KEYVAL.allocate(Handle(*comm_keyval as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Comm_free_keyval(keyval: *mut c_int) -> c_int {
    let handle_copy = *keyval;
    let rc = PMPI_Comm_free_keyval(keyval);
    if enabled() {
        COMM_KEYVAL.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Win_create_keyval(
    win_copy_attr_fn: *const c_void,
    win_delete_attr_fn: *const c_void,
    win_keyval: *mut c_int,
    extra_state: *mut c_void,
) -> c_int {
    let rc = PMPI_Win_create_keyval(win_copy_attr_fn, win_delete_attr_fn, win_keyval, extra_state);
    if enabled() {
        WIN_KEYVAL.allocate(Handle(*win_keyval as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Win_free_keyval(keyval: *mut c_int) -> c_int {
    let handle_copy = *keyval;
    let rc = PMPI_Win_free_keyval(keyval);
    if enabled() {
        WIN_KEYVAL.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Type_create_keyval(
    type_copy_attr_fn: *const c_void,
    type_delete_attr_fn: *const c_void,
    type_keyval: *mut c_int,
    extra_state: *mut c_void,
) -> c_int {
    let rc = PMPI_Type_create_keyval(
        type_copy_attr_fn,
        type_delete_attr_fn,
        type_keyval,
        extra_state,
    );
    if enabled() {
        TYPE_KEYVAL.allocate(Handle(*type_keyval as u64), CHOP, depth());
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Type_free_keyval(keyval: *mut c_int) -> c_int {
    let handle_copy = *keyval;
    let rc = PMPI_Type_free_keyval(keyval);
    if enabled() {
        TYPE_KEYVAL.free(Handle(handle_copy as u64), CHOP, depth());
    }
    rc
}
