use std::os::raw::c_int;

use mpileaks_accounting::Handle;

use crate::ffi::*;
use crate::registry::{depth, enabled, REQUEST};

const CHOP: i32 = 0;

fn allocate_one(req: MPI_Request) {
    if enabled() {
        REQUEST.allocate(Handle(req as u64), CHOP, depth());
    }
}

fn free_one(req: MPI_Request) {
    if enabled() && req != MPI_REQUEST_NULL {
        REQUEST.free(Handle(req as u64), CHOP, depth());
    }
}

unsafe fn allocate_array(count: c_int, reqs: *mut MPI_Request) {
    if !enabled() {
        return;
    }
    let reqs = std::slice::from_raw_parts(reqs, count.max(0) as usize);
    for &req in reqs {
        allocate_one(req);
    }
}

/// Snapshots `before` against `after`, freeing every request that changed
/// to `MPI_REQUEST_NULL` between the two snapshots. Ported from
/// `mpileaks_request_free_array`, used by the completion calls that can
/// retire more than one request in a single call (`waitall`/`testall`).
unsafe fn free_changed(count: c_int, before: &[MPI_Request], after: *const MPI_Request) {
    if !enabled() {
        return;
    }
    let after = std::slice::from_raw_parts(after, count.max(0) as usize);
    for (&prev, &now) in before.iter().zip(after.iter()) {
        if prev != MPI_REQUEST_NULL && now == MPI_REQUEST_NULL {
            free_one(prev);
        }
    }
}

unsafe fn snapshot(count: c_int, reqs: *const MPI_Request) -> Vec<MPI_Request> {
    std::slice::from_raw_parts(reqs, count.max(0) as usize).to_vec()
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Isend(
    buf: *const std::os::raw::c_void,
    count: c_int,
    dt: MPI_Datatype,
    dest: c_int,
    tag: c_int,
    comm: MPI_Comm,
    req: *mut MPI_Request,
) -> c_int {
    let rc = PMPI_Isend(buf, count, dt, dest, tag, comm, req);
    allocate_one(*req);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Send_init(
    buf: *const std::os::raw::c_void,
    count: c_int,
    dt: MPI_Datatype,
    dest: c_int,
    tag: c_int,
    comm: MPI_Comm,
    req: *mut MPI_Request,
) -> c_int {
    let rc = PMPI_Send_init(buf, count, dt, dest, tag, comm, req);
    allocate_one(*req);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Start(req: *mut MPI_Request) -> c_int {
    let rc = PMPI_Start(req);
    allocate_one(*req);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Startall(count: c_int, reqs: *mut MPI_Request) -> c_int {
    let rc = PMPI_Startall(count, reqs);
    allocate_array(count, reqs);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Request_free(req: *mut MPI_Request) -> c_int {
    let req_copy = *req;
    let rc = PMPI_Request_free(req);
    free_one(req_copy);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Wait(req: *mut MPI_Request, status: *mut MPI_Status) -> c_int {
    let req_copy = *req;
    let rc = PMPI_Wait(req, status);
    free_one(req_copy);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Test(
    req: *mut MPI_Request,
    flag: *mut c_int,
    status: *mut MPI_Status,
) -> c_int {
    let req_copy = *req;
    let rc = PMPI_Test(req, flag, status);
    if *flag != 0 {
        free_one(req_copy);
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Waitany(
    count: c_int,
    reqs: *mut MPI_Request,
    index: *mut c_int,
    status: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    let rc = PMPI_Waitany(count, reqs, index, status);
    let idx = *index;
    if idx != MPI_UNDEFINED {
        if let Some(&req) = before.get(idx as usize) {
            free_one(req);
        }
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Testany(
    count: c_int,
    reqs: *mut MPI_Request,
    index: *mut c_int,
    flag: *mut c_int,
    status: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    let rc = PMPI_Testany(count, reqs, index, flag, status);
    let idx = *index;
    if idx != MPI_UNDEFINED && *flag != 0 {
        if let Some(&req) = before.get(idx as usize) {
            free_one(req);
        }
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Waitall(
    count: c_int,
    reqs: *mut MPI_Request,
    statuses: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    let rc = PMPI_Waitall(count, reqs, statuses);
    free_changed(count, &before, reqs);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Testall(
    count: c_int,
    reqs: *mut MPI_Request,
    flag: *mut c_int,
    statuses: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    // A partial completion can still retire some requests, so the returned
    // `flag` is not consulted here — every request that changed to null is
    // freed regardless of whether the whole array completed.
    let rc = PMPI_Testall(count, reqs, flag, statuses);
    free_changed(count, &before, reqs);
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Waitsome(
    count: c_int,
    reqs: *mut MPI_Request,
    outcount: *mut c_int,
    indices: *mut c_int,
    statuses: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    let rc = PMPI_Waitsome(count, reqs, outcount, indices, statuses);
    if *outcount != 0 && *outcount != MPI_UNDEFINED {
        free_changed(count, &before, reqs);
    }
    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Testsome(
    count: c_int,
    reqs: *mut MPI_Request,
    outcount: *mut c_int,
    indices: *mut c_int,
    statuses: *mut MPI_Status,
) -> c_int {
    let before = snapshot(count, reqs);
    let rc = PMPI_Testsome(count, reqs, outcount, indices, statuses);
    if *outcount != 0 && *outcount != MPI_UNDEFINED {
        free_changed(count, &before, reqs);
    }
    rc
}
