//! Opaque handle types and the `PMPI_*` entry points this shim interposes
//! on. Handles are declared as `c_int`, matching the common MPICH ABI
//! convention; implementations that use pointer-sized handles (Open MPI)
//! would swap these `type` aliases without touching any wrapper body.
//!
//! The `extern "C"` block below has no bodies: these symbols resolve at
//! link time against the real MPI library the host application links,
//! exactly as the original C interposer relies on the linker (or
//! `LD_PRELOAD`) to bind `PMPI_*` against libmpi.

#![allow(non_camel_case_types)]

use std::os::raw::{c_int, c_void};

pub type MPI_Request = c_int;
pub type MPI_Comm = c_int;
pub type MPI_Group = c_int;
pub type MPI_Datatype = c_int;
pub type MPI_File = c_int;
pub type MPI_Errhandler = c_int;
pub type MPI_Info = c_int;
pub type MPI_Op = c_int;
pub type MPI_Win = c_int;
pub type MPI_Status = c_void;
pub type MPI_Aint = isize;

pub const MPI_SUCCESS: c_int = 0;
pub const MPI_REQUEST_NULL: MPI_Request = 0;
pub const MPI_COMM_NULL: MPI_Comm = 0;
pub const MPI_GROUP_NULL: MPI_Group = 0;
pub const MPI_GROUP_EMPTY: MPI_Group = 1;
pub const MPI_DATATYPE_NULL: MPI_Datatype = 0;
pub const MPI_FILE_NULL: MPI_File = 0;
pub const MPI_ERRHANDLER_NULL: MPI_Errhandler = 0;
pub const MPI_INFO_NULL: MPI_Info = 0;
pub const MPI_OP_NULL: MPI_Op = 0;
pub const MPI_WIN_NULL: MPI_Win = 0;
pub const MPI_UNDEFINED: c_int = -32766;
pub const MPI_COMM_WORLD: MPI_Comm = 0;
pub const MPI_BYTE: MPI_Datatype = 1;

extern "C" {
    pub fn PMPI_Init(argc: *mut c_int, argv: *mut *mut *mut i8) -> c_int;
    pub fn PMPI_Finalize() -> c_int;
    pub fn PMPI_Comm_rank(comm: MPI_Comm, rank: *mut c_int) -> c_int;
    pub fn PMPI_Comm_size(comm: MPI_Comm, size: *mut c_int) -> c_int;
    pub fn PMPI_PControl(level: c_int, ...) -> c_int;
    pub fn PMPI_Send(
        buf: *const c_void,
        count: c_int,
        dt: MPI_Datatype,
        dest: c_int,
        tag: c_int,
        comm: MPI_Comm,
    ) -> c_int;
    pub fn PMPI_Recv(
        buf: *mut c_void,
        count: c_int,
        dt: MPI_Datatype,
        src: c_int,
        tag: c_int,
        comm: MPI_Comm,
        status: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Probe(src: c_int, tag: c_int, comm: MPI_Comm, status: *mut MPI_Status) -> c_int;
    pub fn PMPI_Get_count(status: *const MPI_Status, dt: MPI_Datatype, count: *mut c_int) -> c_int;

    pub fn PMPI_Isend(
        buf: *const c_void,
        count: c_int,
        dt: MPI_Datatype,
        dest: c_int,
        tag: c_int,
        comm: MPI_Comm,
        req: *mut MPI_Request,
    ) -> c_int;
    pub fn PMPI_Send_init(
        buf: *const c_void,
        count: c_int,
        dt: MPI_Datatype,
        dest: c_int,
        tag: c_int,
        comm: MPI_Comm,
        req: *mut MPI_Request,
    ) -> c_int;
    pub fn PMPI_Start(req: *mut MPI_Request) -> c_int;
    pub fn PMPI_Startall(count: c_int, reqs: *mut MPI_Request) -> c_int;
    pub fn PMPI_Wait(req: *mut MPI_Request, status: *mut MPI_Status) -> c_int;
    pub fn PMPI_Test(req: *mut MPI_Request, flag: *mut c_int, status: *mut MPI_Status) -> c_int;
    pub fn PMPI_Waitany(
        count: c_int,
        reqs: *mut MPI_Request,
        index: *mut c_int,
        status: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Testany(
        count: c_int,
        reqs: *mut MPI_Request,
        index: *mut c_int,
        flag: *mut c_int,
        status: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Waitall(count: c_int, reqs: *mut MPI_Request, statuses: *mut MPI_Status) -> c_int;
    pub fn PMPI_Testall(
        count: c_int,
        reqs: *mut MPI_Request,
        flag: *mut c_int,
        statuses: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Waitsome(
        count: c_int,
        reqs: *mut MPI_Request,
        outcount: *mut c_int,
        indices: *mut c_int,
        statuses: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Testsome(
        count: c_int,
        reqs: *mut MPI_Request,
        outcount: *mut c_int,
        indices: *mut c_int,
        statuses: *mut MPI_Status,
    ) -> c_int;
    pub fn PMPI_Request_free(req: *mut MPI_Request) -> c_int;

    pub fn PMPI_Comm_dup(comm: MPI_Comm, newcomm: *mut MPI_Comm) -> c_int;
    pub fn PMPI_Comm_free(comm: *mut MPI_Comm) -> c_int;

    pub fn PMPI_Group_union(g1: MPI_Group, g2: MPI_Group, out: *mut MPI_Group) -> c_int;
    pub fn PMPI_Group_free(group: *mut MPI_Group) -> c_int;

    pub fn PMPI_Type_contiguous(count: c_int, old: MPI_Datatype, new: *mut MPI_Datatype) -> c_int;
    pub fn PMPI_Type_free(dt: *mut MPI_Datatype) -> c_int;

    pub fn PMPI_File_open(
        comm: MPI_Comm,
        filename: *const i8,
        amode: c_int,
        info: MPI_Info,
        fh: *mut MPI_File,
    ) -> c_int;
    pub fn PMPI_File_close(fh: *mut MPI_File) -> c_int;

    pub fn PMPI_Comm_create_errhandler(
        function: *const c_void,
        errhandler: *mut MPI_Errhandler,
    ) -> c_int;
    pub fn PMPI_Errhandler_free(errhandler: *mut MPI_Errhandler) -> c_int;

    pub fn PMPI_Info_create(info: *mut MPI_Info) -> c_int;
    pub fn PMPI_Info_free(info: *mut MPI_Info) -> c_int;

    pub fn PMPI_Op_create(function: *const c_void, commute: c_int, op: *mut MPI_Op) -> c_int;
    pub fn PMPI_Op_free(op: *mut MPI_Op) -> c_int;

    pub fn PMPI_Alloc_mem(size: MPI_Aint, info: MPI_Info, baseptr: *mut c_void) -> c_int;
    pub fn PMPI_Free_mem(base: *mut c_void) -> c_int;

    pub fn PMPI_Win_create(
        base: *mut c_void,
        size: MPI_Aint,
        disp_unit: c_int,
        info: MPI_Info,
        comm: MPI_Comm,
        win: *mut MPI_Win,
    ) -> c_int;
    pub fn PMPI_Win_free(win: *mut MPI_Win) -> c_int;

    pub fn PMPI_Comm_create_keyval(
        copy_fn: *const c_void,
        delete_fn: *const c_void,
        keyval: *mut c_int,
        extra_state: *mut c_void,
    ) -> c_int;
    pub fn PMPI_Comm_free_keyval(keyval: *mut c_int) -> c_int;
    pub fn PMPI_Win_create_keyval(
        copy_fn: *const c_void,
        delete_fn: *const c_void,
        keyval: *mut c_int,
        extra_state: *mut c_void,
    ) -> c_int;
    pub fn PMPI_Win_free_keyval(keyval: *mut c_int) -> c_int;
    pub fn PMPI_Type_create_keyval(
        copy_fn: *const c_void,
        delete_fn: *const c_void,
        keyval: *mut c_int,
        extra_state: *mut c_void,
    ) -> c_int;
    pub fn PMPI_Type_free_keyval(keyval: *mut c_int) -> c_int;
}
