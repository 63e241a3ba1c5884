use std::os::raw::c_int;

use mpileaks_control::{on_control, on_finalize, on_init};

use crate::ffi::*;
use crate::registry::register_all;
use crate::transport::MpiTransport;

fn stdout_transport() -> MpiTransport {
    let mut rank: c_int = 0;
    let mut size: c_int = 1;
    unsafe {
        PMPI_Comm_rank(MPI_COMM_WORLD, &mut rank);
        PMPI_Comm_size(MPI_COMM_WORLD, &mut size);
    }
    MpiTransport::new(rank as u32, size as u32)
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Init(argc: *mut c_int, argv: *mut *mut *mut i8) -> c_int {
    let rc = PMPI_Init(argc, argv);

    let mut rank: c_int = 0;
    let mut size: c_int = 1;
    PMPI_Comm_rank(MPI_COMM_WORLD, &mut rank);
    PMPI_Comm_size(MPI_COMM_WORLD, &mut size);

    register_all();
    on_init(rank as u32, size as u32);

    rc
}

#[no_mangle]
pub unsafe extern "C" fn MPI_PControl(level: c_int) -> c_int {
    let transport = stdout_transport();
    let mut stdout = std::io::stdout();
    on_control(level, &transport, &mut stdout);
    MPI_SUCCESS
}

#[no_mangle]
pub unsafe extern "C" fn MPI_Finalize() -> c_int {
    let transport = stdout_transport();
    let mut stdout = std::io::stdout();
    on_finalize(&transport, &mut stdout);
    PMPI_Finalize()
}
