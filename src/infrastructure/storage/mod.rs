mod core;
mod storage_port_impl;

pub use core::*;
pub use storage_port_impl::FsStoragePort;
