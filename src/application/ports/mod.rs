pub mod files_repository;
pub mod storage_port;
