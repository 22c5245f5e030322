pub mod admission;
pub mod file_record;
