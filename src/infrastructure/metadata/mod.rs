mod files_repository_postgrest;
mod postgrest;

pub use files_repository_postgrest::PostgrestFilesRepository;
pub use postgrest::{PostgrestClient, PostgrestResponse, eq};
