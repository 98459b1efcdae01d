//! Input handling
//! Raw records, repository capabilities and file-backed loading

pub mod file_detector;
pub mod loader;
pub mod record;
pub mod repository;
