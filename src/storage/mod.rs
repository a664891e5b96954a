pub mod layout;
pub mod snapshot;
pub mod file_lock;
