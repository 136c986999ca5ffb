//! Process-level surface: memory handles and the listing used by callers

pub mod list;
pub mod mem;

pub use list::{list_processes, ProcessEntry};
pub use mem::ProcessMemory;
