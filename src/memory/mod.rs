//! Memory surface: region descriptors, the abstract read capability and the
//! chunked needle scanner

pub mod regions;
pub mod scanner;
pub mod source;

pub use regions::{MemoryRegion, Permissions, RegionEnumerator};
pub use scanner::{
    CancelToken, MemoryScanner, NeedlePolicy, ScanMode, ScanOptions, DEFAULT_CHUNK_SIZE,
};
pub use source::{MemorySource, ProcSource};
