pub mod cache_store;
pub use cache_store::*;

pub mod memory_cache_store;
pub use memory_cache_store::*;

pub mod fingerprint;
pub use fingerprint::*;

pub mod result_cache;
pub use result_cache::*;
