pub mod feature_store;
pub use feature_store::*;

pub mod memory_feature_store;
pub use memory_feature_store::*;

pub mod linkage;
pub use linkage::*;

pub mod slicer;
pub use slicer::*;
