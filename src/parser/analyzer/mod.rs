pub mod compiled_predicate;
pub use compiled_predicate::*;

pub mod drop_reason;
pub use drop_reason::*;

pub mod predicate_compiler;
pub use predicate_compiler::*;
