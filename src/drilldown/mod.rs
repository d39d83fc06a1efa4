pub mod drilldown_models;
pub use drilldown_models::*;

pub mod drilldown_assembler;
pub use drilldown_assembler::*;
