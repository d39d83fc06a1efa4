pub mod cohort_plan;
pub use cohort_plan::*;

pub mod plan_builder;
pub use plan_builder::*;
