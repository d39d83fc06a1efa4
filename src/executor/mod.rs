pub mod truth;
pub use truth::*;

pub mod eval;
pub use eval::*;

pub mod row;
pub use row::*;

pub mod projection;
pub use projection::*;

pub mod plan_executor;
pub use plan_executor::*;

pub mod cohort_runner;
pub use cohort_runner::*;
