pub mod cohort_query;
pub use cohort_query::*;

pub mod cohort_result;
pub use cohort_result::*;
