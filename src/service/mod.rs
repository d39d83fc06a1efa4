pub mod cohort_service;
pub use cohort_service::*;

pub mod cohort_service_builder;
pub use cohort_service_builder::*;
