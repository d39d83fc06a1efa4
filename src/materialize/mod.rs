pub mod job;
pub use job::*;

pub mod job_repository;
pub use job_repository::*;

pub mod json_file_job_repository;
pub use json_file_job_repository::*;

pub mod worker_pool;
pub use worker_pool::*;

pub mod features;
pub use features::*;

pub mod scheduler;
pub use scheduler::*;
