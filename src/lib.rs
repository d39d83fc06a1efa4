pub mod parser;
pub mod database;
pub mod planner;
pub mod executor;
pub mod cache;
pub mod export;
pub mod collaborators;
pub mod drilldown;
pub mod materialize;
pub mod templates;
pub mod models;
pub mod service;
pub mod error;
pub mod config;

pub use config::EngineConfig;
pub use database::{Fact, FactStore, FieldCatalog, MemoryFactStore};
pub use error::{CohortError, EngineResult, StoreError};
pub use models::{CohortQuery, CohortResult};
pub use service::{CohortService, CohortServiceBuilder};
