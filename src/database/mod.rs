pub mod schema;
pub use schema::*;

pub mod fact_value;
pub use fact_value::*;

pub mod fact;
pub use fact::*;

pub mod fact_store;
pub use fact_store::*;

pub mod memory_fact_store;
pub use memory_fact_store::*;
