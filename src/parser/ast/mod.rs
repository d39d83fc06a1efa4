pub mod query;
pub use query::*;

pub mod clause;
pub use clause::*;

pub mod operators;
pub use operators::*;

pub mod projection_parser;
pub use projection_parser::*;

pub mod where_parser;
pub use where_parser::*;

pub mod literal_parser;
pub use literal_parser::*;

pub mod limit_parser;
pub use limit_parser::*;
