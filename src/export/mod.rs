pub mod stringify;
pub use stringify::*;

pub mod csv_exporter;
pub use csv_exporter::*;
