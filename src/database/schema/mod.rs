pub mod value_kind;
pub use value_kind::*;

pub mod time_formats;
pub use time_formats::*;

pub mod field_location;
pub use field_location::*;

pub mod field_info;
pub use field_info::*;

pub mod field_catalog;
pub use field_catalog::*;
