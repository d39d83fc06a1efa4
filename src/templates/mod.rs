pub mod template;
pub use template::*;

pub mod template_repository;
pub use template_repository::*;
