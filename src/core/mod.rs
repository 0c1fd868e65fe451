//! 核心：错误类型、应用构建器

pub mod builder;
pub mod error;

pub use builder::AppBuilder;
pub use error::ReviewError;
