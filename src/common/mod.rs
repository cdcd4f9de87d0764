pub mod config;
pub mod span;
pub mod token;
pub mod types;

pub use config::{CompilerConfig, ConfigError};
pub use types::Type;
