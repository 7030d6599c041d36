//! TOML configuration: renderer defaults, stack arrangement, log filter.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Alignment, Axis, Distribution, HeraldConfig, LoggingConfig, RenderConfig, StackConfig,
};
