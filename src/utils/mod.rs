/// Research configuration loading (TOML file, environment overrides).
pub mod config;

pub use config::{ConfigError, ResearchConfig};
