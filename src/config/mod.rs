pub mod cli;
#[cfg(feature = "cli")]
pub mod engine;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use engine::EngineConfig;
pub use toml_config::MatchConfig;
