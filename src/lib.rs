pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, MatchConfig};
#[cfg(feature = "cli")]
pub use config::EngineConfig;

pub use core::{
    client::{GtpProcess, LocalClient},
    player::{Policy, RandomPlayer},
    session::GtpSession,
    twogtp::MatchRunner,
};
pub use domain::board::Board;
pub use utils::error::{GtpError, Result};
