use crate::core::player::Policy;
use crate::domain::board::DEFAULT_SIZE;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "go-gtp")]
#[command(about = "A GTP engine that plays random legal moves")]
pub struct EngineConfig {
    /// Name reported by the `name` command
    #[arg(long, default_value = "Go2")]
    pub name: String,

    /// Version reported by the `version` command
    #[arg(long, default_value = "1.0")]
    pub engine_version: String,

    /// Initial board size
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Move selection behind genmove
    #[arg(long, value_enum, default_value = "no-eye-fill")]
    pub policy: Policy,

    /// Seed for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        validation::label("name", &self.name)?;
        validation::board_size("size", self.size)?;
        if let Some(path) = &self.log_file {
            validation::file_path("log_file", path)?;
        }
        Ok(())
    }
}
