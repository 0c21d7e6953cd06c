use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("go_gtp=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("go_gtp=info"))
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 引擎的 stdout 是 GTP 通道，日誌只能寫到 stderr 或檔案
pub fn init_engine_logger(verbose: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(default_filter(verbose))
                .with(layer.with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(default_filter(verbose))
                .with(layer.with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}
