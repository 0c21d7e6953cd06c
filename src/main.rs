use clap::Parser;
use go_gtp::core::session::board_summary;
use go_gtp::utils::{logger, validation::Validate};
use go_gtp::{EngineConfig, GtpError, GtpSession, RandomPlayer};
use std::io;

fn fail(e: &GtpError) -> ! {
    tracing::error!(
        "❌ Engine failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

fn main() {
    let config = EngineConfig::parse();

    // stdout 專供 GTP 回應，日誌一律寫到 stderr 或檔案
    if let Err(e) = logger::init_engine_logger(config.verbose, config.log_file.as_deref()) {
        eprintln!("❌ Cannot open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    tracing::info!(
        "Starting {} {} (policy {:?}, size {})",
        config.name,
        config.engine_version,
        config.policy,
        config.size
    );

    let player = RandomPlayer::new(
        config.name.clone(),
        config.engine_version.clone(),
        config.policy,
        config.seed,
    );
    let mut session = match GtpSession::new(player, config.size) {
        Ok(session) => session,
        Err(e) => fail(&e),
    };
    session.register("board", 0, "Usage: board", board_summary);

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = session.run(&mut stdin.lock(), &mut stdout.lock()) {
        fail(&e);
    }
    tracing::info!("Session ended");
}
