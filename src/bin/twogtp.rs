use clap::Parser;
use go_gtp::config::toml_config::MatchConfig;
use go_gtp::core::analyze;
use go_gtp::core::results::ResultStore;
use go_gtp::domain::ports::MatchSettings;
use go_gtp::utils::error::GtpError;
use go_gtp::utils::{logger, validation::Validate};
use go_gtp::{GtpProcess, LocalStorage, MatchRunner};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "twogtp")]
#[command(about = "Play a match between two GTP programs and record the results")]
struct Args {
    /// Path to TOML match configuration
    #[arg(short, long)]
    config: Option<String>,

    /// Command line of the black program
    #[arg(long)]
    black: Option<String>,

    /// Command line of the white program
    #[arg(long)]
    white: Option<String>,

    #[arg(long)]
    size: Option<usize>,

    #[arg(long)]
    games: Option<usize>,

    #[arg(long, allow_negative_numbers = true)]
    komi: Option<f32>,

    /// Exchange colors on every other game
    #[arg(long)]
    alternate: bool,

    /// Directory for the SGF files and the result table
    #[arg(long)]
    results_dir: Option<String>,

    #[arg(long)]
    sgf_prefix: Option<String>,

    /// Seconds to wait for each engine response
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    max_moves: Option<usize>,

    /// Keep playing after a game ends with an engine error
    #[arg(long)]
    continue_on_error: bool,

    /// Overwrite an existing result table instead of continuing it
    #[arg(long)]
    force: bool,

    /// Summarize an existing result table and exit
    #[arg(long, value_name = "FILE")]
    analyze: Option<String>,

    #[arg(short, long)]
    verbose: bool,

    /// Log CPU and memory of both programs after each game
    #[arg(long)]
    monitor: bool,

    /// Show the match setup without starting the programs
    #[arg(long)]
    dry_run: bool,
}

fn report_error(context: &str, e: &GtpError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

fn load_config(args: &Args) -> Result<MatchConfig, GtpError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            MatchConfig::from_file(path)?
        }
        None => MatchConfig::from_toml_str("")?,
    };

    // 命令列參數覆蓋設定檔
    if let Some(black) = &args.black {
        config.black.command = Some(black.clone());
    }
    if let Some(white) = &args.white {
        config.white.command = Some(white.clone());
    }
    if args.size.is_some() {
        config.game.size = args.size;
    }
    if args.games.is_some() {
        config.game.games = args.games;
    }
    if args.komi.is_some() {
        config.game.komi = args.komi;
    }
    if args.alternate {
        config.game.alternate = Some(true);
    }
    if args.max_moves.is_some() {
        config.game.max_moves = args.max_moves;
    }
    if args.timeout.is_some() {
        config.game.timeout_secs = args.timeout;
    }
    if args.continue_on_error {
        config.game.continue_on_error = Some(true);
    }
    if args.force {
        config.game.force = Some(true);
    }
    if let Some(dir) = &args.results_dir {
        config.results.directory = Some(dir.clone());
    }
    if let Some(prefix) = &args.sgf_prefix {
        config.results.sgf_prefix = Some(prefix.clone());
    }

    config.validate()?;
    Ok(config)
}

fn display_config_summary(config: &MatchConfig) {
    println!("📋 Match Summary:");
    println!("  Black: {}", config.black_command());
    println!("  White: {}", config.white_command());
    println!(
        "  Games: {}  Size: {}  Komi: {}  Alternate: {}",
        config.games(),
        config.board_size(),
        config.komi(),
        config.alternate()
    );
    println!("  Max moves: {}", config.max_moves());
    match config.timeout() {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: none"),
    }
    println!(
        "  Results: {}",
        Path::new(config.results_dir()).join(config.dat_file()).display()
    );
    println!();
}

async fn run_analysis(file: &str) {
    let path = Path::new(file);
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());

    let store = ResultStore::new(LocalStorage::new(dir), name);
    match analyze::analyze(&store).await {
        Ok(analysis) => print!("{}", analysis),
        Err(e) => report_error("Analysis failed", &e),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Some(file) = &args.analyze {
        run_analysis(file).await;
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => report_error("Configuration validation failed", &e),
    };
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No programs will be started");
        return;
    }

    let timeout = config.timeout();
    let mut black = match GtpProcess::spawn("black", config.black_command(), timeout) {
        Ok(process) => process,
        Err(e) => report_error("Cannot start black", &e),
    };
    let mut white = match GtpProcess::spawn("white", config.white_command(), timeout) {
        Ok(process) => process,
        Err(e) => report_error("Cannot start white", &e),
    };

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let storage = LocalStorage::new(config.results_dir().to_string());
    let runner = MatchRunner::new_with_monitoring(storage, config, args.monitor);

    match runner.run(&mut black, &mut white).await {
        Ok(report) => {
            tracing::info!(
                "✅ Match finished: {} games played from game {}",
                report.games_played,
                report.first_game
            );
            println!("✅ {} games played, {} with errors", report.games_played, report.errors);
            println!("📁 Results saved to: {}", report.dat_file);
        }
        Err(e) => report_error("Match aborted", &e),
    }
}
