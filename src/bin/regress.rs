use clap::Parser;
use go_gtp::core::regress::{self, RegressReport, FIXTURE_EXTENSION};
use go_gtp::domain::ports::GtpClient;
use go_gtp::utils::error::{GtpError, Result};
use go_gtp::utils::{logger, validation};
use go_gtp::GtpProcess;
use std::path::Path;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "regress")]
#[command(about = "Run GTP regression fixtures (.tst) against a program")]
struct Args {
    /// Command line of the program under test
    #[arg(short, long)]
    program: String,

    /// Fixture files
    #[arg(required = true)]
    fixtures: Vec<String>,

    /// Seconds to wait for each response
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the report as JSON to this file
    #[arg(long)]
    json: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

async fn run_file(args: &Args, file: &str) -> Result<regress::FileReport> {
    let content = std::fs::read_to_string(file)?;
    let commands = regress::parse_fixture(&content)?;
    let name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());

    // 每個測試檔都用新的程式行程
    let mut client = GtpProcess::spawn(&name, &args.program, args.timeout.map(Duration::from_secs))?;
    let report = regress::run_fixture(&name, &commands, &mut client).await;
    if let Err(e) = client.close().await {
        tracing::warn!("Closing program for {} failed: {}", name, e);
    }
    report
}

fn report_error(e: &GtpError) -> ! {
    tracing::error!("❌ Regression run failed: {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = validation::command_line("program", Some(args.program.as_str()))
        .and_then(|_| validation::fixture_files("fixtures", &args.fixtures, FIXTURE_EXTENSION))
    {
        report_error(&e);
    }

    let mut report = RegressReport::default();
    for file in &args.fixtures {
        tracing::info!("Running {}", file);
        match run_file(&args, file).await {
            Ok(file_report) => report.files.push(file_report),
            Err(e) => report_error(&e),
        }
    }

    print!("{}", report);

    if let Some(path) = &args.json {
        let written = serde_json::to_string_pretty(&report)
            .map_err(GtpError::from)
            .and_then(|json| std::fs::write(path, json).map_err(GtpError::from));
        if let Err(e) = written {
            report_error(&e);
        }
    }

    if !report.success() {
        std::process::exit(1);
    }
}
