use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use droidgate::{checker::default_checkers, runner::OnComplete, Config, Runner, ScanResult, Severity};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const FINDINGS: u8 = 2;
}

#[derive(Parser)]
#[command(name = "droidgate")]
#[command(
    author,
    version,
    about = "Check an Android project for store-policy compliance issues"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an Android project directory
    Scan {
        /// Project root
        path: PathBuf,

        /// Hide findings below this severity
        #[arg(short = 's', long, value_enum)]
        min_severity: Option<SeverityArg>,

        /// Exit with status 2 if findings at or above this severity remain
        #[arg(long, value_enum)]
        fail_on: Option<SeverityArg>,

        /// Write the JSON result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not show the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// List the registered checkers
    ListCheckers,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            min_severity,
            fail_on,
            output,
            no_progress,
        } => {
            let mut config = Config::load()?;
            if let Some(level) = min_severity {
                config.min_severity = level.into();
            }
            if let Some(level) = fail_on {
                config.fail_on = level.into();
            }
            if no_progress {
                config.progress = false;
            }

            run_scan(&path, &config, output).await
        }
        Commands::ListCheckers => {
            list_checkers();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(path: &Path, config: &Config, output_file: Option<PathBuf>) -> Result<u8> {
    let project_root = path
        .canonicalize()
        .with_context(|| format!("Cannot access project path: {}", path.display()))?;
    if !project_root.is_dir() {
        bail!("Project path is not a directory: {}", project_root.display());
    }

    let runner = Runner::with_default_checkers();

    let progress = if config.progress {
        Some(progress_bar(runner.checkers().len() as u64))
    } else {
        None
    };
    let on_complete: Option<OnComplete> = progress.clone().map(|pb| {
        let callback: OnComplete = Arc::new(move |id: &str| {
            pb.set_message(id.to_string());
            pb.inc(1);
        });
        callback
    });

    let result = runner.run(&project_root, on_complete).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for (checker, error) in result.errors() {
        eprintln!("warning: checker '{}' failed: {}", checker, error);
    }

    let shown = visible_result(&result, config);
    let json = serde_json::to_string_pretty(&shown)?;

    if let Some(path) = output_file {
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        eprintln!("Results written to: {}", path.display());
    } else {
        println!("{}", json);
    }

    if shown.has_at_least(config.fail_on) {
        Ok(exit_codes::FINDINGS)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn visible_result(result: &ScanResult, config: &Config) -> ScanResult {
    let mut shown = result.clone();
    shown.findings = config.apply(result).into_iter().cloned().collect();
    shown
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn list_checkers() {
    println!("Registered checkers:");
    println!();

    for checker in default_checkers() {
        println!("  {:<12} {}", checker.id(), checker.name());
        println!("  {:<12} {}", "", checker.description());
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let path = Config::config_path();

    match (init, show_path) {
        (_, true) => println!("{}", path.display()),
        (true, false) => {
            if Config::init_file(&path)? {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Keeping existing config at {}", path.display());
            }
        }
        (false, false) => {
            let config = Config::load()?;
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# built-in defaults (run 'droidgate config --init' to write them to {})", path.display());
            }
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
