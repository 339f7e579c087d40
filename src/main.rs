use clap::Parser;
use keysweep::cli::{Cli, Commands, OutputFormatter, ProgressObserver};
use keysweep::core::{CandidateCredential, Config, CredentialValidator, ScanReport};
use keysweep::{AwsExtractor, AwsStsValidator, CancelToken, HistoryScanner, ValidationOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Load .env file if it exists
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    OutputFormatter::print_banner();

    if let Err(e) = execute_command(cli.command).await {
        OutputFormatter::print_error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

async fn execute_command(command: Commands) -> keysweep::Result<()> {
    match command {
        Commands::Scan {
            repo,
            concurrency,
            rate_limit_ms,
            output,
        } => {
            scan_command(repo, concurrency, rate_limit_ms, output).await?;
        }
        Commands::Check {
            access_key_id,
            secret_access_key,
        } => {
            check_command(access_key_id, secret_access_key).await?;
        }
        Commands::Report {
            input,
            format,
            output,
        } => {
            report_command(input, format, output)?;
        }
    }

    Ok(())
}

fn load_config() -> keysweep::Result<Config> {
    let config_paths = vec!["config/default.toml", "default.toml", ".keysweep.toml"];

    for path in config_paths {
        if Path::new(path).exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!("Failed to parse config from {}: {}", path, e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read config from {}: {}", path, e);
                }
            }
        }
    }

    warn!("No config file found, using defaults");
    Ok(Config::default())
}

async fn scan_command(
    repo: String,
    concurrency: Option<usize>,
    rate_limit_ms: Option<u64>,
    output: Option<String>,
) -> keysweep::Result<()> {
    let mut config = load_config()?;
    if let Some(concurrency) = concurrency {
        config.validation.concurrency = concurrency;
    }
    if let Some(rate_limit_ms) = rate_limit_ms {
        config.validation.rate_limit_ms = rate_limit_ms;
    }

    let start = Instant::now();

    let extractor = Arc::new(AwsExtractor::new());
    let validator = Arc::new(AwsStsValidator::new(&config.validation));
    let scanner = HistoryScanner::new(extractor, validator, &config)
        .with_observer(Arc::new(ProgressObserver::new()));

    // Ctrl-C lets the current revision finish, abandons in-flight
    // validations, and reports whatever settled.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                OutputFormatter::print_warning(
                    "interrupt received; finishing the current revision...",
                );
                cancel.cancel();
            }
        });
    }

    OutputFormatter::print_info(&format!("Sweeping history of {}", repo));
    let report = scanner.run(&repo, cancel).await?;

    let output_path = report_path(&config, output)?;
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&output_path, json)?;

    OutputFormatter::print_report(&report);
    OutputFormatter::print_success(&format!("Report saved to {}", output_path.display()));
    OutputFormatter::print_info(&format!(
        "Total time taken: {:.2}s",
        start.elapsed().as_secs_f64()
    ));

    Ok(())
}

fn report_path(config: &Config, output: Option<String>) -> keysweep::Result<PathBuf> {
    if let Some(path) = output {
        return Ok(PathBuf::from(path));
    }
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let dir = Path::new(&config.output.directory);
    fs::create_dir_all(dir)?;
    Ok(dir.join(format!("sweep_{}.json", timestamp)))
}

async fn check_command(access_key_id: String, secret_access_key: String) -> keysweep::Result<()> {
    let config = load_config()?;
    let validator = AwsStsValidator::new(&config.validation);

    OutputFormatter::print_info(&format!("Checking {}...", access_key_id));

    let credential = CandidateCredential {
        identifier: access_key_id,
        secret: secret_access_key,
    };

    match validator.validate(&credential).await {
        Ok(ValidationOutcome::Valid) => {
            OutputFormatter::print_error("Pair is LIVE - rotate it immediately");
        }
        Ok(ValidationOutcome::Invalid) => {
            OutputFormatter::print_success("Pair is not live");
        }
        Ok(ValidationOutcome::Indeterminate(reason)) => {
            OutputFormatter::print_warning(&format!("Could not determine: {}", reason));
        }
        Err(e) => {
            OutputFormatter::print_warning(&format!("Could not determine: {}", e));
        }
    }

    Ok(())
}

fn report_command(input: String, format: String, output: Option<String>) -> keysweep::Result<()> {
    let json = fs::read_to_string(&input)?;
    let report: ScanReport = serde_json::from_str(&json)?;

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        "text" => OutputFormatter::render_text(&report),
        _ => {
            return Err(keysweep::KeySweepError::Config(format!(
                "Unknown format: {}",
                format
            )));
        }
    };

    if let Some(output_file) = output {
        fs::write(&output_file, rendered)?;
        OutputFormatter::print_success(&format!("Report saved to {}", output_file));
    } else {
        println!("\n{}", rendered);
    }

    Ok(())
}
