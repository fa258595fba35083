use crate::application::use_cases::review_pipeline::{DatasetSummary, PreparedUpload};
use crate::domain::error::{AppError, Result};
use crate::domain::review::Progress;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::{AppConfig, ConfigService, CredentialResolver};
use crate::infrastructure::csv::CsvLoader;
use crate::interfaces::http::{self, LogEntry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Product review analyzer & summarizer", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ./review-analyzer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show row count, detected columns and the review column of a CSV
    Inspect { csv: PathBuf },
    /// Analyze every review and write the enriched CSV
    Analyze {
        csv: PathBuf,
        /// Output path (defaults to the configured output file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the pause after each review, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Serve the HTTP interface
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Manage the API key kept in the OS keyring
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Store an API key in the OS keyring
    Set { key: String },
    /// Remove the stored API key
    Delete,
    /// Report which source the API key would be loaded from
    Status,
}

pub async fn dispatch(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Inspect { csv } => {
            let dataset = CsvLoader::new()
                .with_max_rows(config.analysis.max_rows)
                .load_path(&csv)?;
            let upload = PreparedUpload::from_dataset(dataset)?;
            print_summary(&upload.summary());
            Ok(())
        }
        Commands::Analyze {
            csv,
            output,
            delay_ms,
        } => {
            if let Some(delay_ms) = delay_ms {
                config.analysis.request_delay_ms = delay_ms;
                config.validate()?;
            }
            let output = output
                .unwrap_or_else(|| PathBuf::from(&config.analysis.output_file_name));
            let state = bootstrap::build_state(config);

            let upload = state.pipeline.prepare_path(&csv)?;
            print_summary(&upload.summary());
            println!("Starting analysis. Please wait...");

            let report = |progress: Progress| {
                eprintln!(
                    "[{:>3.0}%] Processed review {}/{}",
                    progress.fraction() * 100.0,
                    progress.processed,
                    progress.total
                );
            };
            let result = state.pipeline.execute(&upload, &report).await?;

            std::fs::write(&output, &result.csv).map_err(|e| {
                AppError::IoError(format!("Failed to write {}: {}", output.display(), e))
            })?;

            println!(
                "Analysis completed: {} reviews, {} failed. Saved to {}",
                result.results.len(),
                result.failed_rows,
                output.display()
            );
            Ok(())
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = Arc::new(bootstrap::build_state(config));
            let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
            http::start_server(state, logs)?.await?;
            Ok(())
        }
        Commands::Key { action } => run_key_command(action),
    }
}

fn run_key_command(action: KeyCommands) -> Result<()> {
    let service = ConfigService::new();
    match action {
        KeyCommands::Set { key } => {
            service.save_api_key(&key)?;
            info!("Stored API key in OS keyring");
            println!("API key saved to the OS keyring");
        }
        KeyCommands::Delete => {
            service.delete_api_key()?;
            println!("API key removed from the OS keyring");
        }
        KeyCommands::Status => match CredentialResolver::new().resolve() {
            Some(credential) => println!("API key found in {}", credential.source),
            None => println!("No API key configured"),
        },
    }
    Ok(())
}

fn print_summary(summary: &DatasetSummary) {
    println!("Loaded {} reviews", summary.row_count);
    println!("Detected CSV columns: {:?}", summary.columns);
    println!("Using review column: '{}'", summary.review_column);
    for row in &summary.preview {
        let cells: Vec<String> = row
            .iter()
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        println!("  {}", cells.join(" | "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "review-analyzer",
            "--config",
            "custom.toml",
            "analyze",
            "reviews.csv",
            "-o",
            "out.csv",
            "--delay-ms",
            "0",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Analyze {
                csv,
                output,
                delay_ms,
            } => {
                assert_eq!(csv, PathBuf::from("reviews.csv"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(delay_ms, Some(0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_key_set() {
        let cli = Cli::parse_from(["review-analyzer", "key", "set", "abc"]);
        assert!(matches!(
            cli.command,
            Commands::Key {
                action: KeyCommands::Set { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_inspect_reads_csv_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        std::fs::write(&path, "product_name,review,rating\nShoe A,Great fit,5\n").unwrap();

        let cli = Cli::parse_from(["review-analyzer", "inspect", path.to_str().unwrap()]);
        dispatch(cli, AppConfig::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_inspect_rejects_missing_rating_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        std::fs::write(&path, "product_name,review\nShoe A,Great fit\n").unwrap();

        let cli = Cli::parse_from(["review-analyzer", "inspect", path.to_str().unwrap()]);
        let err = dispatch(cli, AppConfig::default()).await.unwrap_err();
        assert_eq!(err, AppError::MissingColumn("rating".to_string()));
    }
}
