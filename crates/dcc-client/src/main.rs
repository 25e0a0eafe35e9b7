//! dcc - Main entry point

use clap::Parser;
use dcc_client::commands;
use dcc_client::config::{log_dir_from_env, mode_from_env};
use dcc_client::{Cli, Commands, DocumentCommand, SendOptions};
use dcc_common::logging::{init_logging, LogConfig, LogLevel, SessionLogs};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // An invalid DCC_MODE is reported by the command itself once logging is up
    let mode = cli.mode.or_else(|| mode_from_env().ok()).unwrap_or_default();
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };

    let log_config = LogConfig::builder()
        .level(level)
        .session(SessionLogs::new(log_dir_from_env(), mode))
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> dcc_client::Result<()> {
    let mode = cli.mode;

    match &cli.command {
        Commands::Get {
            ids,
            frame,
            ignore_404,
        } => commands::get::run(mode, ids.clone(), frame.clone(), *ignore_404).await,

        Commands::Search { terms, limit } => {
            commands::search::run(mode, terms.clone(), *limit).await
        }

        Commands::Send {
            infile,
            profile,
            method,
            error_if_not_found,
            replace_arrays,
            ignore_403,
        } => {
            let opts = SendOptions {
                error_if_not_found: *error_if_not_found,
                extend_array_values: !*replace_arrays,
                raise_403: !*ignore_403,
            };
            commands::send::run(mode, infile, profile.clone(), *method, opts).await
        }

        Commands::Upload {
            file_id,
            path,
            backend,
            region,
        } => {
            commands::upload::run(mode, file_id.clone(), path.clone(), *backend, region.clone())
                .await
        }

        Commands::Document { command } => match command {
            DocumentCommand::Post {
                document,
                document_type,
                description,
                download_filename,
            } => {
                commands::document::post(
                    mode,
                    document,
                    document_type,
                    description,
                    download_filename.as_deref(),
                )
                .await
            }
            DocumentCommand::Link { record, document } => {
                commands::document::link(mode, record, document).await
            }
        },

        Commands::Aliases {
            record,
            strip_prefix,
        } => commands::aliases::run(mode, record, *strip_prefix).await,

        Commands::ReplicateNumbers { infile, outfile } => {
            commands::replicates::replicate_numbers(mode, infile, outfile).await
        }

        Commands::FastqReplicates {
            experiment,
            bio_rep,
            tech_rep,
        } => commands::replicates::fastq_replicates(mode, experiment, *bio_rep, *tech_rep).await,

        Commands::Profiles => commands::profiles::run(mode).await,
    }
}
