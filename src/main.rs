//! retempo CLI entry point

use clap::Parser;
use retempo::config::{Cli, Settings};
use retempo::pipeline;
use retempo::types::FileOutcome;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Build settings from CLI
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Run the pipeline
    match pipeline::run(&settings) {
        Ok(report) => {
            println!();
            println!(
                "Summary: {} successful, {} failed, {} skipped (of {} total)",
                report.succeeded, report.failed, report.skipped, report.total_files
            );

            if report.tag_warnings > 0 {
                println!(
                    "  {} output(s) written without copied tags",
                    report.tag_warnings
                );
            }

            for failure in report.failures() {
                if let FileOutcome::Failed { stage, reason } = &failure.outcome {
                    println!();
                    println!(
                        "  FAILED {} (during {}):\n    {}",
                        failure.path.display(),
                        stage.as_str(),
                        reason.replace('\n', "\n    ")
                    );
                }
            }

            if report.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    if !cli.folder.is_dir() {
        return Err(format!(
            "Folder does not exist or is not a directory: {}\n\n  Tip: Check the path is correct and accessible.\n  Example:\n    retempo -f ~/Music/sets -b 165",
            cli.folder.display()
        ));
    }

    if let Some(bpm) = cli.bpm {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(format!(
                "Target BPM must be a positive number, got {}",
                bpm
            ));
        }
    }

    if let Some(factor) = cli.factor {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(format!(
                "Stretch factor must be a positive number, got {}",
                factor
            ));
        }
    }

    if cli.tool_timeout == 0 {
        return Err("Tool timeout must be at least 1 second".to_string());
    }

    Ok(())
}
