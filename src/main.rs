use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use img_diff::{
    absolutize, default_config_path, exit_code, format_file_size, resolve, BatchProcessor, BatchReport, Cli,
    PartialConfig,
};
use log::LevelFilter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let outcome = run(&cli);
    match &outcome {
        Ok(report) if report.has_failures() => {
            eprintln!("{} of {} images failed:", report.failures.len(), report.discovered);
            for failure in &report.failures {
                eprintln!("  {}: {}", failure.path.display(), failure.message);
            }
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}", Cli::command().render_help());
            eprintln!("Error: {:#}", e);
        }
    }

    ExitCode::from(exit_code(&outcome))
}

fn run(cli: &Cli) -> Result<BatchReport> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let input = absolutize(&cwd, &cli.input);
    let output = absolutize(&cwd, &cli.output);

    let config_path = match &cli.config {
        Some(path) => absolutize(&cwd, path),
        None => default_config_path()?,
    };

    let config = resolve(PartialConfig::defaults(), &config_path, cli.overrides())
        .with_context(|| format!("Invalid configuration (config file: {})", config_path.display()))?
        .with_omitted(cli.omit.iter().cloned());
    log::debug!("Resolved configuration: {:?}", config);

    let processor = BatchProcessor::new(config, cli.threads)?.with_progress(!cli.quiet);
    let report = processor.process_directory(&input, &output, cli.recursive)?;

    println!(
        "Processed {} of {} images into {} ({} -> {})",
        report.processed,
        report.discovered,
        output.display(),
        format_file_size(report.total_size_before),
        format_file_size(report.total_size_after)
    );
    if report.walk_errors > 0 {
        println!("{} entries could not be read and were skipped", report.walk_errors);
    }

    Ok(report)
}
