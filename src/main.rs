use anyhow::Result;
use clap::Parser;
use covguard::cli::{CheckOpts, Cli, Commands};
use covguard::commands::{check, packages};
use covguard::config::CoverageConfig;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("covguard: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Single { path, opts } => check::check_single(&build_check(path, opts)?),
        Commands::Tree { path, opts } => check::check_tree(&build_check(path, opts)?),
        Commands::Packages { path, skip } => {
            let config = CoverageConfig::resolve(None, None, skip, None)?;
            packages::print_packages(&path, &config)?;
            Ok(true)
        }
    }
}

fn build_check(path: PathBuf, opts: CheckOpts) -> Result<check::CheckConfig> {
    let config = CoverageConfig::resolve(
        opts.config.as_deref(),
        opts.min_coverage,
        opts.skip,
        opts.zero_policy.map(Into::into),
    )?;
    Ok(check::CheckConfig {
        path,
        config,
        format: opts.format,
    })
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
