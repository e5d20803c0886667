//! rootbeer - install packages from JSON recipes
//!
//! Usage:
//!   rootbeer <package> install      Install a package and its dependencies
//!   rootbeer <package> uninstall    Uninstall a package (not implemented yet)
//!   rootbeer <package> plan         Show the install order
//!   rootbeer <package> info         Show the resolved recipe

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rootbeer::core::{config::Config, context::FormatContext, logging, output};
use rootbeer::helpers::acquire::Pipeline;
use rootbeer::{InstallError, Installer, resolver};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rootbeer")]
#[command(about = "Cross-platform package installer driven by JSON recipes")]
#[command(version)]
struct Cli {
    /// Package name
    package: String,

    /// What to do with the package
    #[arg(value_enum)]
    action: Action,

    /// Recipe repository: an http(s) base URL or a local directory
    #[arg(long, env = "ROOTBEER_RECIPES")]
    recipes: Option<String>,

    /// Directory for the per-run log file
    #[arg(long, env = "ROOTBEER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Resolve and report, but do not download or run anything
    #[arg(long)]
    dry_run: bool,

    /// Debug-level console output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Action {
    /// Install the package and its dependencies
    Install,
    /// Uninstall the package
    Uninstall,
    /// Print the install order
    Plan,
    /// Print the resolved recipe as JSON
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&cli.package, &e);
            ExitCode::FAILURE
        }
    }
}

/// Settings from the environment, overridden by flags.
fn config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(recipes) = &cli.recipes {
        config.recipes = recipes.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    config.dry_run = cli.dry_run;
    config
}

fn run(cli: &Cli) -> Result<()> {
    let config = config(cli);

    let log_file = logging::init(&cli.package, &config.log_dir, cli.verbose)
        .with_context(|| format!("Failed to set up logging in {}", config.log_dir.display()))?;
    tracing::debug!("logging to {}", log_file.display());

    let source = resolver::source_for(&config.recipes, config.http_timeout);
    tracing::debug!("recipes from {}", source.location());

    let installer = Installer::new(source, FormatContext::detect())
        .pipeline(Pipeline::new(config.download_timeout))
        .dry_run(config.dry_run);

    match cli.action {
        Action::Install => {
            output::action(&format!("Installing {}", cli.package));
            installer.install_by_name(&cli.package)?;
            if config.dry_run {
                output::success(&format!("{} (dry run, nothing installed)", cli.package));
            } else {
                output::success(&format!("{} installed", cli.package));
            }
        }

        Action::Uninstall => {
            installer.uninstall(&cli.package)?;
            output::warning(&format!(
                "uninstall is not supported yet; {} was left in place",
                cli.package
            ));
        }

        Action::Plan => {
            let descriptor = installer
                .resolve(&cli.package)
                .map_err(|e| e.for_package(&cli.package))?;
            let plan = installer.plan(descriptor)?;

            output::action(&format!("Install order for {}", cli.package));
            let total = plan.len();
            for (i, package) in plan.iter().enumerate() {
                output::action_numbered(
                    i + 1,
                    total,
                    &format!("{} {} ({})", package.name, package.version, package.strategy),
                );
            }
        }

        Action::Info => {
            let descriptor = installer
                .resolve(&cli.package)
                .map_err(|e| e.for_package(&cli.package))?;
            println!("{}", descriptor.to_json());
        }
    }

    output::detail(&format!("log: {}", log_file.display()));
    Ok(())
}

/// Print the failing package, phase and the full error chain.
fn report(package: &str, err: &anyhow::Error) {
    match err.downcast_ref::<InstallError>() {
        Some(install) => {
            let failed = install.package().unwrap_or(package);
            output::error(&format!(
                "{} failed during {}: {:#}",
                failed,
                install.phase(),
                err
            ));
        }
        None => output::error(&format!("{}: {:#}", package, err)),
    }
}
