//! DocPolish - Developer workflow tooling
//!
//! A pre-commit markdown fixer backed by an AI assistant, plus version
//! bump and release automation.

use anyhow::Result;
use docpolish::cli::{bump, check_markdown, config, hello, hooks, Cli, Commands};
use docpolish::version::SystemRunner;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; diagnostics go to stderr so stdout stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Get project path
    let path = Path::new(&cli.path);

    // Execute command
    match cli.command {
        Commands::CheckMarkdown(args) => {
            // Tasks interleave on one thread; no parallelism is needed
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let disposition = runtime.block_on(check_markdown(path, &args))?;
            return Ok(ExitCode::from(disposition.exit_code()));
        }

        Commands::Bump(args) => {
            bump(path, &args, &SystemRunner)?;
        }

        Commands::Hello => {
            hello();
        }

        Commands::Hooks(args) => {
            hooks(path, args.install, args.uninstall)?;
        }

        Commands::Config(args) => {
            config(path, args.init, args.force)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
