use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use cardpress::cli::{Cli, Commands};
use cardpress::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => cardpress::cli::build::run(args, &printer)?,
        Commands::Validate(args) => cardpress::cli::validate::run(args, &printer)?,
        Commands::Completions(args) => cardpress::cli::completions::run(args)?,
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cardpress={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
