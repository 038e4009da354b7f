mod aggregator;
mod cli;
mod coerce;
mod columns;
mod diagnostics;
mod error;
mod fmt;
mod loader;
mod logging;
mod matcher;
mod models;
mod normalize;
mod pager;
mod pipeline;
mod settings;
mod writer;

use clap::Parser;

use cli::report::ReportOptions;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Totals {
            input,
            output,
            no_pager,
        } => cli::totals::run(input, output, no_pager),
        Commands::Report {
            input,
            matching,
            output_dir,
            placeholders,
            detailed,
            no_write,
        } => cli::report::run(
            input,
            matching,
            ReportOptions {
                output_dir,
                placeholders,
                detailed,
                no_write,
            },
        ),
        Commands::Diagnose {
            input,
            initiatives,
            samples,
        } => cli::diagnose::run(input, initiatives, samples),
        Commands::Config { command } => cli::config::dispatch(command),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
