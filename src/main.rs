use clap::Parser;
use tickertrend::cli::{Cli, run};
use tickertrend::logging::init_tracing;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}
