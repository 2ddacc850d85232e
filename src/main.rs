use clap::Parser;
use pullback::cli::{run, Cli};
use pullback::logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli)
}
