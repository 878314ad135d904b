use std::process::ExitCode;

use clap::Parser as _;
use log::LevelFilter;
use starling_cli::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // `RUST_LOG` still wins over `-v`.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match starling_cli::run(cli, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
