// ABOUTME: Entry point for vshell — a toy shell over an extracted tar archive.
// ABOUTME: Parses CLI args, loads config, and runs the app, mapping failures to exit status 1.

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use vshell::app::App;
use vshell::cli::Cli;
use vshell::config::Config;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    vshell::init_logging();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let result = config.and_then(|config| App::new(config, cli).run());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
