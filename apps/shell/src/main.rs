mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use std::io::{self, Write};
use std::process::ExitCode;
use tally_logger::Logger;

#[tally_runtime::main(tool)]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _logger =
        Logger::builder().name(env!("CARGO_PKG_NAME")).level_name(&cli.log_level).init()?;

    let mut stdout = io::stdout().lock();
    let ok = match cli.command {
        Command::Tailwind(command) => commands::run(command, &mut stdout)?,
    };
    stdout.flush()?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
