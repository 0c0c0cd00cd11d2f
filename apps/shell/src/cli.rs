use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Tally command line tools")]
pub(crate) struct Cli {
    /// Log level for diagnostics written to the console.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Inspect Tailwind configuration documents.
    #[command(subcommand)]
    Tailwind(TailwindCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum TailwindCommand {
    /// Load and validate each document; fails if any of them is broken.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a document in canonical form.
    Show {
        path: PathBuf,
        /// Print JSON instead of a JavaScript module.
        #[arg(long)]
        json: bool,
    },
    /// List the files the document's `content` globs select.
    Files { path: PathBuf },
    /// List field-level differences between two documents.
    Diff { left: PathBuf, right: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_needs_a_path() {
        assert!(Cli::try_parse_from(["tally", "tailwind", "check"]).is_err());

        let cli = Cli::try_parse_from(["tally", "tailwind", "check", "a.js", "b.json"]).unwrap();
        let Command::Tailwind(TailwindCommand::Check { paths }) = cli.command else {
            panic!("parsed the wrong command");
        };
        assert_eq!(paths, [PathBuf::from("a.js"), PathBuf::from("b.json")]);
    }

    #[test]
    fn show_takes_a_json_flag() {
        let cli = Cli::try_parse_from(["tally", "tailwind", "show", "--json", "a.js"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Tailwind(TailwindCommand::Show { json: true, .. })
        ));
        assert_eq!(cli.log_level, "warn");
    }
}
