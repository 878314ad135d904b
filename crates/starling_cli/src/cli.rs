use std::num::NonZeroUsize;

use clap::{Parser, Subcommand, ValueEnum};
use starling_diagnostic::termcolor::ColorChoice;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// When to colour diagnostics.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Log more. Repeat for more detail (`-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the tokens of a file.
    Lex {
        /// The input file.
        input: String,

        /// Whether the given input should be used directly as the source instead
        /// of as the source file path.
        #[clap(long, short, action)]
        source: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Debug)]
        format: OutputFormat,
    },

    /// Parse files and print their syntax trees.
    Parse {
        /// The input files.
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Whether the given inputs should be used directly as the source instead
        /// of as source file paths.
        #[clap(long, short, action)]
        source: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Debug)]
        format: OutputFormat,

        #[command(flatten)]
        options: ParseOptions,
    },

    /// Parse files and only report errors.
    Check {
        /// The input files.
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Whether the given inputs should be used directly as the source instead
        /// of as source file paths.
        #[clap(long, short, action)]
        source: bool,

        #[command(flatten)]
        options: ParseOptions,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Stop parsing a file after this many errors.
    #[arg(long, default_value_t = 100)]
    pub max_errors: usize,

    /// Maximum expression, pattern and type nesting.
    #[arg(long, default_value_t = 128)]
    pub max_nesting: usize,

    /// Number of files to parse in parallel. Defaults to the number of CPUs.
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Debug,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, ColorMode, Command, OutputFormat};

    #[test]
    fn verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_args() {
        let cli = Cli::parse_from([
            "starling", "parse", "a.st", "b.st", "--format", "json", "--max-errors", "3", "-j",
            "2", "--color", "never", "-vv",
        ]);

        assert_eq!(cli.color, ColorMode::Never);
        assert_eq!(cli.verbose, 2);

        let Command::Parse {
            inputs,
            source,
            format,
            options,
        } = cli.command
        else {
            panic!("expected parse command");
        };

        assert_eq!(inputs, ["a.st", "b.st"]);
        assert!(!source);
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(options.max_errors, 3);
        assert_eq!(options.max_nesting, 128);
        assert_eq!(options.jobs.map(usize::from), Some(2));
    }

    #[test]
    fn parse_requires_input() {
        assert!(Cli::try_parse_from(["starling", "parse"]).is_err());
    }
}
