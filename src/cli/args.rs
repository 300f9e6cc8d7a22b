//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Token that selects standard input.
pub const STDIN: &str = "-";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    override_usage = "mongoose-docgen [OPTIONS] [filePath]"
)]
pub struct Arguments {
    /// Enable verbose output on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: nearest .docgenrc.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Schema source file, or `-` to read standard input
    #[arg(value_name = "PATH", allow_hyphen_values = true)]
    pub inputs: Vec<String>,
}

impl Arguments {
    /// The input path: the last token that is `-` or does not start with `-`.
    pub fn input(&self) -> Option<&str> {
        self.inputs
            .iter()
            .rev()
            .find(|token| *token == STDIN || !token.starts_with('-'))
            .map(String::as_str)
    }
}
