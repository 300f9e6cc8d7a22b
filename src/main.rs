use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use mongoose_docgen::cli::{Arguments, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();

    match mongoose_docgen::cli::run(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {:#}", "error:".bold().red(), err);
            ExitStatus::Error.into()
        }
    }
}
