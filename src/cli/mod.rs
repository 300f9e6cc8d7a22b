//! Command-line layer: argument parsing, input selection and exit statuses.

mod args;
mod exit_status;
mod run;

pub use args::Arguments;
pub use exit_status::ExitStatus;
pub use run::run;
