use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::{
    ExitStatus,
    args::{Arguments, STDIN},
};
use crate::config::{Config, default_config_json, load_config, load_config_file};
use crate::core::{
    diagnostics::Diagnostics, modules::ModuleIndex, render::render_document, resolve::Resolver,
};

pub const USAGE: &str = "Usage: mongoose-docgen [filePath]";

/// Main entry point for the CLI.
///
/// Reads the schema source from the selected file (or standard input), renders its
/// documentation and writes it to stdout.
///
/// # Returns
/// - `Ok(ExitStatus::Success)` after printing the document
/// - `Ok(ExitStatus::Failure)` after printing usage, when no readable input was given
/// - `Err` when the source cannot be documented
pub fn run(args: Arguments) -> Result<ExitStatus> {
    if args.print_config {
        println!("{}", default_config_json()?);
        return Ok(ExitStatus::Success);
    }

    let diagnostics = Diagnostics::new(args.verbose);
    let Some((code, path)) = read_input(&args)? else {
        eprintln!("{}", USAGE);
        return Ok(ExitStatus::Failure);
    };

    let config_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => env::current_dir().context("Failed to read the current directory")?,
    };
    let config = resolve_config(args.config.as_deref(), &config_dir, &diagnostics)?;

    let index = ModuleIndex::from_source(code, &path, &diagnostics)?;
    diagnostics.info(format!("{} module(s) indexed", index.len()));
    let resolver = Resolver::new(&index, &config, &diagnostics);
    let document = render_document(&resolver)?;
    print!("{}", document);

    Ok(ExitStatus::Success)
}

/// Source text and path of the input, `None` when there is nothing to read.
fn read_input(args: &Arguments) -> Result<Option<(String, PathBuf)>> {
    let Some(input) = args.input() else {
        return Ok(None);
    };

    if input == STDIN {
        let mut code = String::new();
        io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read standard input")?;
        return Ok(Some((code, PathBuf::from(STDIN))));
    }

    let path = PathBuf::from(input);
    if !path.is_file() {
        return Ok(None);
    }
    let code =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some((code, path)))
}

fn resolve_config(
    explicit: Option<&Path>,
    start_dir: &Path,
    diagnostics: &Diagnostics,
) -> Result<Config> {
    if let Some(path) = explicit {
        diagnostics.info(format!("using config {}", path.display()));
        return load_config_file(path);
    }

    let loaded = load_config(start_dir)?;
    match &loaded.path {
        Some(path) => diagnostics.info(format!("using config {}", path.display())),
        None => diagnostics.info("no config file found, using defaults"),
    }
    Ok(loaded.config)
}
