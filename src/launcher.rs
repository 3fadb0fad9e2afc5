//! Launcher: argument handling, progress output and the top-level error
//! boundary.
//!
//! Sequence:
//!   1. No arguments (or `-h`/`--help`) → usage, exit 0
//!   2. Initialise the engine (settings, logger)
//!   3. Load parameters from the first argument
//!   4. Construct the application
//!
//! Any failure in 2–4 is reported on the console and exits 1.

use std::{
    error::Error,
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use tracing::{error, info};

use crate::engine::{ApplicationFactory, ConfigLoader, OreEngine};
use crate::error::AppError;
use crate::{logger, settings};

pub const USAGE: &str = "usage: ore-launcher <path-to-ore.xml>";

/// What the command line asks for. Only the first argument is consulted;
/// arguments need not be valid Unicode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Usage,
    Launch(PathBuf),
}

/// How a launcher run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Usage,
    Completed,
    Failed,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::Usage | Outcome::Completed => 0,
            Outcome::Failed => 1,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

pub fn parse_args(args: &[OsString]) -> Command {
    let Some(first) = args.first() else {
        return Command::Usage;
    };
    match first.to_str() {
        Some("-h") | Some("--help") => Command::Usage,
        _ => Command::Launch(PathBuf::from(first)),
    }
}

/// Resolve launcher settings, install the global logger and hand out the
/// built-in engine.
pub fn initialize() -> Result<OreEngine, AppError> {
    let settings = settings::load()?;
    logger::init(&settings.log_level, settings.log_file.as_deref())?;
    info!(log_level = %settings.log_level, "launcher initialised");
    Ok(OreEngine::initialize())
}

/// Run the launcher end to end: usage check, engine initialisation, load,
/// construct. Never panics on engine failure; the result is the outcome.
pub fn execute<E, I, W>(args: &[OsString], init: I, out: &mut W) -> Outcome
where
    E: ConfigLoader + ApplicationFactory<<E as ConfigLoader>::Config>,
    I: FnOnce() -> Result<E, AppError>,
    W: Write,
{
    let path = match parse_args(args) {
        Command::Usage => {
            let _ = writeln!(out, "{USAGE}");
            return Outcome::Usage;
        }
        Command::Launch(path) => path,
    };

    let result = init().and_then(|engine| launch(&path, &engine, &engine, out));
    match result {
        Ok(()) => Outcome::Completed,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "launch failed");
            report(&e, out);
            Outcome::Failed
        }
    }
}

/// Load the configuration at `path` and construct the application from it,
/// printing a progress line before each step and a completion line after.
pub fn launch<L, F, W>(path: &Path, loader: &L, factory: &F, out: &mut W) -> Result<(), AppError>
where
    L: ConfigLoader,
    F: ApplicationFactory<L::Config>,
    W: Write,
{
    writeln!(out, "Creating parameters")?;
    writeln!(out, "Loading parameters from {}", path.display())?;
    let config = loader.load(path)?;
    info!(path = %path.display(), "parameters loaded");

    writeln!(out, "Creating application")?;
    let _app = factory.construct(config)?;
    writeln!(out, "Application created")?;
    out.flush()?;
    Ok(())
}

/// Print the failure message, its source chain and its kind.
pub fn report<W: Write>(err: &AppError, out: &mut W) {
    let _ = writeln!(out, "error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(out, "caused by: {cause}");
        source = cause.source();
    }
    let _ = writeln!(out, "kind: {}", err.kind());
    let _ = out.flush();
}
