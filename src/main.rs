//! ORE launcher: entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Check arguments; print usage when there is no config path
//!   3. Resolve settings and init logger
//!   4. Initialise the engine
//!   5. Load parameters, construct the application, report

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use ore_launcher::launcher;

fn main() -> ExitCode {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let mut stdout = io::stdout().lock();

    launcher::execute(&args, launcher::initialize, &mut stdout).exit_code()
}
