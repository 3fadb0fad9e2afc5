//! The analytics application object.
//!
//! Construction sequence:
//!   1. Resolve `outputPath`, `logFile` and `logMask` from the setup group
//!   2. Create the output directory if needed
//!   3. Open the run log and make it this thread's log sink
//!   4. Log the parameters
//!   5. Build the input parameters
//!
//! Dropping the application closes the run log.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use tracing::subscriber::DefaultGuard;
use tracing::{debug, info};

use super::inputs::{Analytic, InputParameters};
use super::parameters::{Parameters, SETUP};
use super::values::parse_integer;
use crate::error::ConstructionError;
use crate::logger::{self, DEFAULT_LOG_MASK};
use crate::settings::expand_home;

pub struct Application {
    params: Parameters,
    inputs: InputParameters,
    log_file: PathBuf,
    created: Instant,
    // Must stay the last field: fields drop in declaration order.
    _run_log: DefaultGuard,
}

impl Application {
    pub fn new(params: Parameters) -> Result<Self, ConstructionError> {
        let output_path = expand_home(params.get(SETUP, "outputPath")?);
        let log_file = output_path.join(params.get(SETUP, "logFile")?);
        let log_mask = log_mask(&params)?;

        prepare_output_path(&output_path)?;

        let run_log = logger::scoped_file(&log_file, logger::level_from_mask(log_mask))
            .map_err(|source| ConstructionError::LogFile { path: log_file.clone(), source })?;

        info!(log_file = %log_file.display(), log_mask, "run log opened");
        params.log();

        let inputs = InputParameters::from_parameters(&params)?;
        info!(analytics = ?inputs.analytics, "application constructed");

        Ok(Self { params, inputs, log_file, created: Instant::now(), _run_log: run_log })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn inputs(&self) -> &InputParameters {
        &self.inputs
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn requested_analytics(&self) -> &[Analytic] {
        &self.inputs.analytics
    }

    pub fn uptime(&self) -> Duration {
        self.created.elapsed()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        debug!(uptime = ?self.uptime(), "closing run log");
    }
}

fn log_mask(params: &Parameters) -> Result<u32, ConstructionError> {
    let Some(raw) = params.get_opt(SETUP, "logMask") else {
        return Ok(DEFAULT_LOG_MASK);
    };
    parse_integer(raw)
        .and_then(|m| u32::try_from(m).map_err(|_| format!("log mask out of range: {m}")))
        .map_err(|reason| ConstructionError::invalid(SETUP, "logMask", raw, reason))
}

fn prepare_output_path(path: &Path) -> Result<(), ConstructionError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|source| ConstructionError::OutputPath { path: path.to_path_buf(), source })?;
    }
    if !path.is_dir() {
        return Err(ConstructionError::NotADirectory { path: path.to_path_buf() });
    }
    Ok(())
}
