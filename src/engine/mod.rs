//! Analytics engine capabilities.
//!
//! The launcher only ever talks to an engine through two traits:
//! - [`ConfigLoader`] turns a file path into a configuration object.
//! - [`ApplicationFactory`] turns that configuration into an application.
//!
//! [`OreEngine`] is the built-in implementation: ORE parameter files in,
//! [`Application`] out.

pub mod app;
pub mod inputs;
pub mod parameters;
pub mod values;

use std::path::Path;

use tracing::debug;

use crate::error::{ConstructionError, LoadError};

pub use app::Application;
pub use inputs::{Analytic, InputParameters};
pub use parameters::Parameters;

/// Capability A: load a configuration from a file.
pub trait ConfigLoader {
    type Config;

    fn load(&self, path: &Path) -> Result<Self::Config, LoadError>;
}

/// Capability B: construct an application from a loaded configuration.
pub trait ApplicationFactory<C> {
    type Application;

    fn construct(&self, config: C) -> Result<Self::Application, ConstructionError>;
}

/// Built-in engine backed by [`Parameters`] and [`Application`].
#[derive(Debug, Clone, Copy)]
pub struct OreEngine {
    _private: (),
}

impl OreEngine {
    /// Obtain the engine. Call once, after the global logger is in place, so
    /// every later engine message has somewhere to go.
    pub fn initialize() -> Self {
        debug!(engine = "ore", "engine initialised");
        Self { _private: () }
    }
}

impl ConfigLoader for OreEngine {
    type Config = Parameters;

    fn load(&self, path: &Path) -> Result<Parameters, LoadError> {
        Parameters::from_file(path)
    }
}

impl ApplicationFactory<Parameters> for OreEngine {
    type Application = Application;

    fn construct(&self, config: Parameters) -> Result<Application, ConstructionError> {
        Application::new(config)
    }
}
