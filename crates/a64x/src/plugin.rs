//! Activation: dependency declaration, architecture registry, bootstrap.

use std::sync::Arc;

use a64x_isa::{DecodeError, ensure_engine};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{error, info};

use crate::error::{PluginError, Result};
use crate::hook::{Aarch64Extension, BaseArchitecture};

/// Name of the architecture the extension hooks.
pub const BASE_ARCHITECTURE: &str = "aarch64";

const DEPENDENCIES: &[&str] = &["arch_arm64"];

/// Plugins that must be loaded before this one.
#[must_use]
pub const fn plugin_dependencies() -> &'static [&'static str] {
    DEPENDENCIES
}

/// Architectures by name.
#[derive(Default)]
pub struct ArchitectureRegistry {
    archs: RwLock<FxHashMap<String, Arc<dyn BaseArchitecture>>>,
}

impl ArchitectureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn BaseArchitecture>> {
        self.archs.read().get(name).cloned()
    }

    /// Register an architecture under its own name, returning any
    /// architecture it replaced.
    pub fn register(&self, arch: Arc<dyn BaseArchitecture>) -> Option<Arc<dyn BaseArchitecture>> {
        let name = arch.name().to_string();
        self.archs.write().insert(name, arch)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.archs.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Hook the `aarch64` architecture in `registry`.
///
/// # Errors
///
/// Fails if the decoding engine cannot be built on this thread or if no
/// `aarch64` architecture is registered. The registry is left untouched.
pub fn plugin_init(registry: &ArchitectureRegistry) -> Result<()> {
    init_with(registry, ensure_engine)
}

fn init_with(
    registry: &ArchitectureRegistry,
    engine: impl FnOnce() -> std::result::Result<(), DecodeError>,
) -> Result<()> {
    match activate(registry, engine) {
        Ok(()) => {
            info!(arch = BASE_ARCHITECTURE, "AArch64 lifting extensions loaded");
            Ok(())
        }
        Err(err) => {
            error!(%err, "failed to load AArch64 lifting extensions");
            Err(err)
        }
    }
}

fn activate(
    registry: &ArchitectureRegistry,
    engine: impl FnOnce() -> std::result::Result<(), DecodeError>,
) -> Result<()> {
    engine()?;
    let base = registry
        .get_by_name(BASE_ARCHITECTURE)
        .ok_or_else(|| PluginError::BaseArchitectureMissing(BASE_ARCHITECTURE.to_string()))?;
    registry.register(Arc::new(Aarch64Extension::new(base)));
    Ok(())
}
