//! a64x - AArch64 lifting extensions
//!
//! Hooks an AArch64 architecture so that a handful of instructions
//! (`csinc`, `cinc`, `umull`, `bfi`, `ror`) are lifted by this crate and
//! everything else is left to the base lifter.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use a64x::{ArchitectureRegistry, GenericAarch64, plugin_init};
//!
//! let registry = ArchitectureRegistry::new();
//! registry.register(Arc::new(GenericAarch64::new()));
//! plugin_init(&registry)?;
//! # Ok::<(), a64x::PluginError>(())
//! ```

mod error;
mod generic;
mod hook;
pub mod metrics;
mod plugin;
mod region;

pub use a64x_il as il;
pub use a64x_isa as isa;

pub use error::{PluginError, Result};
pub use generic::{GenericAarch64, INSTRUCTION_SIZE};
pub use hook::{Aarch64Extension, BaseArchitecture, LiftOutcome};
pub use plugin::{ArchitectureRegistry, BASE_ARCHITECTURE, plugin_dependencies, plugin_init};
pub use region::{LiftedInstruction, lift_region, lift_region_with_jobs};
