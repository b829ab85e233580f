//! Low-level IL for the AArch64 lifting extensions.
//!
//! This crate provides pure IL types with no AArch64-specific knowledge.
//! Instruction decoding and lifting are implemented in `a64x-isa`.

mod builder;
mod eval;
mod expr;
mod flags;
mod function;
mod instr;
mod reg;

pub use builder::*;
pub use eval::*;
pub use expr::*;
pub use flags::*;
pub use function::*;
pub use instr::*;
pub use reg::*;
