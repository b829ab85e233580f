//! AArch64 instruction decoding and lifting.
//!
//! This crate turns raw AArch64 machine code into decoded instructions (via
//! the capstone engine) and lifts a fixed set of mnemonics into `a64x-il`.
//! Everything outside that set is left to the host's own lifter.

mod condition;
mod decode;
pub mod lifters;
mod registers;
mod types;

pub use condition::*;
pub use decode::*;
pub use lifters::{LiftAttempt, LiftFn, LiftTable};
pub use registers::*;
pub use types::*;
