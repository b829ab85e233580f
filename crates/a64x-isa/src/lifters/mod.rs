//! Per-mnemonic lifters and the lift table.
//!
//! A lifter either returns a complete [`IlFragment`] for the instruction or
//! `None`. It never touches the caller's IL function, so a rejected
//! instruction leaves no trace behind and the caller is free to fall back.

mod bitfield;
mod conditional;
mod multiply;
mod rotate;

use a64x_il::{IlFragment, RegId};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::registers::RegisterCatalog;
use crate::types::{DecodedInstruction, Mnemonic, Operand};

pub use bitfield::{field_mask, lift_bfi, ones};
pub use conditional::{lift_cinc, lift_csinc};
pub use multiply::lift_umull;
pub use rotate::lift_ror;

/// Lifting routine for one mnemonic.
pub type LiftFn = fn(&DecodedInstruction, &dyn RegisterCatalog) -> Option<IlFragment>;

/// Outcome of looking up and running a lifter.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LiftAttempt {
    /// The lifter accepted the instruction.
    Lifted(IlFragment),
    /// A lifter exists but declined the instruction.
    Rejected,
    /// No lifter is registered for the mnemonic.
    Unsupported,
}

/// Lookup table from mnemonic to lifter.
#[derive(Clone)]
pub struct LiftTable {
    lifters: FxHashMap<Mnemonic, LiftFn>,
}

impl LiftTable {
    /// Create a table with every built-in lifter.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_lifter(Mnemonic::Csinc, lift_csinc)
            .with_lifter(Mnemonic::Umull, lift_umull)
            .with_lifter(Mnemonic::Cinc, lift_cinc)
            .with_lifter(Mnemonic::Bfi, lift_bfi)
            .with_lifter(Mnemonic::Ror, lift_ror)
    }

    /// Create an empty table (every instruction falls back).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lifters: FxHashMap::default(),
        }
    }

    /// Register or replace the lifter for a mnemonic.
    #[must_use]
    pub fn with_lifter(mut self, mnemonic: Mnemonic, lifter: LiftFn) -> Self {
        self.lifters.insert(mnemonic, lifter);
        self
    }

    #[must_use]
    pub fn get(&self, mnemonic: Mnemonic) -> Option<LiftFn> {
        self.lifters.get(&mnemonic).copied()
    }

    #[must_use]
    pub fn handles(&self, mnemonic: Mnemonic) -> bool {
        self.lifters.contains_key(&mnemonic)
    }

    /// Lift an instruction with the registered lifter, if any.
    #[must_use]
    pub fn lift(&self, instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> LiftAttempt {
        let Some(lifter) = self.get(instr.mnemonic) else {
            return LiftAttempt::Unsupported;
        };
        match lifter(instr, regs) {
            Some(fragment) => LiftAttempt::Lifted(fragment),
            None => {
                trace!(
                    addr = format_args!("{:#x}", instr.address),
                    mnemonic = %instr.mnemonic,
                    operands = instr.operands.len(),
                    "lifter declined instruction"
                );
                LiftAttempt::Rejected
            }
        }
    }
}

impl Default for LiftTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A register operand resolved through the catalog.
#[derive(Clone, Copy, Debug)]
struct Reg {
    id: RegId,
    size: u8,
}

/// Resolve a plain register operand to its id and width.
fn resolve(op: &Operand, regs: &dyn RegisterCatalog) -> Option<Reg> {
    let id = regs.register_by_name(op.register()?)?;
    let info = regs.register_info(id)?;
    Some(Reg { id, size: info.size })
}

/// Operands as a fixed-size array, if the count matches exactly.
fn operands<const N: usize>(instr: &DecodedInstruction) -> Option<&[Operand; N]> {
    instr.operands.as_slice().try_into().ok()
}
