//! Dispatch point: decide per instruction whether to lift or fall back.

use std::sync::Arc;

use a64x_il::{LowLevelILFunction, RegId, RegisterInfo};
use a64x_isa::{LiftAttempt, LiftTable, RegisterCatalog, decode};
use tracing::{debug, trace};

use crate::metrics::{self, LiftResult};

/// Result of lifting one instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LiftOutcome {
    /// Bytes consumed (0 when nothing could be decoded).
    pub length: usize,
    /// Whether any IL was emitted.
    pub lifted: bool,
}

impl LiftOutcome {
    #[must_use]
    pub const fn new(length: usize, lifted: bool) -> Self {
        Self { length, lifted }
    }
}

/// An architecture as seen by the host.
///
/// Every architecture doubles as the register catalog the lifters resolve
/// operand names against.
pub trait BaseArchitecture: RegisterCatalog {
    fn name(&self) -> &str;

    /// Lift the instruction at the start of `data` into `il`.
    fn instruction_llil(&self, data: &[u8], addr: u64, il: &mut LowLevelILFunction)
    -> LiftOutcome;
}

/// Lifting extension layered over a base AArch64 architecture.
///
/// Instructions with a registered lifter are lifted here. Everything else,
/// including anything a lifter declines, goes to the base unchanged.
pub struct Aarch64Extension {
    base: Arc<dyn BaseArchitecture>,
    table: LiftTable,
}

impl Aarch64Extension {
    /// Wrap `base` with the standard lift table.
    #[must_use]
    pub fn new(base: Arc<dyn BaseArchitecture>) -> Self {
        Self::with_table(base, LiftTable::standard())
    }

    #[must_use]
    pub fn with_table(base: Arc<dyn BaseArchitecture>, table: LiftTable) -> Self {
        Self { base, table }
    }

    fn fallback(&self, data: &[u8], addr: u64, il: &mut LowLevelILFunction) -> LiftOutcome {
        self.base.instruction_llil(data, addr, il)
    }
}

/// Register catalog view of a base architecture.
struct BaseRegisters<'a>(&'a dyn BaseArchitecture);

impl RegisterCatalog for BaseRegisters<'_> {
    fn register_by_name(&self, name: &str) -> Option<RegId> {
        self.0.register_by_name(name)
    }

    fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
        self.0.register_info(reg)
    }
}

impl RegisterCatalog for Aarch64Extension {
    fn register_by_name(&self, name: &str) -> Option<RegId> {
        self.base.register_by_name(name)
    }

    fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
        self.base.register_info(reg)
    }
}

impl BaseArchitecture for Aarch64Extension {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn instruction_llil(
        &self,
        data: &[u8],
        addr: u64,
        il: &mut LowLevelILFunction,
    ) -> LiftOutcome {
        let instr = match decode(data, addr) {
            Ok(Some(instr)) => instr,
            Ok(None) => {
                trace!(addr = format_args!("{addr:#x}"), "no decode, deferring to base");
                metrics::record_lift(None, LiftResult::Undecoded);
                return self.fallback(data, addr, il);
            }
            Err(err) => {
                debug!(addr = format_args!("{addr:#x}"), %err, "engine unavailable, deferring to base");
                metrics::record_lift(None, LiftResult::Undecoded);
                return self.fallback(data, addr, il);
            }
        };

        let length = instr.size;
        let regs = BaseRegisters(self.base.as_ref());
        let result = match self.table.lift(&instr, &regs) {
            LiftAttempt::Lifted(fragment) => {
                trace!(
                    addr = format_args!("{addr:#x}"),
                    mnemonic = %instr.mnemonic,
                    il_len = fragment.len(),
                    "lifted"
                );
                metrics::record_fragment(instr.mnemonic, fragment.len());
                metrics::record_lift(Some(instr.mnemonic), LiftResult::Lifted);
                il.append(fragment);
                return LiftOutcome::new(length, true);
            }
            LiftAttempt::Rejected => LiftResult::Rejected,
            LiftAttempt::Unsupported => LiftResult::Unsupported,
        };

        trace!(
            addr = format_args!("{addr:#x}"),
            mnemonic = %instr.mnemonic,
            outcome = result.as_str(),
            "deferring to base"
        );
        metrics::record_lift(Some(instr.mnemonic), result);
        let consumed = data.get(..length).unwrap_or(data);
        let base = self.fallback(consumed, addr, il);
        LiftOutcome::new(length, base.lifted)
    }
}
