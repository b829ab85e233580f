//! Stand-in base architecture for use without a host.

use a64x_il::{Instr, LowLevelILFunction, RegId, RegisterInfo};
use a64x_isa::{Aarch64Registers, RegisterCatalog};

use crate::hook::{BaseArchitecture, LiftOutcome};

/// Fixed AArch64 instruction width.
pub const INSTRUCTION_SIZE: usize = 4;

/// Minimal AArch64 base: knows the register file and instruction width,
/// and lifts every instruction to `unimplemented`.
#[derive(Default)]
pub struct GenericAarch64 {
    regs: Aarch64Registers,
}

impl GenericAarch64 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegisterCatalog for GenericAarch64 {
    fn register_by_name(&self, name: &str) -> Option<RegId> {
        self.regs.register_by_name(name)
    }

    fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
        self.regs.register_info(reg)
    }
}

impl BaseArchitecture for GenericAarch64 {
    fn name(&self) -> &str {
        crate::plugin::BASE_ARCHITECTURE
    }

    fn instruction_llil(
        &self,
        data: &[u8],
        _addr: u64,
        il: &mut LowLevelILFunction,
    ) -> LiftOutcome {
        if data.len() < INSTRUCTION_SIZE {
            return LiftOutcome::default();
        }
        il.add_instruction(Instr::Unimplemented);
        LiftOutcome::new(INSTRUCTION_SIZE, true)
    }
}
