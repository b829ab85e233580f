//! Decoder adapter over the capstone engine.
//!
//! A capstone handle carries mutable scratch state and must never be shared
//! between threads. [`decode`] therefore goes through a per-thread engine,
//! opened lazily on the first call from each thread and closed when that
//! thread exits.

use capstone::arch::arm64::{
    ArchMode, Arm64CC, Arm64Extender, Arm64Insn, Arm64Operand, Arm64OperandType, Arm64Shift,
};
use capstone::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    ConditionCode, DecodedInstruction, ExtendKind, Mnemonic, Operand, ShiftExtend, ShiftKind,
};

/// Decoder errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to create AArch64 disassembler engine: {0}")]
    EngineUnavailable(String),
}

/// AArch64 decoding engine with per-operand detail enabled.
pub struct Disassembler {
    cs: Capstone,
}

impl Disassembler {
    /// Open a new engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineUnavailable` when capstone cannot be initialized.
    pub fn new() -> Result<Self, DecodeError> {
        let cs = Capstone::new()
            .arm64()
            .mode(ArchMode::Arm)
            .detail(true)
            .build()
            .map_err(|e| DecodeError::EngineUnavailable(e.to_string()))?;
        debug!("opened AArch64 decoding engine");
        Ok(Self { cs })
    }

    /// Decode the first instruction in `bytes`.
    ///
    /// Returns `None` when the bytes do not form a valid instruction.
    #[must_use]
    pub fn decode(&self, bytes: &[u8], address: u64) -> Option<DecodedInstruction> {
        let insns = self.cs.disasm_count(bytes, address, 1).ok()?;
        let insn = insns.iter().next()?;
        let detail = self.cs.insn_detail(&insn).ok()?;
        let arch_detail = detail.arch_detail();
        let arm64 = arch_detail.arm64()?;

        let operands = arm64.operands().map(|op| self.convert_operand(&op)).collect();

        Some(DecodedInstruction {
            mnemonic: mnemonic(insn.id().0),
            address: insn.address(),
            size: insn.bytes().len(),
            operands,
            cc: condition(arm64.cc()),
        })
    }

    fn convert_operand(&self, op: &Arm64Operand) -> Operand {
        match &op.op_type {
            Arm64OperandType::Reg(reg) => {
                let Some(name) = self.cs.reg_name(*reg) else {
                    return Operand::Other;
                };
                match shift_extend(op) {
                    Some(shift) => Operand::ShiftExtend { reg: name, shift },
                    None => Operand::Register(name),
                }
            }
            Arm64OperandType::Imm(value) => Operand::Immediate(*value),
            _ => Operand::Other,
        }
    }
}

thread_local! {
    static DISASSEMBLER: Result<Disassembler, DecodeError> = Disassembler::new();
}

/// Decode one instruction with the calling thread's private engine.
///
/// `Ok(None)` means the bytes did not decode.
///
/// # Errors
///
/// Returns `EngineUnavailable` if this thread's engine could not be opened.
pub fn decode(bytes: &[u8], address: u64) -> Result<Option<DecodedInstruction>, DecodeError> {
    DISASSEMBLER.with(|engine| match engine {
        Ok(disassembler) => Ok(disassembler.decode(bytes, address)),
        Err(e) => Err(e.clone()),
    })
}

/// Check that the calling thread's engine is usable, opening it if needed.
///
/// # Errors
///
/// Returns `EngineUnavailable` if the engine could not be opened.
pub fn ensure_engine() -> Result<(), DecodeError> {
    DISASSEMBLER.with(|engine| engine.as_ref().map(|_| ()).map_err(Clone::clone))
}

const INS_CSINC: u32 = Arm64Insn::ARM64_INS_CSINC as u32;
const INS_UMULL: u32 = Arm64Insn::ARM64_INS_UMULL as u32;
const INS_CINC: u32 = Arm64Insn::ARM64_INS_CINC as u32;
const INS_BFI: u32 = Arm64Insn::ARM64_INS_BFI as u32;
const INS_ROR: u32 = Arm64Insn::ARM64_INS_ROR as u32;

const fn mnemonic(id: u32) -> Mnemonic {
    match id {
        INS_CSINC => Mnemonic::Csinc,
        INS_UMULL => Mnemonic::Umull,
        INS_CINC => Mnemonic::Cinc,
        INS_BFI => Mnemonic::Bfi,
        INS_ROR => Mnemonic::Ror,
        other => Mnemonic::Other(other),
    }
}

#[allow(unreachable_patterns)]
const fn condition(cc: Arm64CC) -> ConditionCode {
    match cc {
        Arm64CC::ARM64_CC_EQ => ConditionCode::Eq,
        Arm64CC::ARM64_CC_NE => ConditionCode::Ne,
        Arm64CC::ARM64_CC_HS => ConditionCode::Hs,
        Arm64CC::ARM64_CC_LO => ConditionCode::Lo,
        Arm64CC::ARM64_CC_MI => ConditionCode::Mi,
        Arm64CC::ARM64_CC_PL => ConditionCode::Pl,
        Arm64CC::ARM64_CC_VS => ConditionCode::Vs,
        Arm64CC::ARM64_CC_VC => ConditionCode::Vc,
        Arm64CC::ARM64_CC_HI => ConditionCode::Hi,
        Arm64CC::ARM64_CC_LS => ConditionCode::Ls,
        Arm64CC::ARM64_CC_GE => ConditionCode::Ge,
        Arm64CC::ARM64_CC_LT => ConditionCode::Lt,
        Arm64CC::ARM64_CC_GT => ConditionCode::Gt,
        Arm64CC::ARM64_CC_LE => ConditionCode::Le,
        Arm64CC::ARM64_CC_AL => ConditionCode::Al,
        Arm64CC::ARM64_CC_NV => ConditionCode::Nv,
        _ => ConditionCode::Invalid,
    }
}

#[allow(unreachable_patterns)]
fn shift_extend(op: &Arm64Operand) -> Option<ShiftExtend> {
    let shift = |kind, amount| Some(ShiftExtend::Shift { kind, amount });
    match op.shift {
        Arm64Shift::Lsl(amount) => return shift(ShiftKind::Lsl, amount),
        Arm64Shift::Lsr(amount) => return shift(ShiftKind::Lsr, amount),
        Arm64Shift::Asr(amount) => return shift(ShiftKind::Asr, amount),
        Arm64Shift::Ror(amount) => return shift(ShiftKind::Ror, amount),
        Arm64Shift::Msl(amount) => return shift(ShiftKind::Msl, amount),
        _ => {}
    }
    let kind = match op.ext {
        Arm64Extender::ARM64_EXT_UXTB => ExtendKind::Uxtb,
        Arm64Extender::ARM64_EXT_UXTH => ExtendKind::Uxth,
        Arm64Extender::ARM64_EXT_UXTW => ExtendKind::Uxtw,
        Arm64Extender::ARM64_EXT_UXTX => ExtendKind::Uxtx,
        Arm64Extender::ARM64_EXT_SXTB => ExtendKind::Sxtb,
        Arm64Extender::ARM64_EXT_SXTH => ExtendKind::Sxth,
        Arm64Extender::ARM64_EXT_SXTW => ExtendKind::Sxtw,
        Arm64Extender::ARM64_EXT_SXTX => ExtendKind::Sxtx,
        _ => return None,
    };
    Some(ShiftExtend::Extend(kind))
}
