//! Core types for decoded AArch64 instructions.

use std::fmt;

/// Instruction mnemonic.
///
/// Only the mnemonics with dedicated lifters get their own variant; every
/// other instruction keeps the engine's raw id for logging.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mnemonic {
    /// Conditional select increment.
    Csinc,
    /// Unsigned multiply long.
    Umull,
    /// Conditional increment.
    Cinc,
    /// Bitfield insert.
    Bfi,
    /// Rotate right.
    Ror,
    /// Any other instruction, by engine instruction id.
    Other(u32),
}

impl Mnemonic {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Csinc => "csinc",
            Self::Umull => "umull",
            Self::Cinc => "cinc",
            Self::Bfi => "bfi",
            Self::Ror => "ror",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(id) => write!(f, "insn#{id}"),
            _ => f.write_str(self.name()),
        }
    }
}

/// AArch64 condition code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ConditionCode {
    /// No condition (unconditional instructions, or an undecodable field).
    #[default]
    Invalid,
    Eq,
    Ne,
    Hs,
    Lo,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
    /// Architecturally behaves exactly like `Al`.
    Nv,
}

impl ConditionCode {
    /// Decode the 4-bit architectural condition field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0xf {
            0x0 => Self::Eq,
            0x1 => Self::Ne,
            0x2 => Self::Hs,
            0x3 => Self::Lo,
            0x4 => Self::Mi,
            0x5 => Self::Pl,
            0x6 => Self::Vs,
            0x7 => Self::Vc,
            0x8 => Self::Hi,
            0x9 => Self::Ls,
            0xa => Self::Ge,
            0xb => Self::Lt,
            0xc => Self::Gt,
            0xd => Self::Le,
            0xe => Self::Al,
            _ => Self::Nv,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Hs => "hs",
            Self::Lo => "lo",
            Self::Mi => "mi",
            Self::Pl => "pl",
            Self::Vs => "vs",
            Self::Vc => "vc",
            Self::Hi => "hi",
            Self::Ls => "ls",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Al => "al",
            Self::Nv => "nv",
        }
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shift applied to a register operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
    Msl,
}

/// Extend applied to a register operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExtendKind {
    Uxtb,
    Uxth,
    Uxtw,
    Uxtx,
    Sxtb,
    Sxth,
    Sxtw,
    Sxtx,
}

/// Shift or extend descriptor attached to a register operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShiftExtend {
    Shift { kind: ShiftKind, amount: u32 },
    Extend(ExtendKind),
}

/// Decoded operand.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operand {
    /// Register, by the engine's register name (e.g. `x0`, `wzr`).
    Register(String),
    /// Integer immediate.
    Immediate(i64),
    /// Register with a shift or extend applied.
    ShiftExtend { reg: String, shift: ShiftExtend },
    /// Memory, system, vector or floating-point operand.
    Other,
}

impl Operand {
    /// Create a plain register operand.
    #[must_use]
    pub fn reg(name: &str) -> Self {
        Self::Register(name.to_string())
    }

    /// Register name, for plain register operands only.
    #[must_use]
    pub fn register(&self) -> Option<&str> {
        match self {
            Self::Register(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn immediate(&self) -> Option<i64> {
        match self {
            Self::Immediate(value) => Some(*value),
            _ => None,
        }
    }
}

/// A decoded instruction.
///
/// Produced fresh by every decode call and consumed by a single lift
/// attempt.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DecodedInstruction {
    pub mnemonic: Mnemonic,
    /// Address the instruction was decoded at.
    pub address: u64,
    /// Encoded length in bytes.
    pub size: usize,
    pub operands: Vec<Operand>,
    pub cc: ConditionCode,
}

impl DecodedInstruction {
    /// Create a 4-byte instruction with no operands and no condition.
    #[must_use]
    pub const fn new(mnemonic: Mnemonic, address: u64) -> Self {
        Self {
            mnemonic,
            address,
            size: 4,
            operands: Vec::new(),
            cc: ConditionCode::Invalid,
        }
    }

    #[must_use]
    pub fn with_operands(mut self, operands: Vec<Operand>) -> Self {
        self.operands = operands;
        self
    }

    #[must_use]
    pub const fn with_condition(mut self, cc: ConditionCode) -> Self {
        self.cc = cc;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_from_bits() {
        assert_eq!(ConditionCode::from_bits(0), ConditionCode::Eq);
        assert_eq!(ConditionCode::from_bits(0xb), ConditionCode::Lt);
        assert_eq!(ConditionCode::from_bits(0xe), ConditionCode::Al);
        assert_eq!(ConditionCode::from_bits(0xf), ConditionCode::Nv);
        // Only the low nibble is significant.
        assert_eq!(ConditionCode::from_bits(0x11), ConditionCode::Ne);
    }

    #[test]
    fn test_operand_accessors() {
        assert_eq!(Operand::reg("x3").register(), Some("x3"));
        assert_eq!(Operand::Immediate(7).immediate(), Some(7));
        assert_eq!(Operand::Immediate(7).register(), None);

        let shifted = Operand::ShiftExtend {
            reg: "x3".to_string(),
            shift: ShiftExtend::Shift {
                kind: ShiftKind::Lsl,
                amount: 2,
            },
        };
        assert_eq!(shifted.register(), None);
    }

    #[test]
    fn test_mnemonic_display() {
        assert_eq!(Mnemonic::Bfi.to_string(), "bfi");
        assert_eq!(Mnemonic::Other(12).to_string(), "insn#12");
    }
}
