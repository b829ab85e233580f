//! Expression IL.

use std::fmt;

use crate::flags::FlagCondition;
use crate::reg::{RegId, size_mask};

/// Binary operations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Mul,
    And,
    Or,
    Lsl,
    Ror,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Mul => "*",
            Self::And => "&",
            Self::Or => "|",
            Self::Lsl => "<<",
            Self::Ror => "ror",
        }
    }
}

/// Expression tree node.
///
/// Every value-producing node carries its operation size in bytes; the
/// result is truncated to that size.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Expr {
    Const {
        size: u8,
        value: u64,
    },
    Reg {
        size: u8,
        reg: RegId,
    },
    Binary {
        op: BinaryOp,
        size: u8,
        left: Box<Self>,
        right: Box<Self>,
    },
    /// Boolean test of the processor flags.
    FlagCond(FlagCondition),
}

// These are factory methods, not trait implementations
#[allow(clippy::should_implement_trait)]
impl Expr {
    /// Create a constant, truncated to `size` bytes.
    #[must_use]
    pub const fn constant(size: u8, value: u64) -> Self {
        Self::Const {
            size,
            value: value & size_mask(size),
        }
    }

    /// Create a register read of `size` bytes.
    #[must_use]
    pub const fn reg(size: u8, reg: RegId) -> Self {
        Self::Reg { size, reg }
    }

    /// Create a flag condition test.
    #[must_use]
    pub const fn flag_condition(cond: FlagCondition) -> Self {
        Self::FlagCond(cond)
    }

    fn binary(op: BinaryOp, size: u8, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            size,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn add(size: u8, left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Add, size, left, right)
    }

    /// Unsigned multiply; operands are zero-extended to `size`.
    #[must_use]
    pub fn mul(size: u8, left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Mul, size, left, right)
    }

    #[must_use]
    pub fn and(size: u8, left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::And, size, left, right)
    }

    #[must_use]
    pub fn or(size: u8, left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Or, size, left, right)
    }

    #[must_use]
    pub fn shift_left(size: u8, value: Self, amount: Self) -> Self {
        Self::binary(BinaryOp::Lsl, size, value, amount)
    }

    /// Rotate right within `size` bytes; the amount is taken modulo the width.
    #[must_use]
    pub fn rotate_right(size: u8, value: Self, amount: Self) -> Self {
        Self::binary(BinaryOp::Ror, size, value, amount)
    }

    /// Result size in bytes. Flag conditions are one byte wide.
    #[must_use]
    pub const fn size(&self) -> u8 {
        match self {
            Self::Const { size, .. } | Self::Reg { size, .. } | Self::Binary { size, .. } => *size,
            Self::FlagCond(_) => 1,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const { value, .. } => write!(f, "{value:#x}"),
            Self::Reg { size, reg } => write!(f, "{reg}.{size}"),
            Self::Binary {
                op, left, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Self::FlagCond(cond) => write!(f, "cond:{cond}"),
        }
    }
}
