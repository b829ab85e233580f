//! IL instructions and labels.

use std::fmt;

use crate::expr::Expr;
use crate::reg::RegId;

/// Branch target inside an IL function or fragment.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Label(pub(crate) u32);

impl Label {
    /// Label index within its owning function or fragment.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn offset(self, by: u32) -> Self {
        Self(self.0 + by)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A single IL instruction.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Instr {
    /// Write `size` bytes of `value` to a register.
    SetReg { size: u8, reg: RegId, value: Expr },
    /// Two-way conditional branch.
    If {
        cond: Expr,
        then_label: Label,
        else_label: Label,
    },
    /// Unconditional jump.
    Goto(Label),
    /// Placeholder for semantics the lifter does not model.
    Unimplemented,
}

impl Instr {
    #[must_use]
    pub const fn set_reg(size: u8, reg: RegId, value: Expr) -> Self {
        Self::SetReg { size, reg, value }
    }

    #[must_use]
    pub const fn if_else(cond: Expr, then_label: Label, else_label: Label) -> Self {
        Self::If {
            cond,
            then_label,
            else_label,
        }
    }

    /// Check if this instruction transfers control.
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::If { .. } | Self::Goto(_))
    }

    /// Shift every label reference by `by` (used when splicing fragments).
    pub(crate) fn relabel(self, by: u32) -> Self {
        match self {
            Self::If {
                cond,
                then_label,
                else_label,
            } => Self::If {
                cond,
                then_label: then_label.offset(by),
                else_label: else_label.offset(by),
            },
            Self::Goto(label) => Self::Goto(label.offset(by)),
            other => other,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetReg { size, reg, value } => write!(f, "{reg}.{size} = {value}"),
            Self::If {
                cond,
                then_label,
                else_label,
            } => write!(f, "if ({cond}) then {then_label} else {else_label}"),
            Self::Goto(label) => write!(f, "goto {label}"),
            Self::Unimplemented => f.write_str("unimplemented"),
        }
    }
}
