//! Flag conditions and processor status flags.

use std::fmt;

/// Flag condition understood by the IL.
///
/// Each variant tests a fixed combination of the NZCV flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FlagCondition {
    /// Equal (Z).
    E,
    /// Not equal (!Z).
    Ne,
    /// Unsigned greater or equal (C).
    Uge,
    /// Unsigned less than (!C).
    Ult,
    /// Negative (N).
    Neg,
    /// Positive or zero (!N).
    Pos,
    /// Overflow (V).
    O,
    /// No overflow (!V).
    No,
    /// Unsigned greater than (C && !Z).
    Ugt,
    /// Unsigned less or equal (!C || Z).
    Ule,
    /// Signed greater or equal (N == V).
    Sge,
    /// Signed less than (N != V).
    Slt,
    /// Signed greater than (!Z && N == V).
    Sgt,
    /// Signed less or equal (Z || N != V).
    Sle,
}

impl FlagCondition {
    /// All flag conditions.
    pub const ALL: [Self; 14] = [
        Self::E,
        Self::Ne,
        Self::Uge,
        Self::Ult,
        Self::Neg,
        Self::Pos,
        Self::O,
        Self::No,
        Self::Ugt,
        Self::Ule,
        Self::Sge,
        Self::Slt,
        Self::Sgt,
        Self::Sle,
    ];

    /// Evaluate this condition against a flag state.
    #[must_use]
    pub const fn holds(self, flags: Flags) -> bool {
        match self {
            Self::E => flags.z,
            Self::Ne => !flags.z,
            Self::Uge => flags.c,
            Self::Ult => !flags.c,
            Self::Neg => flags.n,
            Self::Pos => !flags.n,
            Self::O => flags.v,
            Self::No => !flags.v,
            Self::Ugt => flags.c && !flags.z,
            Self::Ule => !flags.c || flags.z,
            Self::Sge => flags.n == flags.v,
            Self::Slt => flags.n != flags.v,
            Self::Sgt => !flags.z && flags.n == flags.v,
            Self::Sle => flags.z || flags.n != flags.v,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::E => "e",
            Self::Ne => "ne",
            Self::Uge => "uge",
            Self::Ult => "ult",
            Self::Neg => "neg",
            Self::Pos => "pos",
            Self::O => "o",
            Self::No => "no",
            Self::Ugt => "ugt",
            Self::Ule => "ule",
            Self::Sge => "sge",
            Self::Slt => "slt",
            Self::Sgt => "sgt",
            Self::Sle => "sle",
        }
    }
}

impl fmt::Display for FlagCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// NZCV processor status flags.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct Flags {
    pub n: bool,
    pub z: bool,
    pub c: bool,
    pub v: bool,
}

impl Flags {
    /// Build flags from a 4-bit NZCV nibble (N is bit 3).
    #[must_use]
    pub const fn from_nzcv(nzcv: u8) -> Self {
        Self {
            n: nzcv & 0b1000 != 0,
            z: nzcv & 0b0100 != 0,
            c: nzcv & 0b0010 != 0,
            v: nzcv & 0b0001 != 0,
        }
    }
}
