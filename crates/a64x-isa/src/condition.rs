//! Condition-code translation.

use a64x_il::FlagCondition;

use crate::types::ConditionCode;

/// Result of translating an AArch64 condition code.
///
/// Callers must handle all three cases: `Unconditional` lifts as
/// straight-line code, `Invalid` rejects the instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LiftedCondition {
    Representable(FlagCondition),
    /// `al` and `nv`: the instruction always takes effect.
    Unconditional,
    Invalid,
}

/// Translate a condition code to an IL flag condition.
#[must_use]
pub const fn translate(cc: ConditionCode) -> LiftedCondition {
    use LiftedCondition::Representable;

    match cc {
        ConditionCode::Eq => Representable(FlagCondition::E),
        ConditionCode::Ne => Representable(FlagCondition::Ne),
        ConditionCode::Hs => Representable(FlagCondition::Uge),
        ConditionCode::Lo => Representable(FlagCondition::Ult),
        ConditionCode::Mi => Representable(FlagCondition::Neg),
        ConditionCode::Pl => Representable(FlagCondition::Pos),
        ConditionCode::Vs => Representable(FlagCondition::O),
        ConditionCode::Vc => Representable(FlagCondition::No),
        ConditionCode::Hi => Representable(FlagCondition::Ugt),
        ConditionCode::Ls => Representable(FlagCondition::Ule),
        ConditionCode::Ge => Representable(FlagCondition::Sge),
        ConditionCode::Lt => Representable(FlagCondition::Slt),
        ConditionCode::Gt => Representable(FlagCondition::Sgt),
        ConditionCode::Le => Representable(FlagCondition::Sle),
        ConditionCode::Al | ConditionCode::Nv => LiftedCondition::Unconditional,
        ConditionCode::Invalid => LiftedCondition::Invalid,
    }
}
