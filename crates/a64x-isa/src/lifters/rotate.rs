//! Rotate right (`ror`), register and immediate forms.

use a64x_il::{Expr, IlBuilder, IlFragment};

use super::{operands, resolve};
use crate::registers::RegisterCatalog;
use crate::types::{DecodedInstruction, Operand};

/// `ror Rd, Rn, Rm` or `ror Rd, Rn, #imm`.
pub fn lift_ror(instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> Option<IlFragment> {
    let [rd, rn, amount] = operands::<3>(instr)?;
    let rd = resolve(rd, regs)?;
    let rn = resolve(rn, regs)?;
    if rd.size != rn.size {
        return None;
    }

    let amount = match amount {
        Operand::Register(_) => Expr::reg(rd.size, resolve(amount, regs)?.id),
        Operand::Immediate(imm) => Expr::constant(rd.size, u64::try_from(*imm).ok()?),
        _ => return None,
    };
    let rotated = Expr::rotate_right(rd.size, Expr::reg(rd.size, rn.id), amount);
    Some(IlBuilder::new().set_reg(rd.size, rd.id, rotated).build())
}
