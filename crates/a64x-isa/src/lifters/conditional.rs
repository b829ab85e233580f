//! Conditional select and increment (`csinc`, `cinc`).

use a64x_il::{Expr, FlagCondition, IlBuilder, IlFragment};

use super::{Reg, operands, resolve};
use crate::condition::{LiftedCondition, translate};
use crate::registers::RegisterCatalog;
use crate::types::DecodedInstruction;

/// `csinc Rd, Rn, Rm, cc`: `Rd = cc ? Rn : Rm + 1`.
pub fn lift_csinc(instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> Option<IlFragment> {
    let [rd, rn, rm] = operands::<3>(instr)?;
    let rd = resolve(rd, regs)?;
    let rn = resolve(rn, regs)?;
    let rm = resolve(rm, regs)?;
    if rd.size != rn.size || rn.size != rm.size {
        return None;
    }

    let taken = Expr::reg(rd.size, rn.id);
    let not_taken = Expr::add(rd.size, Expr::reg(rd.size, rm.id), Expr::constant(rd.size, 1));
    match translate(instr.cc) {
        LiftedCondition::Unconditional => Some(IlBuilder::new().set_reg(rd.size, rd.id, taken).build()),
        LiftedCondition::Representable(cond) => Some(select(cond, rd, taken, not_taken)),
        LiftedCondition::Invalid => None,
    }
}

/// `cinc Rd, Rn, cc`: `Rd = cc ? Rn + 1 : Rn`.
pub fn lift_cinc(instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> Option<IlFragment> {
    let [rd, rn] = operands::<2>(instr)?;
    let rd = resolve(rd, regs)?;
    let rn = resolve(rn, regs)?;

    let incremented = Expr::add(rd.size, Expr::reg(rd.size, rn.id), Expr::constant(rd.size, 1));
    match translate(instr.cc) {
        LiftedCondition::Unconditional => {
            Some(IlBuilder::new().set_reg(rd.size, rd.id, incremented).build())
        }
        LiftedCondition::Representable(cond) => {
            Some(select(cond, rd, incremented, Expr::reg(rd.size, rn.id)))
        }
        LiftedCondition::Invalid => None,
    }
}

/// Two-way branch writing `taken` or `not_taken` to `rd`, joining at the end.
fn select(cond: FlagCondition, rd: Reg, taken: Expr, not_taken: Expr) -> IlFragment {
    let mut b = IlBuilder::new();
    let on_true = b.new_label();
    let on_false = b.new_label();
    let done = b.new_label();

    b.if_else(Expr::flag_condition(cond), on_true, on_false)
        .mark_label(on_true)
        .set_reg(rd.size, rd.id, taken)
        .goto(done)
        .mark_label(on_false)
        .set_reg(rd.size, rd.id, not_taken)
        .goto(done)
        .mark_label(done)
        .build()
}

#[cfg(test)]
mod tests {
    use a64x_il::{Instr, Machine};

    use super::super::test_support::{cond_instr, flags, lift_ok, regs, run};
    use super::*;
    use crate::lifters::LiftFn;
    use crate::registers::{Aarch64Registers, w, x};
    use crate::types::{ConditionCode, Mnemonic, Operand};

    const Z: u8 = 0b0100;

    fn csinc(names: &[&str], cc: ConditionCode) -> DecodedInstruction {
        cond_instr(Mnemonic::Csinc, &regs(names), cc)
    }

    fn cinc(names: &[&str], cc: ConditionCode) -> DecodedInstruction {
        cond_instr(Mnemonic::Cinc, &regs(names), cc)
    }

    fn seeded(nzcv: u8) -> Machine {
        let mut m = Machine::new().with_flags(flags(nzcv));
        m.set_reg(x(1), 10);
        m.set_reg(x(2), 20);
        m.set_reg(w(1), 10);
        m.set_reg(w(2), 20);
        m
    }

    #[test]
    fn test_csinc_selects_on_condition() {
        let il = lift_ok(lift_csinc, &csinc(&["x0", "x1", "x2"], ConditionCode::Eq));
        assert!(matches!(il.instructions()[0], Instr::If { .. }));

        assert_eq!(run(&il, seeded(Z)).reg(x(0)), 10);
        assert_eq!(run(&il, seeded(0)).reg(x(0)), 21);
    }

    #[test]
    fn test_csinc_32_bit_wraps() {
        let il = lift_ok(lift_csinc, &csinc(&["w0", "w1", "w2"], ConditionCode::Ne));
        let mut m = seeded(Z);
        m.set_reg(w(2), 0xffff_ffff);
        assert_eq!(run(&il, m).reg(w(0)), 0);
    }

    #[test]
    fn test_csinc_unconditional_is_a_move() {
        for cc in [ConditionCode::Al, ConditionCode::Nv] {
            let il = lift_ok(lift_csinc, &csinc(&["x0", "x1", "x2"], cc));
            assert_eq!(il.len(), 1);
            assert_eq!(il.instructions()[0], Instr::set_reg(8, x(0), Expr::reg(8, x(1))));
        }
    }

    #[test]
    fn test_csinc_rejects() {
        let catalog = Aarch64Registers::new();
        let cases = [
            csinc(&["x0", "x1", "x2"], ConditionCode::Invalid),
            csinc(&["w0", "x1", "x2"], ConditionCode::Eq),
            csinc(&["x0", "x1", "w2"], ConditionCode::Eq),
            csinc(&["x0", "x1"], ConditionCode::Eq),
        ];
        for instr in &cases {
            assert!(lift_csinc(instr, &catalog).is_none(), "{instr:?}");
        }

        let with_imm = cond_instr(
            Mnemonic::Csinc,
            &[Operand::reg("x0"), Operand::reg("x1"), Operand::Immediate(1)],
            ConditionCode::Eq,
        );
        assert!(lift_csinc(&with_imm, &catalog).is_none());
    }

    #[test]
    fn test_csinc_every_condition_matches_flags() {
        for bits in 0..14 {
            let cc = ConditionCode::from_bits(bits);
            let il = lift_ok(lift_csinc, &csinc(&["x0", "x1", "x2"], cc));
            let LiftedCondition::Representable(cond) = translate(cc) else {
                panic!("{cc} should be representable");
            };
            for nzcv in 0..16 {
                let expected = if cond.holds(flags(nzcv)) { 10 } else { 21 };
                assert_eq!(run(&il, seeded(nzcv)).reg(x(0)), expected, "{cc} nzcv={nzcv:04b}");
            }
        }
    }

    #[test]
    fn test_branches_only_when_conditional() {
        let catalog = Aarch64Registers::new();
        let lifts: [(LiftFn, Mnemonic, &[&str]); 2] = [
            (lift_csinc, Mnemonic::Csinc, &["x0", "x1", "x2"]),
            (lift_cinc, Mnemonic::Cinc, &["x0", "x1"]),
        ];
        for (lifter, mnemonic, names) in lifts {
            for cc in [ConditionCode::Al, ConditionCode::Nv] {
                let fragment = lifter(&cond_instr(mnemonic, &regs(names), cc), &catalog)
                    .expect("unconditional lift");
                assert!(!fragment.has_branches(), "{mnemonic} {cc}");
                assert_eq!(fragment.len(), 1);
            }
            let fragment = lifter(&cond_instr(mnemonic, &regs(names), ConditionCode::Ge), &catalog)
                .expect("conditional lift");
            assert!(fragment.has_branches(), "{mnemonic}");
        }
    }

    #[test]
    fn test_cinc_increments_on_condition() {
        let il = lift_ok(lift_cinc, &cinc(&["x0", "x1"], ConditionCode::Eq));
        assert_eq!(run(&il, seeded(Z)).reg(x(0)), 11);
        assert_eq!(run(&il, seeded(0)).reg(x(0)), 10);
    }

    #[test]
    fn test_cinc_unconditional() {
        for cc in [ConditionCode::Al, ConditionCode::Nv] {
            let il = lift_ok(lift_cinc, &cinc(&["w0", "w1"], cc));
            assert_eq!(il.len(), 1);
            assert!(!il.instructions()[0].is_branch());
            assert_eq!(run(&il, seeded(0)).reg(w(0)), 11);
        }
    }

    #[test]
    fn test_cinc_does_not_check_widths() {
        let il = lift_ok(lift_cinc, &cinc(&["w0", "x1"], ConditionCode::Ne));
        let mut m = seeded(0);
        m.set_reg(x(1), 0x1_0000_0005);
        assert_eq!(run(&il, m).reg(w(0)), 6);
    }

    #[test]
    fn test_cinc_rejects_invalid_condition() {
        let instr = cinc(&["x0", "x1"], ConditionCode::Invalid);
        assert!(lift_cinc(&instr, &Aarch64Registers::new()).is_none());
    }

    #[test]
    fn test_branches_converge() {
        let il = lift_ok(lift_cinc, &cinc(&["x0", "x1"], ConditionCode::Lt));
        let gotos: Vec<_> = il
            .instructions()
            .iter()
            .filter_map(|i| match i {
                Instr::Goto(label) => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(gotos.len(), 2);
        assert_eq!(gotos[0], gotos[1]);
        assert_eq!(il.label_position(gotos[0]), Some(il.len()));
    }
}
