//! Widening multiply (`umull`).

use a64x_il::{Expr, IlBuilder, IlFragment};

use super::{operands, resolve};
use crate::registers::RegisterCatalog;
use crate::types::DecodedInstruction;

/// `umull Xd, Wn, Wm`: 64-bit product of two 32-bit sources.
///
/// The vector form shares the mnemonic and is rejected by the width check.
pub fn lift_umull(instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> Option<IlFragment> {
    let [rd, rn, rm] = operands::<3>(instr)?;
    let rd = resolve(rd, regs)?;
    let rn = resolve(rn, regs)?;
    let rm = resolve(rm, regs)?;
    if rd.size != 8 || rn.size != 4 || rm.size != 4 {
        return None;
    }

    let product = Expr::mul(8, Expr::reg(4, rn.id), Expr::reg(4, rm.id));
    Some(IlBuilder::new().set_reg(8, rd.id, product).build())
}

#[cfg(test)]
mod tests {
    use a64x_il::{Machine, RegId, RegisterInfo};

    use super::super::test_support::{instr, lift_ok, regs, run};
    use super::*;
    use crate::registers::{Aarch64Registers, w, x};
    use crate::types::Mnemonic;

    fn umull(names: &[&str]) -> DecodedInstruction {
        instr(Mnemonic::Umull, &regs(names))
    }

    #[test]
    fn test_umull_widens() {
        let il = lift_ok(lift_umull, &umull(&["x0", "w1", "w2"]));
        assert_eq!(il.len(), 1);

        let mut m = Machine::new();
        m.set_reg(w(1), 0xffff_ffff);
        m.set_reg(w(2), 2);
        assert_eq!(run(&il, m).reg(x(0)), 0x1_ffff_fffe);
    }

    #[test]
    fn test_umull_reads_low_halves() {
        let il = lift_ok(lift_umull, &umull(&["x3", "w4", "w5"]));
        let mut m = Machine::new();
        m.set_reg(w(4), 0xdead_0000_0003);
        m.set_reg(w(5), 7);
        assert_eq!(run(&il, m).reg(x(3)), 21);
    }

    #[test]
    fn test_umull_rejects_wrong_widths() {
        let catalog = Aarch64Registers::new();
        for names in [
            ["w0", "w1", "w2"],
            ["x0", "x1", "w2"],
            ["x0", "w1", "x2"],
            ["x0", "x1", "x2"],
        ] {
            assert!(lift_umull(&umull(&names), &catalog).is_none(), "{names:?}");
        }
    }

    /// General-purpose registers plus 16-byte `v0`..`v31`.
    struct WithVectors(Aarch64Registers);

    const VECTOR_BASE: u32 = 0x100;

    impl RegisterCatalog for WithVectors {
        fn register_by_name(&self, name: &str) -> Option<RegId> {
            match name.strip_prefix('v').and_then(|n| n.parse::<u32>().ok()) {
                Some(n) if n < 32 => Some(RegId(VECTOR_BASE + n)),
                _ => self.0.register_by_name(name),
            }
        }

        fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
            if (VECTOR_BASE..VECTOR_BASE + 32).contains(&reg.0) {
                Some(RegisterInfo::new(16))
            } else {
                self.0.register_info(reg)
            }
        }
    }

    #[test]
    fn test_umull_rejects_vector_form() {
        let catalog = WithVectors(Aarch64Registers::new());
        let vector = umull(&["v0", "v1", "v2"]);
        assert!(catalog.register_by_name("v1").is_some());
        assert!(lift_umull(&vector, &catalog).is_none());

        // The scalar form still lifts through the same catalog.
        assert!(lift_umull(&umull(&["x0", "w1", "w2"]), &catalog).is_some());
    }
}
