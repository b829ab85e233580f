//! Bitfield insert (`bfi`).

use a64x_il::{Expr, IlBuilder, IlFragment, size_mask};

use super::{operands, resolve};
use crate::registers::RegisterCatalog;
use crate::types::DecodedInstruction;

/// A value with the low `count` bits set. Saturates at 64.
#[must_use]
pub const fn ones(count: u32) -> u64 {
    if count >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << count) - 1
    }
}

/// Mask selecting `width` bits starting at `lsb` in a `size`-byte register.
///
/// Returns `None` when the field is empty or does not fit the register.
#[must_use]
pub fn field_mask(size: u8, lsb: u32, width: u32) -> Option<u64> {
    let bits = u32::from(size) * 8;
    if width == 0 || lsb >= bits || width > bits - lsb {
        return None;
    }
    Some((ones(width) << lsb) & size_mask(size))
}

/// `bfi Rd, Rn, #lsb, #width`: copy the low `width` bits of `Rn` into `Rd`
/// at `lsb`, leaving the other bits of `Rd` alone.
pub fn lift_bfi(instr: &DecodedInstruction, regs: &dyn RegisterCatalog) -> Option<IlFragment> {
    let [rd, rn, lsb, width] = operands::<4>(instr)?;
    let rd = resolve(rd, regs)?;
    let rn = resolve(rn, regs)?;
    if rd.size != rn.size || !matches!(rd.size, 4 | 8) {
        return None;
    }
    let lsb = u32::try_from(lsb.immediate()?).ok()?;
    let width = u32::try_from(width.immediate()?).ok()?;
    let mask = field_mask(rd.size, lsb, width)?;

    let size = rd.size;
    let kept = Expr::and(size, Expr::reg(size, rd.id), Expr::constant(size, !mask));
    let inserted = Expr::and(
        size,
        Expr::shift_left(size, Expr::reg(size, rn.id), Expr::constant(1, u64::from(lsb))),
        Expr::constant(size, mask),
    );
    Some(IlBuilder::new().set_reg(size, rd.id, Expr::or(size, kept, inserted)).build())
}

#[cfg(test)]
mod tests {
    use a64x_il::Machine;

    use super::super::test_support::{instr, lift_ok, run};
    use super::*;
    use crate::registers::{Aarch64Registers, w, x};
    use crate::types::{Mnemonic, Operand};

    fn bfi(rd: &str, rn: &str, lsb: i64, width: i64) -> DecodedInstruction {
        instr(
            Mnemonic::Bfi,
            &[
                Operand::reg(rd),
                Operand::reg(rn),
                Operand::Immediate(lsb),
                Operand::Immediate(width),
            ],
        )
    }

    #[test]
    fn test_ones() {
        assert_eq!(ones(0), 0);
        assert_eq!(ones(8), 0xff);
        assert_eq!(ones(63), u64::MAX >> 1);
        assert_eq!(ones(64), u64::MAX);
    }

    #[test]
    fn test_field_mask() {
        assert_eq!(field_mask(4, 4, 8), Some(0xff0));
        assert_eq!(field_mask(4, 0, 32), Some(0xffff_ffff));
        assert_eq!(field_mask(8, 0, 64), Some(u64::MAX));
        assert_eq!(field_mask(8, 63, 1), Some(1 << 63));
        assert_eq!(field_mask(4, 0, 0), None);
        assert_eq!(field_mask(4, 32, 1), None);
        assert_eq!(field_mask(4, 28, 8), None);
    }

    #[test]
    fn test_bfi_inserts_field() {
        let il = lift_ok(lift_bfi, &bfi("w0", "w1", 4, 8));
        let mut m = Machine::new();
        m.set_reg(w(0), 0xffff_ffff);
        m.set_reg(w(1), 0xab);
        assert_eq!(run(&il, m).reg(w(0)), 0xffff_fabf);
    }

    #[test]
    fn test_bfi_ignores_high_source_bits() {
        let il = lift_ok(lift_bfi, &bfi("x0", "x1", 8, 4));
        let mut m = Machine::new();
        m.set_reg(x(0), 0);
        m.set_reg(x(1), 0xfff5);
        assert_eq!(run(&il, m).reg(x(0)), 0x500);
    }

    #[test]
    fn test_bfi_full_width() {
        let il = lift_ok(lift_bfi, &bfi("x0", "x1", 0, 64));
        let mut m = Machine::new();
        m.set_reg(x(0), 0x1234);
        m.set_reg(x(1), 0xdead_beef_cafe_f00d);
        assert_eq!(run(&il, m).reg(x(0)), 0xdead_beef_cafe_f00d);
    }

    #[test]
    fn test_bfi_top_bit() {
        let il = lift_ok(lift_bfi, &bfi("w0", "w1", 31, 1));
        let mut m = Machine::new();
        m.set_reg(w(0), 0x1);
        m.set_reg(w(1), 0x1);
        assert_eq!(run(&il, m).reg(w(0)), 0x8000_0001);
    }

    #[test]
    fn test_bfi_rejects() {
        let catalog = Aarch64Registers::new();
        let cases = [
            bfi("w0", "x1", 4, 8),
            bfi("x0", "w1", 4, 8),
            bfi("w0", "w1", 4, 0),
            bfi("w0", "w1", 32, 1),
            bfi("w0", "w1", 30, 4),
            bfi("w0", "w1", -1, 4),
            bfi("x0", "x1", 0, 65),
        ];
        for instr in &cases {
            assert!(lift_bfi(instr, &catalog).is_none(), "{instr:?}");
        }

        let reg_lsb = instr(
            Mnemonic::Bfi,
            &[Operand::reg("w0"), Operand::reg("w1"), Operand::reg("w2"), Operand::Immediate(4)],
        );
        assert!(lift_bfi(&reg_lsb, &catalog).is_none());
    }
}
