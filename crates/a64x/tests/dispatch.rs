//! Dispatch through the real decoding engine.

use std::sync::Arc;

use a64x::il::{Flags, Instr, LowLevelILFunction, Machine, RegId, RegisterInfo};
use a64x::isa::{Aarch64Registers, RegisterCatalog, w, x};
use a64x::{Aarch64Extension, BaseArchitecture, GenericAarch64, LiftOutcome};
use parking_lot::Mutex;

const CSINC_EQ: [u8; 4] = [0x20, 0x04, 0x82, 0x9a]; // csinc x0, x1, x2, eq
const UMULL: [u8; 4] = [0x20, 0x7c, 0xa2, 0x9b]; // umull x0, w1, w2
const BFI: [u8; 4] = [0x20, 0x1c, 0x1c, 0x33]; // bfi w0, w1, #4, #8
const ROR_IMM: [u8; 4] = [0x20, 0x20, 0xc1, 0x93]; // ror x0, x1, #8
const ROR_REG: [u8; 4] = [0x20, 0x2c, 0xc2, 0x9a]; // ror x0, x1, x2
const CINC_EQ: [u8; 4] = [0x20, 0x14, 0x81, 0x9a]; // cinc x0, x1, eq
const ADD: [u8; 4] = [0x20, 0x00, 0x02, 0x8b]; // add x0, x1, x2
const NOP: [u8; 4] = [0x1f, 0x20, 0x03, 0xd5];

/// Base that records calls and emits a distinctive instruction per call.
#[derive(Default)]
struct RecordingBase {
    regs: Aarch64Registers,
    calls: Mutex<Vec<Vec<u8>>>,
}

impl RegisterCatalog for RecordingBase {
    fn register_by_name(&self, name: &str) -> Option<RegId> {
        self.regs.register_by_name(name)
    }

    fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
        self.regs.register_info(reg)
    }
}

impl BaseArchitecture for RecordingBase {
    fn name(&self) -> &str {
        "aarch64"
    }

    fn instruction_llil(&self, data: &[u8], _addr: u64, il: &mut LowLevelILFunction) -> LiftOutcome {
        self.calls.lock().push(data.to_vec());
        if data.len() < 4 {
            return LiftOutcome::new(0, false);
        }
        il.add_instruction(Instr::Unimplemented);
        LiftOutcome::new(4, true)
    }
}

fn hooked() -> (Arc<RecordingBase>, Aarch64Extension) {
    let base = Arc::new(RecordingBase::default());
    let ext = Aarch64Extension::new(Arc::clone(&base) as Arc<dyn BaseArchitecture>);
    (base, ext)
}

fn lift(arch: &dyn BaseArchitecture, bytes: &[u8]) -> (LiftOutcome, LowLevelILFunction) {
    let mut il = LowLevelILFunction::new();
    il.set_current_address(0x1000);
    let outcome = arch.instruction_llil(bytes, 0x1000, &mut il);
    (outcome, il)
}

#[test]
fn test_unhandled_mnemonic_matches_base() {
    let (base, ext) = hooked();
    let (expected_outcome, expected_il) = lift(base.as_ref(), &ADD);
    base.calls.lock().clear();

    let (outcome, il) = lift(&ext, &ADD);
    assert_eq!(outcome, expected_outcome);
    assert_eq!(il, expected_il);
    assert_eq!(*base.calls.lock(), vec![ADD.to_vec()]);
}

#[test]
fn test_fallback_gets_only_the_decoded_instruction() {
    let (base, ext) = hooked();
    let mut data = NOP.to_vec();
    data.extend_from_slice(&ADD);

    let (outcome, _) = lift(&ext, &data);
    assert_eq!(outcome.length, 4);
    assert_eq!(*base.calls.lock(), vec![NOP.to_vec()]);
}

#[test]
fn test_undecodable_bytes_go_to_base_whole() {
    let (base, ext) = hooked();
    let (outcome, il) = lift(&ext, &[0x20, 0x04, 0x82]);
    assert_eq!(outcome, LiftOutcome::new(0, false));
    assert!(il.is_empty());
    assert_eq!(*base.calls.lock(), vec![vec![0x20, 0x04, 0x82]]);
}

#[test]
fn test_handled_mnemonics_never_reach_base() {
    let (base, ext) = hooked();
    for bytes in [CSINC_EQ, UMULL, BFI, ROR_REG, CINC_EQ] {
        let (outcome, il) = lift(&ext, &bytes);
        assert_eq!(outcome, LiftOutcome::new(4, true), "{bytes:02x?}");
        assert!(!il.instructions().contains(&Instr::Unimplemented), "{bytes:02x?}");
        assert!(il.address_of(0) == Some(0x1000));
    }
    assert!(base.calls.lock().is_empty());
}

#[test]
fn test_rotate_immediate_always_produces_il() {
    let (_, ext) = hooked();
    let (outcome, il) = lift(&ext, &ROR_IMM);
    assert_eq!(outcome, LiftOutcome::new(4, true));
    assert!(!il.is_empty());
}

#[test]
fn test_lifted_semantics() {
    let (_, ext) = hooked();

    let (_, il) = lift(&ext, &CSINC_EQ);
    let mut m = Machine::new().with_flags(Flags::from_nzcv(0b0100));
    m.set_reg(x(1), 7);
    m.set_reg(x(2), 9);
    m.run(&il).expect("run");
    assert_eq!(m.reg(x(0)), 7);

    let mut m = Machine::new();
    m.set_reg(x(1), 7);
    m.set_reg(x(2), 9);
    m.run(&il).expect("run");
    assert_eq!(m.reg(x(0)), 10);

    let (_, il) = lift(&ext, &UMULL);
    let mut m = Machine::new();
    m.set_reg(w(1), 0xffff_ffff);
    m.set_reg(w(2), 2);
    m.run(&il).expect("run");
    assert_eq!(m.reg(x(0)), 0x1_ffff_fffe);

    let (_, il) = lift(&ext, &BFI);
    let mut m = Machine::new();
    m.set_reg(w(0), 0xffff_ffff);
    m.set_reg(w(1), 0x12);
    m.run(&il).expect("run");
    assert_eq!(m.reg(w(0)), 0xffff_f12f);

    let (_, il) = lift(&ext, &ROR_REG);
    let mut m = Machine::new();
    m.set_reg(x(1), 0x1234);
    m.set_reg(x(2), 64);
    m.run(&il).expect("run");
    assert_eq!(m.reg(x(0)), 0x1234);
}

#[test]
fn test_generic_base_end_to_end() {
    let ext = Aarch64Extension::new(Arc::new(GenericAarch64::new()));
    let (outcome, il) = lift(&ext, &NOP);
    assert_eq!(outcome, LiftOutcome::new(4, true));
    assert_eq!(il.instructions(), &[Instr::Unimplemented]);
}
