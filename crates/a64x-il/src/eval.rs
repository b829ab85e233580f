//! Reference evaluator for IL.
//!
//! Executes lifted IL against a register file and NZCV flags. Registers
//! are tracked by id with no aliasing between W and X views; a read of
//! `size` bytes returns the low `size` bytes of whatever was last written.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::expr::{BinaryOp, Expr};
use crate::flags::Flags;
use crate::function::LowLevelILFunction;
use crate::instr::{Instr, Label};
use crate::reg::{RegId, size_mask};

/// Default bound on executed IL instructions per run.
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

/// Evaluation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("label {0} is never marked")]
    UnboundLabel(Label),
    #[error("unimplemented IL at index {0}")]
    Unimplemented(usize),
    #[error("step limit of {0} exceeded")]
    StepLimit(usize),
}

/// Machine state for IL evaluation.
#[derive(Clone, Debug)]
pub struct Machine {
    regs: FxHashMap<RegId, u64>,
    flags: Flags,
    step_limit: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Create a machine with all registers zero and all flags clear.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: FxHashMap::default(),
            flags: Flags::default(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub const fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn set_reg(&mut self, reg: RegId, value: u64) {
        self.regs.insert(reg, value);
    }

    #[must_use]
    pub fn reg(&self, reg: RegId) -> u64 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Evaluate an expression to a value truncated to its size.
    #[must_use]
    pub fn eval(&self, expr: &Expr) -> u64 {
        match expr {
            Expr::Const { size, value } => value & size_mask(*size),
            Expr::Reg { size, reg } => self.reg(*reg) & size_mask(*size),
            Expr::Binary {
                op,
                size,
                left,
                right,
            } => {
                let l = self.eval(left);
                let r = self.eval(right);
                binary(*op, *size, l, r)
            }
            Expr::FlagCond(cond) => u64::from(cond.holds(self.flags)),
        }
    }

    /// Execute a function from its first instruction until control falls
    /// off the end. Returns the number of IL instructions executed.
    ///
    /// # Errors
    ///
    /// Fails on an unmarked branch target, on `unimplemented` IL, or when
    /// the step limit is exceeded.
    pub fn run(&mut self, il: &LowLevelILFunction) -> Result<usize, EvalError> {
        let instrs = il.instructions();
        let target = |label: Label| il.label_position(label).ok_or(EvalError::UnboundLabel(label));

        let mut pc = 0;
        let mut steps = 0;
        while let Some(instr) = instrs.get(pc) {
            if steps == self.step_limit {
                return Err(EvalError::StepLimit(self.step_limit));
            }
            steps += 1;

            pc = match instr {
                Instr::SetReg { size, reg, value } => {
                    let value = self.eval(value) & size_mask(*size);
                    self.regs.insert(*reg, value);
                    pc + 1
                }
                Instr::If {
                    cond,
                    then_label,
                    else_label,
                } => {
                    if self.eval(cond) != 0 {
                        target(*then_label)?
                    } else {
                        target(*else_label)?
                    }
                }
                Instr::Goto(label) => target(*label)?,
                Instr::Unimplemented => return Err(EvalError::Unimplemented(pc)),
            };
        }
        Ok(steps)
    }
}

fn binary(op: BinaryOp, size: u8, l: u64, r: u64) -> u64 {
    let mask = size_mask(size);
    let bits = u64::from(size) * 8;
    let value = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::And => l & r,
        BinaryOp::Or => l | r,
        BinaryOp::Lsl => {
            if r >= bits {
                0
            } else {
                l << r
            }
        }
        BinaryOp::Ror => rotate_right(l & mask, r, bits),
    };
    value & mask
}

fn rotate_right(value: u64, amount: u64, bits: u64) -> u64 {
    if bits == 0 {
        return 0;
    }
    let amount = amount % bits;
    if amount == 0 {
        value
    } else {
        (value >> amount) | (value << (bits - amount))
    }
}
