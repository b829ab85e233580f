//! Per-function IL buffer.

use std::fmt;

use crate::builder::IlFragment;
use crate::instr::{Instr, Label};

/// IL being built for one function.
///
/// Lifting appends instructions here one machine instruction at a time.
/// Every IL instruction records the address of the machine instruction it
/// was lifted from.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LowLevelILFunction {
    instrs: Vec<Instr>,
    addrs: Vec<u64>,
    labels: Vec<Option<usize>>,
    current_address: u64,
}

impl LowLevelILFunction {
    /// Create an empty function.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instrs: Vec::new(),
            addrs: Vec::new(),
            labels: Vec::new(),
            current_address: 0,
        }
    }

    /// Set the machine address attributed to subsequently added instructions.
    pub const fn set_current_address(&mut self, addr: u64) {
        self.current_address = addr;
    }

    #[must_use]
    pub const fn current_address(&self) -> u64 {
        self.current_address
    }

    /// Append an instruction and return its index.
    pub fn add_instruction(&mut self, instr: Instr) -> usize {
        self.instrs.push(instr);
        self.addrs.push(self.current_address);
        self.instrs.len() - 1
    }

    /// Allocate a fresh, unmarked label.
    pub fn new_label(&mut self) -> Label {
        let idx = u32::try_from(self.labels.len()).unwrap_or(u32::MAX);
        self.labels.push(None);
        Label(idx)
    }

    /// Bind a label to the position of the next instruction.
    pub fn mark_label(&mut self, label: Label) {
        let pos = self.instrs.len();
        if let Some(slot) = self.labels.get_mut(label.index()) {
            *slot = Some(pos);
        }
    }

    /// Splice a fragment onto the end of the function.
    ///
    /// Fragment labels are renumbered past the function's own labels, and
    /// their positions are rebased onto the current instruction count.
    pub fn append(&mut self, fragment: IlFragment) {
        let label_base = u32::try_from(self.labels.len()).unwrap_or(u32::MAX);
        let instr_base = self.instrs.len();

        self.labels.extend(
            fragment
                .labels
                .into_iter()
                .map(|pos| pos.map(|p| p + instr_base)),
        );
        for instr in fragment.instrs {
            self.add_instruction(instr.relabel(label_base));
        }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instr] {
        &self.instrs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Position a label was marked at.
    #[must_use]
    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.labels.get(label.index()).copied().flatten()
    }

    /// Machine address an IL instruction was lifted from.
    #[must_use]
    pub fn address_of(&self, index: usize) -> Option<u64> {
        self.addrs.get(index).copied()
    }
}

impl fmt::Display for LowLevelILFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (instr, addr)) in self.instrs.iter().zip(&self.addrs).enumerate() {
            for (label, pos) in self.labels.iter().enumerate() {
                if *pos == Some(idx) {
                    writeln!(f, "L{label}:")?;
                }
            }
            writeln!(f, "  {idx:>4} @ {addr:#x}  {instr}")?;
        }
        Ok(())
    }
}
