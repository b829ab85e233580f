//! IL fragment builder fluent API.
//!
//! Lifters build a detached [`IlFragment`] and hand it back only when the
//! whole instruction was understood. A rejected lift simply drops its
//! builder, so nothing ever reaches the function being built.

use crate::expr::Expr;
use crate::instr::{Instr, Label};
use crate::reg::RegId;

/// A detached IL sequence with fragment-local labels.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct IlFragment {
    pub(crate) instrs: Vec<Instr>,
    /// Position each label was marked at, indexed by label.
    pub(crate) labels: Vec<Option<usize>>,
}

impl IlFragment {
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

    /// Position of a label within this fragment, if it was marked.
    #[must_use]
    pub fn label_position(&self, label: Label) -> Option<usize> {
        self.labels.get(label.index()).copied().flatten()
    }

    /// Check if any instruction in the fragment transfers control.
    #[must_use]
    pub fn has_branches(&self) -> bool {
        self.instrs.iter().any(Instr::is_branch)
    }
}

/// Builder for IL fragments.
#[derive(Default)]
pub struct IlBuilder {
    fragment: IlFragment,
}

impl IlBuilder {
    /// Create an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragment: IlFragment {
                instrs: Vec::new(),
                labels: Vec::new(),
            },
        }
    }

    /// Allocate a fresh, unmarked label.
    pub fn new_label(&mut self) -> Label {
        let idx = u32::try_from(self.fragment.labels.len()).unwrap_or(u32::MAX);
        self.fragment.labels.push(None);
        Label(idx)
    }

    /// Bind a label to the position of the next instruction.
    #[must_use]
    pub fn mark_label(mut self, label: Label) -> Self {
        let pos = self.fragment.instrs.len();
        if let Some(slot) = self.fragment.labels.get_mut(label.index()) {
            debug_assert!(slot.is_none(), "label {label} marked twice");
            *slot = Some(pos);
        }
        self
    }

    /// Write to a register.
    #[must_use]
    pub fn set_reg(self, size: u8, reg: RegId, value: Expr) -> Self {
        self.instr(Instr::set_reg(size, reg, value))
    }

    /// Add a two-way conditional branch.
    #[must_use]
    pub fn if_else(self, cond: Expr, then_label: Label, else_label: Label) -> Self {
        self.instr(Instr::if_else(cond, then_label, else_label))
    }

    /// Add an unconditional jump.
    #[must_use]
    pub fn goto(self, label: Label) -> Self {
        self.instr(Instr::Goto(label))
    }

    /// Add a raw instruction.
    #[must_use]
    pub fn instr(mut self, instr: Instr) -> Self {
        self.fragment.instrs.push(instr);
        self
    }

    /// Finish the fragment.
    #[must_use]
    pub fn build(self) -> IlFragment {
        self.fragment
    }
}
