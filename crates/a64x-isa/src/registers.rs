//! Register metadata catalog.

use a64x_il::{RegId, RegisterInfo};
use rustc_hash::FxHashMap;

/// Read-only register metadata, supplied by the host architecture.
pub trait RegisterCatalog: Send + Sync {
    /// Look up a register id by its name.
    fn register_by_name(&self, name: &str) -> Option<RegId>;

    /// Metadata for a register id.
    fn register_info(&self, reg: RegId) -> Option<RegisterInfo>;
}

// Register numbering used by `Aarch64Registers`.
const X_BASE: u32 = 0;
const SP: u32 = 31;
const XZR: u32 = 32;
const W_BASE: u32 = 33;
const WSP: u32 = 64;
const WZR: u32 = 65;
const NUM_REGS: u32 = 66;

/// Id of the 64-bit general purpose register `xN` (`n` in 0..=30).
#[must_use]
pub const fn x(n: u32) -> RegId {
    RegId(X_BASE + n)
}

/// Id of the 32-bit general purpose register `wN` (`n` in 0..=30).
#[must_use]
pub const fn w(n: u32) -> RegId {
    RegId(W_BASE + n)
}

pub const REG_SP: RegId = RegId(SP);
pub const REG_XZR: RegId = RegId(XZR);
pub const REG_WSP: RegId = RegId(WSP);
pub const REG_WZR: RegId = RegId(WZR);

/// Catalog of the AArch64 general purpose register file.
///
/// Names follow the decoding engine (`x0`..`x30`, `w0`..`w30`, `sp`,
/// `wsp`, `xzr`, `wzr`); `fp` and `lr` are accepted as aliases for `x29`
/// and `x30`.
pub struct Aarch64Registers {
    by_name: FxHashMap<String, RegId>,
    names: Vec<String>,
}

impl Aarch64Registers {
    #[must_use]
    pub fn new() -> Self {
        let mut names = Vec::with_capacity(NUM_REGS as usize);
        names.extend((0..31).map(|n| format!("x{n}")));
        names.push("sp".to_string());
        names.push("xzr".to_string());
        names.extend((0..31).map(|n| format!("w{n}")));
        names.push("wsp".to_string());
        names.push("wzr".to_string());

        let mut by_name: FxHashMap<String, RegId> = names
            .iter()
            .zip(0..)
            .map(|(name, id)| (name.clone(), RegId(id)))
            .collect();
        by_name.insert("fp".to_string(), x(29));
        by_name.insert("lr".to_string(), x(30));

        Self { by_name, names }
    }

    /// Canonical name of a register id.
    #[must_use]
    pub fn name(&self, reg: RegId) -> Option<&str> {
        self.names.get(reg.0 as usize).map(String::as_str)
    }
}

impl Default for Aarch64Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterCatalog for Aarch64Registers {
    fn register_by_name(&self, name: &str) -> Option<RegId> {
        self.by_name.get(name).copied()
    }

    fn register_info(&self, reg: RegId) -> Option<RegisterInfo> {
        match reg.0 {
            X_BASE..=XZR => Some(RegisterInfo::new(8)),
            W_BASE..=WZR => Some(RegisterInfo::new(4)),
            _ => None,
        }
    }
}
