//! Register identifiers and metadata.

use std::fmt;

/// Register identifier assigned by a register catalog.
///
/// Ids are opaque to the IL; only the catalog that handed them out knows
/// which architectural register they name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RegId(pub u32);

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Register metadata reported by a register catalog.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RegisterInfo {
    /// Width in bytes (4 for W registers, 8 for X registers).
    pub size: u8,
}

impl RegisterInfo {
    #[must_use]
    pub const fn new(size: u8) -> Self {
        Self { size }
    }
}

/// All-ones mask covering `size` bytes.
#[must_use]
pub const fn size_mask(size: u8) -> u64 {
    if size >= 8 {
        u64::MAX
    } else {
        (1u64 << (size as u32 * 8)) - 1
    }
}
