//! Parallel lifting of a contiguous code buffer.

use a64x_il::LowLevelILFunction;
use rayon::prelude::*;
use tracing::debug;

use crate::generic::INSTRUCTION_SIZE;
use crate::hook::BaseArchitecture;
use crate::metrics;

/// One instruction slot of a lifted region.
#[derive(Debug)]
pub struct LiftedInstruction {
    pub address: u64,
    pub length: usize,
    pub lifted: bool,
    pub il: LowLevelILFunction,
}

/// Lift every 4-byte slot of `code` on the current rayon pool.
///
/// Results are ordered by address. A trailing partial slot is still passed
/// to the architecture, which decides what to do with it.
pub fn lift_region(arch: &dyn BaseArchitecture, code: &[u8], base: u64) -> Vec<LiftedInstruction> {
    let lifted: Vec<LiftedInstruction> = code
        .par_chunks(INSTRUCTION_SIZE)
        .enumerate()
        .map(|(idx, bytes)| {
            let address = base.wrapping_add((idx * INSTRUCTION_SIZE) as u64);
            let mut il = LowLevelILFunction::new();
            il.set_current_address(address);
            let outcome = arch.instruction_llil(bytes, address, &mut il);
            LiftedInstruction {
                address,
                length: outcome.length,
                lifted: outcome.lifted,
                il,
            }
        })
        .collect();

    let count = lifted.iter().filter(|insn| insn.lifted).count();
    debug!(slots = lifted.len(), lifted = count, "lifted region");
    metrics::record_region(lifted.len(), count);
    lifted
}

/// Lift a region on a dedicated pool of `jobs` threads (`0` = auto).
///
/// # Errors
///
/// Fails if the thread pool cannot be built.
pub fn lift_region_with_jobs(
    arch: &dyn BaseArchitecture,
    code: &[u8],
    base: u64,
    jobs: usize,
) -> Result<Vec<LiftedInstruction>, rayon::ThreadPoolBuildError> {
    let threads = if jobs == 0 {
        num_cpus::get().saturating_sub(2).max(1)
    } else {
        jobs
    };
    debug!(threads, "building lift pool");
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool.install(|| lift_region(arch, code, base)))
}
