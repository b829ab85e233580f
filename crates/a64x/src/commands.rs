//! Command implementations.

use std::sync::Arc;

use a64x::il::LowLevelILFunction;
use a64x::{
    ArchitectureRegistry, BASE_ARCHITECTURE, BaseArchitecture, GenericAarch64, LiftedInstruction,
    PluginError, lift_region_with_jobs, plugin_init,
};
use console::style;
use tracing::debug;

use crate::cli::{Cli, CliError, Commands, EXIT_FAILURE, EXIT_SUCCESS, parse_hex};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    let result = match &cli.command {
        Commands::Lift { bytes, address } => cmd_lift(bytes, *address),
        Commands::Region {
            bytes,
            address,
            jobs,
        } => cmd_region(bytes, *address, *jobs),
    };
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            EXIT_FAILURE
        }
    }
}

/// Generic base hooked by the extension.
fn hooked_architecture() -> Result<Arc<dyn BaseArchitecture>, CliError> {
    let registry = ArchitectureRegistry::new();
    registry.register(Arc::new(GenericAarch64::new()));
    plugin_init(&registry)?;
    let arch = registry
        .get_by_name(BASE_ARCHITECTURE)
        .ok_or_else(|| PluginError::BaseArchitectureMissing(BASE_ARCHITECTURE.to_string()))?;
    Ok(arch)
}

fn cmd_lift(hex: &str, address: u64) -> Result<(), CliError> {
    let bytes = parse_hex(hex)?;
    let arch = hooked_architecture()?;

    let mut il = LowLevelILFunction::new();
    il.set_current_address(address);
    let outcome = arch.instruction_llil(&bytes, address, &mut il);
    debug!(length = outcome.length, lifted = outcome.lifted, "lift finished");

    print_instruction(&LiftedInstruction {
        address,
        length: outcome.length,
        lifted: outcome.lifted,
        il,
    });
    Ok(())
}

fn cmd_region(hex: &str, address: u64, jobs: usize) -> Result<(), CliError> {
    let bytes = parse_hex(hex)?;
    let arch = hooked_architecture()?;
    let lifted = lift_region_with_jobs(arch.as_ref(), &bytes, address, jobs)?;
    for insn in &lifted {
        print_instruction(insn);
    }
    let count = lifted.iter().filter(|insn| insn.lifted).count();
    eprintln!(
        "{} {count}/{} instructions produced IL",
        style("✓").green().bold(),
        lifted.len()
    );
    Ok(())
}

fn print_instruction(insn: &LiftedInstruction) {
    let header = format!("{:#010x}  ({} bytes)", insn.address, insn.length);
    if insn.lifted {
        println!("{}", style(header).cyan());
    } else {
        println!("{} {}", style(header).yellow(), style("no IL").dim());
    }
    for line in insn.il.to_string().lines() {
        println!("    {line}");
    }
}
