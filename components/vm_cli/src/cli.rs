//! Command-line arguments

use clap::Parser;
use interpreter::VmConfig;
use log::LevelFilter;
use std::path::PathBuf;

/// Runs a compiled module (`.AxM`) or bundle (`.AxB`).
#[derive(Debug, Parser)]
#[command(name = "corten-vm", version, about)]
pub struct Cli {
    /// Module or bundle image to run
    pub file: PathBuf,

    /// Print the disassembly of every loaded module before running
    #[arg(long)]
    pub print_bytecode: bool,

    /// Print the entry module's exports after running
    #[arg(long)]
    pub print_exports: bool,

    /// Allocations between automatic collections (0 disables them)
    #[arg(long, value_name = "COUNT")]
    pub gc_threshold: Option<usize>,

    /// Operand stack capacity in values
    #[arg(long, value_name = "VALUES")]
    pub stack_size: Option<usize>,

    /// Maximum nesting of calls
    #[arg(long, value_name = "DEPTH")]
    pub max_call_depth: Option<usize>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// VM configuration with the overrides given on the command line.
    pub fn vm_config(&self) -> VmConfig {
        let mut config = VmConfig::default();
        if let Some(size) = self.stack_size {
            config = config.with_stack_size(size);
        }
        if let Some(depth) = self.max_call_depth {
            config = config.with_max_call_depth(depth);
        }
        if let Some(threshold) = self.gc_threshold {
            config = config.with_gc_threshold(threshold);
        }
        config
    }

    /// Default log level; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
