//! Corten VM CLI
//!
//! Entry point for running compiled images. Parses CLI arguments and
//! delegates to the Runtime for execution.

use clap::Parser as _;
use std::process::ExitCode;
use vm_cli::error::{EXIT_SOFTWARE, EXIT_USAGE};
use vm_cli::runtime::diagnostic;
use vm_cli::{Cli, CliError, Runtime};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE as u8)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let result = Runtime::new(cli.vm_config()).and_then(|runtime| {
        runtime
            .with_print_bytecode(cli.print_bytecode)
            .with_print_exports(cli.print_exports)
            .execute_file(&cli.file)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(CliError::Vm(e)) => {
            eprintln!("{}", diagnostic(&e));
            ExitCode::from(EXIT_SOFTWARE as u8)
        }
        Err(e) => {
            eprintln!("Error: '{}': {}", cli.file.display(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
