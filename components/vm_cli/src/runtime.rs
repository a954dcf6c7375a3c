//! Loading images and driving the VM
//!
//! The [`Runtime`] owns a VM with the built-ins installed. It detects
//! whether an image is a single module or a bundle by its magic bytes,
//! runs it, and reports what the CLI flags ask for on the VM's output.

use crate::error::{CliError, CliResult};
use builtins::display_value;
use bytecode_system::{detect_image, Bundle, ImageKind, Module};
use core_types::{ObjectId, Value};
use interpreter::{Vm, VmConfig, VmError};
use std::io::Write;
use std::path::Path;

/// Runs compiled images in a VM with the built-ins installed.
pub struct Runtime {
    vm: Vm,
    print_bytecode: bool,
    print_exports: bool,
}

impl Runtime {
    /// Create a runtime with the given VM configuration
    ///
    /// # Example
    /// ```
    /// use interpreter::VmConfig;
    /// use vm_cli::Runtime;
    ///
    /// let runtime = Runtime::new(VmConfig::default()).unwrap();
    /// ```
    pub fn new(config: VmConfig) -> CliResult<Self> {
        let mut vm = Vm::new(config);
        builtins::install(&mut vm)?;
        Ok(Runtime {
            vm,
            print_bytecode: false,
            print_exports: false,
        })
    }

    /// Enable disassembly output before execution
    pub fn with_print_bytecode(mut self, enabled: bool) -> Self {
        self.print_bytecode = enabled;
        self
    }

    /// Enable printing the entry module's exports after execution
    pub fn with_print_exports(mut self, enabled: bool) -> Self {
        self.print_exports = enabled;
        self
    }

    /// The underlying VM.
    pub fn vm(&mut self) -> &mut Vm {
        &mut self.vm
    }

    /// Reads and runs an image file, returning the exports object of the
    /// module that was run.
    ///
    /// # Errors
    /// I/O and format errors, unknown magic, and anything the VM raises.
    pub fn execute_file(&mut self, path: impl AsRef<Path>) -> CliResult<ObjectId> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::debug!("read {} ({} bytes)", path.display(), bytes.len());
        self.execute_bytes(&bytes)
    }

    /// Runs an in-memory image.
    pub fn execute_bytes(&mut self, bytes: &[u8]) -> CliResult<ObjectId> {
        let exports = match detect_image(bytes) {
            Some(ImageKind::Module) => {
                let module = Module::from_bytes(bytes)?;
                if self.print_bytecode {
                    self.write(&module.disassemble())?;
                }
                let id = self.vm.load_module(module);
                self.vm.run_module(id)?
            }
            Some(ImageKind::Bundle) => {
                let bundle = Bundle::from_bytes(bytes)?;
                if self.print_bytecode {
                    for module in bundle.modules() {
                        self.write(&module.disassemble())?;
                    }
                }
                self.vm.run_entry(bundle)?
            }
            None => {
                let magic = bytes.iter().take(4).copied().collect();
                return Err(CliError::UnknownImage(magic));
            }
        };
        if self.print_exports {
            let listing = self.render_exports(exports)?;
            self.write(&listing)?;
        }
        Ok(exports)
    }

    /// One `name: value` line per own export, in property order.
    pub fn render_exports(&mut self, exports: ObjectId) -> CliResult<String> {
        let mut out = String::new();
        for name in self.vm.own_keys(exports)? {
            let value = self
                .vm
                .get_property(&Value::Object(exports), &name.clone().into())?;
            out.push_str(&format!("{}: {}\n", name, display_value(&self.vm, &value)));
        }
        Ok(out)
    }

    fn write(&mut self, text: &str) -> CliResult<()> {
        let output = self.vm.output();
        output.write_all(text.as_bytes())?;
        output.flush()?;
        Ok(())
    }
}

/// The diagnostic printed for an error leaving the VM: the error on the
/// first line, then where it was raised and the frames it unwound.
pub fn diagnostic(error: &VmError) -> String {
    let mut out = error.to_string();
    if let Some(position) = error.position() {
        out.push_str(&format!("\n    at {}", position));
    }
    if let Some(exception) = error.exception() {
        for frame in &exception.stack {
            out.push_str(&format!("\n    {}", frame));
        }
    }
    out
}
