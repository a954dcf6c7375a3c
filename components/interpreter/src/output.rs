//! Output sink for the `print` family of natives

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// An in-memory sink whose clones share one buffer.
///
/// Hand one clone to [`Vm::set_output`](crate::Vm::set_output) and keep
/// another to read what the script printed.
///
/// # Examples
///
/// ```
/// use interpreter::SharedOutput;
/// use std::io::Write;
///
/// let out = SharedOutput::new();
/// let mut writer = out.clone();
/// writeln!(writer, "5").unwrap();
/// assert_eq!(out.contents(), "5\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Discard the buffered output
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
