use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
    sync::Mutex,
};

use test_harness::OutputStream;

/// Serializes tests that touch process environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Clonable in-memory stream so tests can read back reporter output.
#[derive(Clone, Default)]
pub struct BufStream(Rc<RefCell<Vec<u8>>>);

impl BufStream {
    pub fn stream(&self) -> OutputStream {
        Rc::new(RefCell::new(self.clone()))
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for BufStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
