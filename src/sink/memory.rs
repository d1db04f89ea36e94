use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// An in-memory sink. Clones share one buffer.
///
/// Handy for tests and for surfacing recent log output without touching the
/// filesystem.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self { Self::default() }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

/// Writer handed out per log entry; holds the buffer lock until dropped.
pub struct MemoryWriter<'a>(MutexGuard<'a, Vec<u8>>);

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl<'a> MakeWriter<'a> for MemorySink {
    type Writer = MemoryWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        MemoryWriter(self.buf.lock())
    }
}
