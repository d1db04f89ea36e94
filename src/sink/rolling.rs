//! Size-rotated, append-only log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// A log file that is rotated once it would grow past `max_bytes`.
///
/// The active file always lives at `path`. On rotation it is renamed to
/// `<stem>.<YYYY-MM-DD_HH-MM-SS_ffffff>.<ext>` in the same directory and a
/// fresh file takes its place.
///
/// [`MakeWriter::make_writer`] holds the file lock for the lifetime of the
/// returned writer. `tracing-subscriber` formats each event into a buffer
/// and writes it through one writer, so concurrent entries never interleave.
#[derive(Debug)]
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    active: Mutex<Active>,
}

#[derive(Debug)]
struct Active {
    file: File,
    written: u64,
}

impl RollingFile {
    /// Opens (or creates) `path` for appending, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64) -> io::Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            active: Mutex::new(Active { file, written }),
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn rotate(&self, active: &mut Active) -> io::Result<()> {
        active.file.flush()?;
        fs::rename(&self.path, rotated_name(&self.path))?;
        active.file = open_append(&self.path)?;
        active.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Timestamped sibling of `path` that does not exist yet.
fn rotated_name(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S_%6f").to_string();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
    let ext = path.extension().and_then(|e| e.to_str());

    let mut tag = stamp.clone();
    let mut n = 1;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem}.{tag}.{ext}"),
            None => format!("{stem}.{tag}"),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        tag = format!("{stamp}-{n}");
        n += 1;
    }
}

/// Writer handed out per log entry; holds the file lock until dropped.
pub struct RollingWriter<'a> {
    owner: &'a RollingFile,
    active: MutexGuard<'a, Active>,
}

impl Write for RollingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let incoming = buf.len() as u64;
        if self.active.written > 0 && self.active.written + incoming > self.owner.max_bytes {
            self.owner.rotate(&mut self.active)?;
        }
        let n = self.active.file.write(buf)?;
        self.active.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter { owner: self, active: self.active.lock() }
    }
}
