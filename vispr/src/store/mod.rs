//! Durable storage for the broadcast counter.
//!
//! Persisting the last-used counter lets a talker resume above every value
//! it has already broadcast after a restart. Listeners treat the counter as
//! an anti-replay sequence, so restarting from an already-seen value would
//! get fresh frames discarded as replays.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Load/save interface for the broadcast counter.
///
/// Callers load the stored value once to seed a talker's start counter;
/// a store attached to the talker is then written after each broadcast.
pub trait CounterStore: Send + Sync {
    /// Loads the last saved counter, or `None` if nothing was stored yet.
    fn load(&self) -> io::Result<Option<u64>>;

    /// Persists the counter.
    fn save(&mut self, counter: u64) -> io::Result<()>;
}

/// Counter storage in a single file holding the value as eight
/// little-endian bytes.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    /// Creates a store backed by the given file path. The file is created
    /// on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CounterStore for FileCounterStore {
    fn load(&self) -> io::Result<Option<u64>> {
        let mut file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let counter = file.read_u64::<LittleEndian>()?;
        Ok(Some(counter))
    }

    fn save(&mut self, counter: u64) -> io::Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_u64::<LittleEndian>(counter)?;
        fs::write(&self.path, buf)
    }
}

/// In-memory store, mainly for tests and short-lived talkers.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counter: Option<u64>,
}

impl MemoryCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn load(&self) -> io::Result<Option<u64>> {
        Ok(self.counter)
    }

    fn save(&mut self, counter: u64) -> io::Result<()> {
        self.counter = Some(counter);
        Ok(())
    }
}
