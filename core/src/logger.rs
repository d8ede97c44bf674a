// Boot-time log ring for BootSelectWB
//
// There is no console this early in boot, so `log` records are kept in a small
// in-memory ring instead of being printed. A debugger or a later tool can read
// them back through the iterators below.

use core::fmt::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub const MAX_LOG_ENTRIES: usize = 32;

/// Longer messages are cut at a character boundary
pub const MAX_MESSAGE_LEN: usize = 60;

/// One stored record
#[derive(Clone, Copy)]
pub struct LogEntry {
    level: Level,
    len: u8,
    text: [u8; MAX_MESSAGE_LEN],
}

impl LogEntry {
    const EMPTY: LogEntry = LogEntry {
        level: Level::Trace,
        len: 0,
        text: [0; MAX_MESSAGE_LEN],
    };

    fn format(level: Level, args: fmt::Arguments<'_>) -> Self {
        let mut entry = Self::EMPTY;
        entry.level = level;
        // Truncation is not an error, the writer just stops taking bytes
        let _ = entry.write_fmt(args);
        entry
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.text[..self.len as usize]).unwrap_or("")
    }
}

impl Write for LogEntry {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            let mut buf = [0u8; 4];
            let bytes = ch.encode_utf8(&mut buf).as_bytes();
            let start = self.len as usize;
            let end = start + bytes.len();
            if end > MAX_MESSAGE_LEN {
                break;
            }
            self.text[start..end].copy_from_slice(bytes);
            self.len = end as u8;
        }
        Ok(())
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message())
    }
}

struct Ring {
    entries: [LogEntry; MAX_LOG_ENTRIES],
    count: usize, // Total records written, wraps the ring
}

/// Fixed-size ring of log entries; oldest entries are overwritten when full
pub struct LogRing {
    inner: Mutex<Ring>,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Ring {
                entries: [LogEntry::EMPTY; MAX_LOG_ENTRIES],
                count: 0,
            }),
        }
    }

    pub fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        // Format before taking the lock
        let entry = LogEntry::format(level, args);

        let mut ring = self.inner.lock();
        let idx = ring.count % MAX_LOG_ENTRIES;
        ring.entries[idx] = entry;
        ring.count += 1;
    }

    /// All retained entries, oldest first
    pub fn iter(&self) -> LogIterator<'_> {
        self.last_n(MAX_LOG_ENTRIES)
    }

    /// The newest `n` retained entries, oldest first
    pub fn last_n(&self, n: usize) -> LogIterator<'_> {
        let total = self.total_count();
        let num_logs = n.min(total.min(MAX_LOG_ENTRIES));

        LogIterator {
            ring: self,
            start_idx: (total - num_logs) % MAX_LOG_ENTRIES,
            current: 0,
            remaining: num_logs,
        }
    }

    /// Entries currently retained
    pub fn count(&self) -> usize {
        self.total_count().min(MAX_LOG_ENTRIES)
    }

    /// Entries ever written
    pub fn total_count(&self) -> usize {
        self.inner.lock().count
    }

    pub fn clear(&self) {
        self.inner.lock().count = 0;
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ring entries in chronological order
///
/// Each step copies one entry out under the lock.
pub struct LogIterator<'a> {
    ring: &'a LogRing,
    start_idx: usize,
    current: usize,
    remaining: usize,
}

impl Iterator for LogIterator<'_> {
    type Item = LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = (self.start_idx + self.current) % MAX_LOG_ENTRIES;
        self.current += 1;
        self.remaining -= 1;

        Some(self.ring.inner.lock().entries[idx])
    }
}

static RING: LogRing = LogRing::new();

/// `log` backend writing into a ring
pub struct RingLogger {
    ring: &'static LogRing,
}

impl RingLogger {
    pub const fn new(ring: &'static LogRing) -> Self {
        Self { ring }
    }
}

static LOGGER: RingLogger = RingLogger::new(&RING);

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.ring.push(record.level(), *record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the ring logger
///
/// Does nothing if another logger is already installed.
#[cfg(target_has_atomic = "ptr")]
pub fn init(max_level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(max_level);
    }
}

/// Install the ring logger without synchronisation
///
/// # Safety
/// No other code may be setting or reading the logger concurrently. Holds
/// during cold start, where only one task exists.
pub unsafe fn init_racy(max_level: LevelFilter) {
    if log::set_logger_racy(&LOGGER).is_ok() {
        log::set_max_level_racy(max_level);
    }
}

pub fn get_logs_iter() -> LogIterator<'static> {
    RING.iter()
}

/// Get the last N log entries (up to MAX_LOG_ENTRIES)
pub fn get_last_n_logs(n: usize) -> LogIterator<'static> {
    RING.last_n(n)
}

pub fn log_count() -> usize {
    RING.count()
}

pub fn total_log_count() -> usize {
    RING.total_count()
}

pub fn clear() {
    RING.clear();
}
