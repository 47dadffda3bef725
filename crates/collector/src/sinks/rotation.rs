//! Rotation engine - decides which file the next write lands in
//!
//! Files are named `<prefix>[-<YYYY_MM_DD>][-(<n>)].log` inside the sink
//! directory. The date part is present whenever daily rotation is on; the
//! `(n)` part is added by size rotation and is the first free index.
//!
//! The size cap is soft: it is checked before a write, so one file can end
//! up larger than the cap by at most one record. A file picked by size
//! rotation stays the target until it crosses the cap itself or the day
//! changes. This deliberately differs from recomputing the target from the
//! plain base name on every write, which would alternate between the
//! oversized base file and a fresh `(n)` file.
//!
//! At most one file handle is open: the previous file is flushed and released
//! before the next one is opened.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

/// Extension of every file written by the sink
pub const LOG_EXTENSION: &str = ".log";

/// `chrono` format of the date part of a file name
pub const DATE_SUFFIX_FORMAT: &str = "%Y_%m_%d";

/// When to move on to a new file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size threshold in bytes, `<= 0` disables size rotation
    pub max_size_bytes: i64,
    /// Start a new file every calendar day
    pub rotate_daily: bool,
}

impl RotationPolicy {
    /// Size limit, if size rotation is enabled
    pub fn size_limit(&self) -> Option<u64> {
        u64::try_from(self.max_size_bytes).ok().filter(|&max| max > 0)
    }
}

/// Why a write landed in a different file than the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReason {
    /// First file opened by this sink
    Initial,
    /// The calendar day changed
    Daily,
    /// The previous file grew past the size limit
    Size,
}

/// What a write did to the set of open files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSwitch {
    /// Written to the same file as before
    Unchanged,
    /// A new file was opened before writing
    Opened { path: PathBuf, reason: SwitchReason },
}

/// Join a file name stem and a suffix part with `-`
pub fn join_name(base: &str, part: &str) -> String {
    format!("{base}-{part}")
}

/// True when nothing was written yet today
pub fn should_rotate_by_time(last_write: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_write != Some(today)
}

/// First `<base>-(n)` stem, n = 1, 2, ..., whose `.log` file does not exist
pub fn next_size_rotated_name(base: &str) -> io::Result<String> {
    let mut index: u64 = 1;
    loop {
        let candidate = join_name(base, &format!("({index})"));
        if !Path::new(&log_file_name(&candidate)).try_exists()? {
            return Ok(candidate);
        }
        index += 1;
    }
}

fn log_file_name(stem: &str) -> String {
    format!("{stem}{LOG_EXTENSION}")
}

struct OpenLog {
    file: File,
    path: PathBuf,
    stem: String,
}

/// The file a sink is currently appending to, plus the rules for leaving it
pub struct RotatingFile {
    dir: PathBuf,
    prefix: String,
    policy: RotationPolicy,
    current: Option<OpenLog>,
    last_write_date: Option<NaiveDate>,
}

impl RotatingFile {
    /// Create a rotating file; nothing is opened until the first write
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, policy: RotationPolicy) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            policy,
            current: None,
            last_write_date: None,
        }
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Path of the open file, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|open| open.path.as_path())
    }

    pub fn last_write_date(&self) -> Option<NaiveDate> {
        self.last_write_date
    }

    /// Append `payload` using today's local date
    pub fn write(&mut self, payload: &[u8]) -> io::Result<FileSwitch> {
        self.write_on(payload, Local::now().date_naive())
    }

    /// Append `payload` as if the current local date were `today`
    pub fn write_on(&mut self, payload: &[u8], today: NaiveDate) -> io::Result<FileSwitch> {
        let base = self.base_name(today);
        let (stem, reason) = self.select_target(&base, today)?;
        let switch = self.open_target(stem, reason)?;

        let open = self
            .current
            .as_mut()
            .ok_or_else(|| io::Error::other("no log file open"))?;
        open.file.write_all(payload)?;
        self.last_write_date = Some(today);

        Ok(switch)
    }

    /// True when a file is open and already larger than the size limit
    pub fn should_rotate_by_size(&self) -> bool {
        let (Some(limit), Some(open)) = (self.policy.size_limit(), &self.current) else {
            return false;
        };
        open.file
            .metadata()
            .map(|meta| meta.len() > limit)
            .unwrap_or(false)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.current.as_mut() {
            Some(open) => open.file.flush(),
            None => Ok(()),
        }
    }

    /// Flush and release the open file; a no-op when nothing was opened
    pub fn close(&mut self) -> io::Result<()> {
        match self.current.take() {
            Some(mut open) => {
                debug!(path = %open.path.display(), "Closing log file");
                open.file.flush()
            }
            None => Ok(()),
        }
    }

    fn base_name(&self, today: NaiveDate) -> String {
        let base = self.dir.join(&self.prefix).to_string_lossy().into_owned();
        if self.policy.rotate_daily {
            join_name(&base, &today.format(DATE_SUFFIX_FORMAT).to_string())
        } else {
            base
        }
    }

    fn select_target(&self, base: &str, today: NaiveDate) -> io::Result<(String, SwitchReason)> {
        match &self.current {
            None => Ok((base.to_string(), SwitchReason::Initial)),
            Some(_) if self.policy.rotate_daily && should_rotate_by_time(self.last_write_date, today) => {
                Ok((base.to_string(), SwitchReason::Daily))
            }
            Some(_) if self.should_rotate_by_size() => {
                Ok((next_size_rotated_name(base)?, SwitchReason::Size))
            }
            Some(open) => Ok((open.stem.clone(), SwitchReason::Initial)),
        }
    }

    fn open_target(&mut self, stem: String, reason: SwitchReason) -> io::Result<FileSwitch> {
        if self.current.as_ref().is_some_and(|open| open.stem == stem) {
            return Ok(FileSwitch::Unchanged);
        }

        // A failed flush leaves the previous file as the target
        if let Some(previous) = self.current.as_mut() {
            previous.file.flush()?;
        }
        if let Some(previous) = self.current.take() {
            debug!(path = %previous.path.display(), "Released log file");
        }

        let path = PathBuf::from(log_file_name(&stem));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), ?reason, "Opened log file");

        self.current = Some(OpenLog {
            file,
            path: path.clone(),
            stem,
        });
        Ok(FileSwitch::Opened { path, reason })
    }
}
