//! File sinks
//!
//! Log files are named `<filename prefix><domain name>.log`. A file is opened,
//! truncated, on first use and then kept open for the rest of the process; all
//! sinks writing to the same path share one handle.

use crate::core::{
    FormattingBuffer, LoggerError, Result, Sink, SinkContext, SinkKind, SinkTarget,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

static OPEN_FILES: Lazy<Mutex<HashMap<PathBuf, SinkTarget>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Path of the log file for `domain` (a fully qualified name, `.` for the root)
pub fn log_file_path(filename_prefix: &str, domain: &str) -> PathBuf {
    let name = if domain == "." { "" } else { domain };
    PathBuf::from(format!("{}{}.log", filename_prefix, name))
}

fn open_shared(context: &SinkContext, domain: &str, sink: SinkKind) -> Result<SinkTarget> {
    let prefix = context.filename_prefix.as_deref().ok_or_else(|| {
        LoggerError::config(
            "filename prefix",
            format!("must be set before the {} sink of '{}' is used", sink, domain),
        )
    })?;
    let path = log_file_path(prefix, domain);

    let mut open_files = OPEN_FILES.lock();
    if let Some(target) = open_files.get(&path) {
        return Ok(target.clone());
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| {
            LoggerError::sink_construction(
                sink.to_str(),
                format!("cannot open '{}': {}", path.display(), e),
            )
        })?;
    lock_file(&file, &path);

    let target = SinkTarget::formatting(FormattingBuffer::new(
        Box::new(BufWriter::new(file)),
        false,
    ));
    open_files.insert(path, target.clone());
    Ok(target)
}

#[cfg(feature = "file")]
fn lock_file(file: &File, path: &std::path::Path) {
    use fs2::FileExt;

    if file.try_lock_exclusive().is_err() {
        eprintln!(
            "[DOMAIN LOGGER WARNING] '{}' is locked by another process; writing anyway",
            path.display()
        );
    }
}

#[cfg(not(feature = "file"))]
fn lock_file(_file: &File, _path: &std::path::Path) {}

/// One file per domain; subdomains that inherit it get their own file
pub struct FileSink {
    domain: String,
}

impl FileSink {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Sink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn target(&self, context: &SinkContext) -> Result<SinkTarget> {
        open_shared(context, &self.domain, SinkKind::File)
    }

    fn for_subdomain(self: Arc<Self>, full_name: &str) -> Arc<dyn Sink> {
        Arc::new(FileSink::new(full_name))
    }
}

/// One file for the whole subtree of the domain it was configured on
pub struct CombinedFileSink {
    domain: String,
}

impl CombinedFileSink {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Sink for CombinedFileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::CombinedFile
    }

    fn target(&self, context: &SinkContext) -> Result<SinkTarget> {
        open_shared(context, &self.domain, SinkKind::CombinedFile)
    }

    fn for_subdomain(self: Arc<Self>, _full_name: &str) -> Arc<dyn Sink> {
        self
    }
}
