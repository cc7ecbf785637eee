//! Sink trait for log output destinations

use super::error::Result;
use super::formatting_buffer::FormattingBuffer;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

/// Raw character sink without color or padding support
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Character sink that understands color and multi-line padding requests
pub type SharedFormattingBuffer = Arc<Mutex<FormattingBuffer>>;

/// Underlying character sink handed out by a [`Sink`]
#[derive(Clone)]
pub enum SinkTarget {
    Raw(SharedWriter),
    Formatting(SharedFormattingBuffer),
}

impl SinkTarget {
    pub fn raw<W: Write + Send + 'static>(writer: W) -> Self {
        SinkTarget::Raw(Arc::new(Mutex::new(writer)))
    }

    pub fn formatting(buffer: FormattingBuffer) -> Self {
        SinkTarget::Formatting(Arc::new(Mutex::new(buffer)))
    }
}

impl fmt::Debug for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkTarget::Raw(_) => f.write_str("SinkTarget::Raw"),
            SinkTarget::Formatting(_) => f.write_str("SinkTarget::Formatting"),
        }
    }
}

/// Registry-wide settings a sink may need when it opens its target
#[derive(Debug, Clone, Default)]
pub struct SinkContext {
    pub filename_prefix: Option<String>,
}

/// Sink types known to the sink factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Stream,
    File,
    CombinedFile,
    Speech,
    Memory,
}

impl SinkKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            SinkKind::Stream => "stream",
            SinkKind::File => "file",
            SinkKind::CombinedFile => "combined_file",
            SinkKind::Speech => "speech",
            SinkKind::Memory => "memory",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "stream" => Ok(SinkKind::Stream),
            "file" => Ok(SinkKind::File),
            "combined_file" => Ok(SinkKind::CombinedFile),
            "speech" => Ok(SinkKind::Speech),
            "memory" => Ok(SinkKind::Memory),
            _ => Err(format!("unknown sink type '{}'", s)),
        }
    }
}

/// A destination for formatted log text attached to a domain.
///
/// Sinks are shared between domains. Opening the underlying target is lazy:
/// [`Sink::target`] is called when a domain builds its composite stream, so
/// failures such as a missing filename prefix surface on first write.
pub trait Sink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// The underlying character sink
    fn target(&self, context: &SinkContext) -> Result<SinkTarget>;

    /// Sink used by a subdomain that inherits this one
    fn for_subdomain(self: Arc<Self>, full_name: &str) -> Arc<dyn Sink>;
}
