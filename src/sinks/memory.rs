//! In-memory sink

use crate::core::{FormattingBuffer, Result, Sink, SinkContext, SinkKind, SinkTarget};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Clone, Default)]
struct SharedBytes(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBytes {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects everything written to it; shared with subdomains
///
/// # Example
///
/// ```
/// use rust_domain_logger::prelude::*;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let registry = DomainRegistry::builder().root_sink(sink.clone()).build();
/// let site = CallSite::new("demo", "main", "demo.rs", 1);
/// emit(registry.root(), &site, LogLevel::User, &[LogValue::Text("hi".into())]);
/// assert_eq!(sink.contents(), "hi\n");
/// ```
pub struct MemorySink {
    bytes: SharedBytes,
    target: SinkTarget,
}

impl MemorySink {
    pub fn new() -> Self {
        let bytes = SharedBytes::default();
        let target = SinkTarget::formatting(FormattingBuffer::new(Box::new(bytes.clone()), false));
        Self { bytes, target }
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.0.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.0.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn kind(&self) -> SinkKind {
        SinkKind::Memory
    }

    fn target(&self, _context: &SinkContext) -> Result<SinkTarget> {
        Ok(self.target.clone())
    }

    fn for_subdomain(self: Arc<Self>, _full_name: &str) -> Arc<dyn Sink> {
        self
    }
}
