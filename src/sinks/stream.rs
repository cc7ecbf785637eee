//! Console stream sink

use crate::core::{
    FormattingBuffer, LoggerError, Result, Sink, SinkContext, SinkKind, SinkTarget,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamId {
    Stdout,
    Stderr,
}

impl StreamId {
    pub fn to_str(&self) -> &'static str {
        match self {
            StreamId::Stdout => "stdout",
            StreamId::Stderr => "stderr",
        }
    }
}

/// Writes to stdout or stderr; colors only when the stream is a terminal
pub struct StreamSink {
    id: StreamId,
    target: OnceCell<SinkTarget>,
}

impl StreamSink {
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            target: OnceCell::new(),
        }
    }

    pub fn stdout() -> Arc<dyn Sink> {
        Arc::new(Self::new(StreamId::Stdout))
    }

    pub fn stderr() -> Arc<dyn Sink> {
        Arc::new(Self::new(StreamId::Stderr))
    }

    /// Sink for a stream identifier as used in configuration documents
    pub fn from_id(id: &str) -> Result<Arc<dyn Sink>> {
        match id {
            "stdout" => Ok(Self::stdout()),
            "stderr" => Ok(Self::stderr()),
            other => Err(LoggerError::sink_construction(
                "stream",
                format!("unknown stream id '{}' (expected stdout or stderr)", other),
            )),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }
}

impl Sink for StreamSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Stream
    }

    fn target(&self, _context: &SinkContext) -> Result<SinkTarget> {
        let target = self.target.get_or_init(|| match self.id {
            StreamId::Stdout => SinkTarget::formatting(FormattingBuffer::stdout()),
            StreamId::Stderr => SinkTarget::formatting(FormattingBuffer::stderr()),
        });
        Ok(target.clone())
    }

    fn for_subdomain(self: Arc<Self>, _full_name: &str) -> Arc<dyn Sink> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(StreamSink::from_id("stdout").unwrap().kind(), SinkKind::Stream);
        assert!(StreamSink::from_id("stderr").is_ok());
        let err = StreamSink::from_id("stdlog").err().unwrap();
        assert!(matches!(err, LoggerError::SinkConstruction { .. }));
    }

    #[test]
    fn test_target_is_cached() {
        let sink = StreamSink::new(StreamId::Stderr);
        let first = sink.target(&SinkContext::default()).unwrap();
        let second = sink.target(&SinkContext::default()).unwrap();
        match (first, second) {
            (SinkTarget::Formatting(a), SinkTarget::Formatting(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("stream sinks provide formatting targets"),
        }
    }

    #[test]
    fn test_shared_with_subdomains() {
        let sink: Arc<StreamSink> = Arc::new(StreamSink::new(StreamId::Stdout));
        let inherited = Arc::clone(&sink).for_subdomain(".child");
        assert!(std::ptr::eq(
            Arc::as_ptr(&inherited) as *const u8,
            Arc::as_ptr(&sink) as *const u8
        ));
    }
}
