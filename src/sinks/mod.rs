//! Sink implementations and the sink factory

pub mod file;
pub mod memory;
pub mod speech;
pub mod stream;

pub use file::{CombinedFileSink, FileSink};
pub use memory::MemorySink;
pub use speech::{CommandSpeechBackend, SpeechBackend, SpeechSink};
pub use stream::{StreamId, StreamSink};

use crate::core::{ConfigElement, LoggerError, Result, Sink, SinkKind};
use std::sync::Arc;

/// Build a sink from a configuration element named after the sink type.
///
/// `domain` is the fully qualified name of the domain the sink is configured
/// on; file-backed sinks derive their file name from it.
pub fn create_sink<E: ConfigElement>(element: &E, domain: &str) -> Result<Arc<dyn Sink>> {
    let kind: SinkKind = element
        .tag()
        .parse()
        .map_err(|e: String| LoggerError::sink_construction(element.tag(), e))?;
    let required = |key: &str| {
        element.attribute(key).ok_or_else(|| {
            LoggerError::sink_construction(kind.to_str(), format!("missing attribute '{}'", key))
        })
    };

    let sink: Arc<dyn Sink> = match kind {
        SinkKind::Stream => return StreamSink::from_id(required("id")?),
        SinkKind::File => Arc::new(FileSink::new(domain)),
        SinkKind::CombinedFile => Arc::new(CombinedFileSink::new(domain)),
        SinkKind::Speech => {
            let voice = required("voice")?;
            let program = element
                .attribute("program")
                .unwrap_or(speech::DEFAULT_SPEECH_PROGRAM);
            Arc::new(SpeechSink::command(program, voice)?)
        }
        SinkKind::Memory => Arc::new(MemorySink::new()),
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigNode;

    #[test]
    fn test_create_known_sinks() {
        let stream = ConfigNode::new("stream").with_attribute("id", "stderr");
        assert_eq!(create_sink(&stream, ".a").unwrap().kind(), SinkKind::Stream);

        let file = ConfigNode::new("file");
        assert_eq!(create_sink(&file, ".a").unwrap().kind(), SinkKind::File);

        let combined = ConfigNode::new("combined_file");
        assert_eq!(
            create_sink(&combined, ".a").unwrap().kind(),
            SinkKind::CombinedFile
        );

        let speech = ConfigNode::new("speech").with_attribute("voice", "en");
        assert_eq!(create_sink(&speech, ".a").unwrap().kind(), SinkKind::Speech);
    }

    #[test]
    fn test_construction_errors() {
        let unknown = ConfigNode::new("syslog");
        assert!(matches!(
            create_sink(&unknown, ".a").err().unwrap(),
            LoggerError::SinkConstruction { .. }
        ));

        let missing_id = ConfigNode::new("stream");
        let err = create_sink(&missing_id, ".a").err().unwrap();
        assert!(err.to_string().contains("missing attribute 'id'"));

        let missing_voice = ConfigNode::new("speech");
        assert!(create_sink(&missing_voice, ".a").is_err());
    }
}
