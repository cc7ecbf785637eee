//! Speech synthesis sink
//!
//! Complete lines are handed to a [`SpeechBackend`] on a worker thread. The
//! channel is bounded; when the backend cannot keep up, lines are dropped.

use crate::core::{LoggerError, Result, Sink, SinkContext, SinkKind, SinkTarget};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::io::{self, Write};
use std::process::Command;
use std::sync::Arc;
use std::thread;

/// Maximum number of lines waiting to be spoken
pub const SPEECH_QUEUE_SIZE: usize = 64;

pub const DEFAULT_SPEECH_PROGRAM: &str = "espeak";

/// Text-to-speech engine
pub trait SpeechBackend: Send {
    fn speak(&mut self, text: &str) -> io::Result<()>;
}

/// Speaks by running an external program, e.g. `espeak -v en "text"`
#[derive(Debug, Clone)]
pub struct CommandSpeechBackend {
    program: String,
    args: Vec<String>,
}

impl CommandSpeechBackend {
    pub fn new(program: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-v".to_string(), voice.into()],
        }
    }
}

impl SpeechBackend for CommandSpeechBackend {
    fn speak(&mut self, text: &str) -> io::Result<()> {
        let status = Command::new(&self.program).args(&self.args).arg(text).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("'{}' exited with {}", self.program, status)))
        }
    }
}

struct LineWriter {
    pending: Vec<u8>,
    sender: Sender<String>,
}

impl LineWriter {
    fn send_pending(&mut self) {
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        if line.is_empty() {
            return;
        }
        match self.sender.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                eprintln!("[DOMAIN LOGGER WARNING] Speech queue full, line dropped");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if byte == b'\n' {
                self.send_pending();
            } else {
                self.pending.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.send_pending();
        }
        Ok(())
    }
}

pub struct SpeechSink {
    target: SinkTarget,
}

impl SpeechSink {
    /// Start the worker thread for `backend`
    pub fn new(mut backend: Box<dyn SpeechBackend>) -> Result<Self> {
        let (sender, receiver) = bounded::<String>(SPEECH_QUEUE_SIZE);
        thread::Builder::new()
            .name("speech-sink".to_string())
            .spawn(move || {
                for line in receiver {
                    if let Err(e) = backend.speak(&line) {
                        eprintln!("[DOMAIN LOGGER ERROR] Speech output failed: {}", e);
                    }
                }
            })
            .map_err(|e| {
                LoggerError::sink_construction("speech", format!("cannot start worker: {}", e))
            })?;

        Ok(Self {
            target: SinkTarget::raw(LineWriter {
                pending: Vec::new(),
                sender,
            }),
        })
    }

    /// Sink speaking through an external program with the given voice
    pub fn command(program: &str, voice: &str) -> Result<Self> {
        Self::new(Box::new(CommandSpeechBackend::new(program, voice)))
    }
}

impl Sink for SpeechSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Speech
    }

    fn target(&self, _context: &SinkContext) -> Result<SinkTarget> {
        Ok(self.target.clone())
    }

    fn for_subdomain(self: Arc<Self>, _full_name: &str) -> Arc<dyn Sink> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct ChannelBackend(crossbeam_channel::Sender<String>);

    impl SpeechBackend for ChannelBackend {
        fn speak(&mut self, text: &str) -> io::Result<()> {
            let _ = self.0.send(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_lines_reach_backend() {
        let (sender, receiver) = unbounded();
        let sink = SpeechSink::new(Box::new(ChannelBackend(sender))).unwrap();

        let SinkTarget::Raw(writer) = sink.target(&SinkContext::default()).unwrap() else {
            panic!("speech sink provides a raw target");
        };
        writer.lock().write_all(b"first line\nsecond").unwrap();
        writer.lock().flush().unwrap();

        let timeout = Duration::from_secs(5);
        assert_eq!(receiver.recv_timeout(timeout).unwrap(), "first line");
        assert_eq!(receiver.recv_timeout(timeout).unwrap(), "second");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let (sender, receiver) = unbounded();
        let sink = SpeechSink::new(Box::new(ChannelBackend(sender))).unwrap();

        let SinkTarget::Raw(writer) = sink.target(&SinkContext::default()).unwrap() else {
            panic!("speech sink provides a raw target");
        };
        writer.lock().write_all(b"\n   \nword\n").unwrap();

        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(5)).unwrap(),
            "word"
        );
    }
}
