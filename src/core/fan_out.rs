//! Composite sink broadcasting every character to all attached sinks

use super::log_level::TextEffect;
use super::sink::{SharedFormattingBuffer, SinkTarget};
use colored::Color;

/// Broadcasts text to a list of [`SinkTarget`]s.
///
/// Writing is best-effort: an error on one target does not keep the text from
/// reaching the others. Color and padding requests are forwarded to formatting
/// targets only; raw targets receive the plain characters. An empty composite
/// is a null sink.
#[derive(Debug, Default)]
pub struct FanOutBuffer {
    targets: Vec<SinkTarget>,
    ends_with_newline: bool,
}

impl FanOutBuffer {
    pub fn new(targets: Vec<SinkTarget>) -> Self {
        Self {
            targets,
            ends_with_newline: false,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether the last character written through this composite was a newline
    pub fn ends_with_newline(&self) -> bool {
        self.ends_with_newline
    }

    /// Forget the line state of the previous message
    pub fn start_message(&mut self) {
        self.ends_with_newline = false;
    }

    pub fn write_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ends_with_newline = text.ends_with('\n');

        for target in &self.targets {
            let _ = match target {
                SinkTarget::Raw(writer) => writer.lock().write_all(text.as_bytes()),
                SinkTarget::Formatting(buffer) => buffer.lock().write_str(text),
            };
        }
    }

    pub fn set_color(&mut self, effect: TextEffect, color: Color) {
        for buffer in self.formatting_targets() {
            let _ = buffer.lock().set_color(effect, color);
        }
    }

    pub fn reset_color(&mut self) {
        for buffer in self.formatting_targets() {
            let _ = buffer.lock().reset_color();
        }
    }

    pub fn initialize_multi_line_padding(&mut self, enabled: bool) {
        for buffer in self.formatting_targets() {
            buffer.lock().initialize_multi_line_padding(enabled);
        }
    }

    pub fn mark_end_of_prefix_for_multi_line_padding(&mut self) {
        for buffer in self.formatting_targets() {
            buffer.lock().mark_end_of_prefix_for_multi_line_padding();
        }
    }

    pub fn flush(&mut self) {
        for target in &self.targets {
            let _ = match target {
                SinkTarget::Raw(writer) => writer.lock().flush(),
                SinkTarget::Formatting(buffer) => buffer.lock().flush(),
            };
        }
    }

    fn formatting_targets(&self) -> impl Iterator<Item = &SharedFormattingBuffer> {
        self.targets.iter().filter_map(|target| match target {
            SinkTarget::Formatting(buffer) => Some(buffer),
            SinkTarget::Raw(_) => None,
        })
    }
}
