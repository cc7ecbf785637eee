//! Message emission
//!
//! A message is written field by field straight into the composite stream of
//! its domain. The whole message, from the prefix to the final newline, is
//! written while holding one process-wide lock so that concurrent messages
//! never interleave.

use super::configuration::{DomainFlags, SharedFanOutBuffer};
use super::log_level::LogLevel;
use super::registry::Domain;
use super::value::{Formattable, LogValue};
use chrono::Local;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;

static OUTPUT_LOCK: Mutex<()> = parking_lot::const_mutex(());

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Acquire the process-wide output lock
pub(crate) fn output_lock() -> MutexGuard<'static, ()> {
    OUTPUT_LOCK.lock()
}

/// Source location and description of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub description: &'static str,
    pub function: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(
        description: &'static str,
        function: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            description,
            function,
            file,
            line,
        }
    }
}

/// Stream for one message.
///
/// Holds the output lock for its whole lifetime. Dropping it appends a newline
/// unless the message already ended with one, then flushes all sinks.
pub struct MessageStream {
    stream: SharedFanOutBuffer,
    _output: MutexGuard<'static, ()>,
}

impl MessageStream {
    /// Lock the output and start a message in `domain`, prefix included
    pub fn open(domain: Domain<'_>, site: &CallSite, level: LogLevel) -> Self {
        let output = output_lock();
        let stream = domain.stream();
        let mut message = Self {
            stream,
            _output: output,
        };
        message.write_prefix(domain, site, level);
        message
    }

    fn write_prefix(&mut self, domain: Domain<'_>, site: &CallSite, level: LogLevel) {
        let registry = domain.registry();
        let pad_columns = registry.pad_prefix_columns();
        let name_width = if pad_columns { registry.max_name_length() } else { 0 };
        let flags: DomainFlags = domain.flags();
        let full_name = if flags.prints_name {
            domain.full_name()
        } else {
            String::new()
        };

        let mut stream = self.stream.lock();
        stream.start_message();
        stream.initialize_multi_line_padding(registry.pad_multi_line_messages());

        if level != LogLevel::User {
            if flags.prints_time {
                stream.write_str(&format!("[{}] ", Local::now().format(TIME_FORMAT)));
            }
            stream.set_color(level.text_effect(), level.color_code());
            if flags.prints_name {
                stream.write_str(&format!("{:<width$} ", full_name, width = name_width));
            }
            if flags.prints_level {
                let tag_width = if pad_columns { LogLevel::max_tag_width() } else { 0 };
                stream.write_str(&format!("{:<width$} ", level.tag(), width = tag_width));
            }
            stream.write_str(&format!("{}::{} ", site.description, site.function));
            if flags.prints_location {
                stream.write_str(&format!("[{}:{}] ", site.file, site.line));
            }
            stream.write_str(">> ");
            stream.reset_color();
            if let Some(tag) = level.payload_tag() {
                stream.write_str(tag);
            }
        }

        stream.mark_end_of_prefix_for_multi_line_padding();
    }

    pub fn write_value(&mut self, value: &LogValue<'_>) {
        match value {
            LogValue::Text(text) => self.stream.lock().write_str(text),
            other => self.stream.lock().write_str(&other.to_string()),
        }
    }

    pub fn write<T: Formattable + ?Sized>(&mut self, value: &T) {
        self.write_value(&value.log_value());
    }
}

impl fmt::Write for MessageStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.stream.lock().write_str(s);
        Ok(())
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        let mut stream = self.stream.lock();
        if !stream.ends_with_newline() {
            stream.write_str("\n");
        }
        stream.flush();
    }
}

/// Write one message unless `level` is above the domain's maximum level
pub fn emit(domain: Domain<'_>, site: &CallSite, level: LogLevel, values: &[LogValue<'_>]) {
    if !domain.is_enabled(level) {
        return;
    }
    let mut message = MessageStream::open(domain, site, level);
    for value in values {
        message.write_value(value);
    }
}
