//! Character sink decorator with ANSI colors and multi-line padding
//!
//! Multi-line padding works in two phases. After
//! [`FormattingBuffer::initialize_multi_line_padding`] every visible character
//! of the message prefix is counted. [`FormattingBuffer::mark_end_of_prefix_for_multi_line_padding`]
//! freezes that width, and from then on each line following a newline is
//! indented by it, so continuation lines start under the first payload column.

use super::log_level::TextEffect;
use colored::Color;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaddingPhase {
    Off,
    Collecting,
    Padding,
}

#[derive(Debug, Clone, Copy)]
struct MultiLinePadding {
    phase: PaddingPhase,
    pad_width: usize,
    pad_before_next: bool,
}

impl MultiLinePadding {
    const fn new() -> Self {
        Self {
            phase: PaddingPhase::Off,
            pad_width: 0,
            pad_before_next: false,
        }
    }

    /// Number of spaces to emit in front of `c`
    fn advance(&mut self, c: char) -> usize {
        let pad = if self.pad_before_next {
            self.pad_before_next = false;
            self.pad_width
        } else {
            0
        };

        match self.phase {
            PaddingPhase::Collecting => {
                if c == '\n' {
                    self.pad_width = 0;
                } else {
                    self.pad_width += 1;
                }
            }
            PaddingPhase::Padding => {
                if c == '\n' {
                    self.pad_before_next = true;
                }
            }
            PaddingPhase::Off => {}
        }

        pad
    }
}

pub struct FormattingBuffer {
    writer: Box<dyn Write + Send>,
    colorize: bool,
    padding: MultiLinePadding,
}

impl FormattingBuffer {
    /// Wrap a writer; `colorize` decides whether color requests produce escape sequences
    pub fn new(writer: Box<dyn Write + Send>, colorize: bool) -> Self {
        Self {
            writer,
            colorize,
            padding: MultiLinePadding::new(),
        }
    }

    pub fn stdout() -> Self {
        let colorize = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), colorize)
    }

    pub fn stderr() -> Self {
        let colorize = io::stderr().is_terminal();
        Self::new(Box::new(io::stderr()), colorize)
    }

    pub fn is_colorized(&self) -> bool {
        self.colorize
    }

    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        if self.padding.phase == PaddingPhase::Off {
            return self.writer.write_all(text.as_bytes());
        }

        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            let pad = self.padding.advance(c);
            out.extend(std::iter::repeat(' ').take(pad));
            out.push(c);
        }
        self.writer.write_all(out.as_bytes())
    }

    pub fn set_color(&mut self, effect: TextEffect, color: Color) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }
        write!(self.writer, "\x1b[{};{}m", effect.code(), color.to_fg_str())
    }

    pub fn reset_color(&mut self) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }
        self.writer.write_all(b"\x1b[0m")
    }

    /// Start measuring the prefix; `enabled == false` switches padding off for this message
    pub fn initialize_multi_line_padding(&mut self, enabled: bool) {
        self.padding = MultiLinePadding::new();
        if enabled {
            self.padding.phase = PaddingPhase::Collecting;
        }
    }

    pub fn mark_end_of_prefix_for_multi_line_padding(&mut self) {
        if self.padding.phase == PaddingPhase::Collecting {
            self.padding.phase = PaddingPhase::Padding;
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
