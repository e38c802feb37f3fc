//! Terminal sink: writes rendered output to a terminal with crossterm.
//!
//! Responses are prefixed with a bold label and soft-wrapped at the
//! configured width using display columns, not bytes.

use super::sink::OutputSink;
use crossterm::cursor::SetCursorStyle;
use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent, Stylize};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Label printed before each response.
const RESPONSE_LABEL: &str = "AI: ";

/// Configuration for the terminal sink.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Column at which response text wraps.
    pub width: u16,
    /// Whether to change the cursor shape while a response is typing.
    pub typing_cursor: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            width: 80,
            typing_cursor: true,
        }
    }
}

impl TerminalConfig {
    /// Size the wrap width to the current terminal, falling back to the default.
    pub fn detect() -> Self {
        let width = crossterm::terminal::size().map_or(80, |(cols, _)| cols);
        Self {
            width,
            ..Self::default()
        }
    }
}

/// An [`OutputSink`] writing to any `Write`, typically stdout.
///
/// Write failures cannot be returned through the sink interface; the first
/// one is kept and can be inspected with [`TerminalSink::take_error`].
pub struct TerminalSink<W: Write> {
    /// Destination.
    out: W,
    /// Configuration.
    config: TerminalConfig,
    /// Current column within the response line.
    col: u16,
    /// Whether a response line is open.
    in_progress: bool,
    /// First write error seen.
    error: Option<io::Error>,
}

impl TerminalSink<io::Stdout> {
    /// Sink on stdout sized to the current terminal.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), TerminalConfig::detect())
    }
}

impl<W: Write> TerminalSink<W> {
    /// Create a sink over `out`.
    pub const fn new(out: W, config: TerminalConfig) -> Self {
        Self {
            out,
            config,
            col: 0,
            in_progress: false,
            error: None,
        }
    }

    /// Take the first write error, if any occurred.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            tracing::warn!(%err, "terminal write failed");
            if self.error.is_none() {
                self.error = Some(err);
            }
        }
    }

    fn open_line(&mut self) -> io::Result<()> {
        queue!(self.out, PrintStyledContent(RESPONSE_LABEL.bold()))?;
        if self.config.typing_cursor {
            queue!(self.out, SetCursorStyle::BlinkingBar)?;
        }
        self.col = label_width();
        self.in_progress = true;
        self.out.flush()
    }

    fn close_line(&mut self) -> io::Result<()> {
        if !self.in_progress {
            return Ok(());
        }
        if self.config.typing_cursor {
            queue!(self.out, SetCursorStyle::DefaultUserShape)?;
        }
        queue!(self.out, Print("\r\n"))?;
        self.col = 0;
        self.in_progress = false;
        self.out.flush()
    }

    fn write_unit(&mut self, unit: &str) -> io::Result<()> {
        if !self.in_progress {
            self.open_line()?;
        }

        if unit == "\n" || unit == "\r\n" {
            queue!(self.out, Print("\r\n"))?;
            self.col = 0;
            return self.out.flush();
        }

        let width = u16::try_from(UnicodeWidthStr::width(unit)).unwrap_or(u16::MAX);
        if self.col > 0 && self.col.saturating_add(width) > self.config.width {
            queue!(self.out, Print("\r\n"))?;
            self.col = 0;
        }
        queue!(self.out, Print(unit))?;
        self.col = self.col.saturating_add(width);
        self.out.flush()
    }

    fn write_block(&mut self, label: &str, text: &str, error: bool) -> io::Result<()> {
        self.close_line()?;
        if error {
            queue!(self.out, PrintStyledContent(label.red().bold()), PrintStyledContent(text.red()))?;
        } else {
            queue!(self.out, PrintStyledContent(label.dark_grey().bold()), Print(text))?;
        }
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()
    }
}

fn label_width() -> u16 {
    u16::try_from(UnicodeWidthStr::width(RESPONSE_LABEL)).unwrap_or(0)
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn emit_text(&mut self, unit: &str) {
        let result = self.write_unit(unit);
        self.record(result);
    }

    fn emit_info(&mut self, text: &str) {
        let result = self.write_block("System: ", text, false);
        self.record(result);
    }

    fn report_error(&mut self, message: &str) {
        let result = self.write_block("Error: ", message, true);
        self.record(result);
    }

    fn session_started(&mut self) {
        if !self.in_progress {
            let result = self.open_line();
            self.record(result);
        }
    }

    fn session_closed(&mut self) {
        let result = self.close_line();
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TerminalConfig {
        TerminalConfig {
            width: 10,
            typing_cursor: false,
        }
    }

    fn visible(bytes: &[u8]) -> String {
        // Strip CSI sequences so assertions only see printed text.
        let text = String::from_utf8_lossy(bytes);
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_response_line() {
        let mut sink = TerminalSink::new(Vec::new(), plain());
        sink.session_started();
        for unit in ["h", "i"] {
            sink.emit_text(unit);
        }
        sink.session_closed();
        assert!(sink.take_error().is_none());
        assert_eq!(visible(&sink.into_inner()), "AI: hi\r\n");
    }

    #[test]
    fn test_wraps_on_display_width() {
        let mut sink = TerminalSink::new(Vec::new(), plain());
        for unit in ["a", "b", "c", "d", "e", "f", "漢"] {
            sink.emit_text(unit);
        }
        // "AI: " uses 4 columns, six ASCII units fill to 10, the wide glyph wraps.
        assert_eq!(visible(&sink.into_inner()), "AI: abcdef\r\n漢");
    }

    #[test]
    fn test_error_closes_open_line() {
        let mut sink = TerminalSink::new(Vec::new(), plain());
        sink.emit_text("x");
        sink.report_error("Chat error: boom");
        assert_eq!(visible(&sink.into_inner()), "AI: x\r\nError: Chat error: boom\r\n");
    }
}
