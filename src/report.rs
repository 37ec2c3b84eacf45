//! Operator-facing output.
//!
//! All user-visible lines go through a [`Reporter`] so that orchestration can
//! be tested against captured text. Status prefixes are fixed:
//! `[X] ERROR`, `[!] WARNING` and `[OK]`.

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Width of header rules.
pub const RULE_WIDTH: usize = 70;

/// In-memory sink for captured output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes prefixed, optionally coloured status lines.
pub struct Reporter {
    out: Box<dyn Write>,
    color: bool,
    progress: bool,
}

impl Reporter {
    /// Reporter on stdout with colours and progress bars.
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
            color: true,
            progress: true,
        }
    }

    /// Undecorated reporter on stderr, keeping stdout free for `--json`.
    pub fn stderr() -> Self {
        Self {
            out: Box::new(io::stderr()),
            color: false,
            progress: false,
        }
    }

    /// Reporter writing plain text into a shared buffer.
    pub fn captured() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let reporter = Self {
            out: Box::new(buffer.clone()),
            color: false,
            progress: false,
        };
        (reporter, buffer)
    }

    /// Reporter that discards everything.
    pub fn sink() -> Self {
        Self {
            out: Box::new(io::sink()),
            color: false,
            progress: false,
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write a raw line. Output errors are ignored.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// `=====` / title / `=====`
    pub fn header(&mut self, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        let title = self.paint(title, |s| s.bold());
        self.line(&rule);
        self.line(title);
        self.line(&rule);
    }

    /// Blank line, then `-----` / title / `-----`
    pub fn subheader(&mut self, title: &str) {
        let rule = "-".repeat(RULE_WIDTH);
        let title = self.paint(title, |s| s.bold());
        self.blank();
        self.line(&rule);
        self.line(title);
        self.line(&rule);
    }

    /// Boxed hint such as `To restore: patchdemo reset`.
    pub fn footer(&mut self, lines: &[&str]) {
        let rule = "-".repeat(60);
        self.blank();
        self.line(&rule);
        for text in lines {
            self.line(*text);
        }
        self.line(&rule);
        self.blank();
    }

    /// `[n/total] text`
    pub fn step(&mut self, index: usize, total: usize, text: &str) {
        let label = self.paint(&format!("[{}/{}]", index, total), |s| s.cyan());
        self.blank();
        self.line(format!("{} {}", label, text));
    }

    pub fn ok(&mut self, text: &str) {
        let label = self.paint("[OK]", |s| s.green().bold());
        self.line(format!("{} {}", label, text));
    }

    pub fn warning(&mut self, text: &str) {
        let label = self.paint("[!] WARNING:", |s| s.yellow().bold());
        self.line(format!("{} {}", label, text));
    }

    pub fn error(&mut self, text: &str) {
        let label = self.paint("[X] ERROR:", |s| s.red().bold());
        self.line(format!("{} {}", label, text));
    }

    /// Indented list item with a one-character marker, e.g. `  [+] name`.
    pub fn item(&mut self, marker: char, text: &str) {
        let painted = match marker {
            '+' => self.paint(&format!("[{}]", marker), |s| s.green()),
            '!' | 'X' => self.paint(&format!("[{}]", marker), |s| s.yellow()),
            _ => format!("[{}]", marker),
        };
        self.line(format!("  {} {}", painted, text));
    }

    /// Indented `[OK]` item.
    pub fn ok_item(&mut self, text: &str) {
        let label = self.paint("[OK]", |s| s.green());
        self.line(format!("  {} {}", label, text));
    }

    /// Indented detail line.
    pub fn detail(&mut self, text: &str) {
        self.line(format!("    {}", text));
    }

    /// Progress bar over `len` patches; hidden unless writing to a terminal.
    pub fn progress_bar(&self, len: usize, message: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg} [{bar:20}] {pos}/{len}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(message.to_string());
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let (mut reporter, buffer) = Reporter::captured();
        reporter.ok("clean");
        reporter.warning("tests passed");
        reporter.error("patch missing");

        let out = buffer.contents();
        assert!(out.contains("[OK] clean"));
        assert!(out.contains("[!] WARNING: tests passed"));
        assert!(out.contains("[X] ERROR: patch missing"));
    }

    #[test]
    fn test_header_rules() {
        let (mut reporter, buffer) = Reporter::captured();
        reporter.header("DEMO RESET");
        let out = buffer.contents();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "=".repeat(RULE_WIDTH));
        assert_eq!(lines[1], "DEMO RESET");
    }

    #[test]
    fn test_step_and_item() {
        let (mut reporter, buffer) = Reporter::captured();
        reporter.step(1, 3, "Checking working directory...");
        reporter.item('+', "Priority Filter: Applied");
        let out = buffer.contents();
        assert!(out.contains("[1/3] Checking working directory..."));
        assert!(out.contains("  [+] Priority Filter: Applied"));
    }

    #[test]
    fn test_captured_progress_bar_is_hidden() {
        let (reporter, _buffer) = Reporter::captured();
        assert!(reporter.progress_bar(4, "Applying").is_hidden());
    }
}
