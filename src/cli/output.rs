//! Colored terminal output for pipeline progress.
//!
//! Diagnostics for developers go through `log`; this is what the person
//! cutting a release reads.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::Write;

/// Which standard stream a message goes to
#[derive(Clone, Copy)]
enum Target {
    Stdout,
    Stderr,
}

/// Writes styled status lines to the terminal.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    ///
    /// `quiet` suppresses everything except errors; `verbose` enables
    /// [`OutputManager::verbose`] lines.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Only printed in verbose mode
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.emit(Target::Stdout, Some(Color::Cyan), false, "  ", message);
        }
    }

    /// Step in progress
    pub fn progress(&self, message: &str) {
        if !self.quiet {
            self.emit(Target::Stdout, Some(Color::Blue), true, "→ ", message);
        }
    }

    /// Completed step
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.emit(Target::Stdout, Some(Color::Green), true, "✓ ", message);
        }
    }

    /// Non-fatal problem
    pub fn warn(&self, message: &str) {
        if !self.quiet {
            self.emit(Target::Stderr, Some(Color::Yellow), true, "⚠ ", message);
        }
    }

    /// Fatal problem, printed even in quiet mode
    pub fn error(&self, message: &str) {
        self.emit(Target::Stderr, Some(Color::Red), true, "✗ ", message);
    }

    /// Section header
    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.emit(Target::Stdout, Some(Color::Magenta), true, &format!("\n{title}"), "");
        }
    }

    /// Indented line, used for streamed subprocess output
    pub fn indent(&self, message: &str) {
        if !self.quiet {
            self.emit(Target::Stdout, None, false, "    ", message);
        }
    }

    fn emit(&self, target: Target, color: Option<Color>, bold: bool, prefix: &str, message: &str) {
        let mut stream = match target {
            Target::Stdout => StandardStream::stdout(ColorChoice::Auto),
            Target::Stderr => StandardStream::stderr(ColorChoice::Auto),
        };

        // Terminal write failures are not worth aborting a release over
        if !prefix.is_empty() {
            let mut spec = ColorSpec::new();
            spec.set_fg(color).set_bold(bold);
            let _ = stream.set_color(&spec);
            let _ = write!(stream, "{prefix}");
            let _ = stream.reset();
        }
        let _ = writeln!(stream, "{message}");
    }
}
