//! Line-based terminal form implementing [`WorkflowView`].
//!
//! Reads are blocking. The binary drives one run at a time from the main
//! task, so nothing else on the runtime waits behind a pending prompt; move
//! input onto `tokio::io::stdin` before running other tasks next to it.

use crate::workflow::WorkflowView;
use colored::*;
use std::io::{self, BufRead, Stdout, StdinLock, Write};

pub struct TerminalView<R, W> {
    input: R,
    output: W,
    busy: bool,
    blurb: Option<String>,
    image_url: Option<String>,
}

impl TerminalView<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalView<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            busy: false,
            blurb: None,
            image_url: None,
        }
    }

    /// Reads one field. `None` only on end of input.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn blurb(&self) -> Option<&str> {
        self.blurb.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> WorkflowView for TerminalView<R, W> {
    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if busy {
            let _ = writeln!(self.output, "{}", "⏳ Generating your manga...".yellow());
            let _ = self.output.flush();
        }
    }

    fn clear_results(&mut self) {
        self.blurb = None;
        self.image_url = None;
    }

    fn show_result(&mut self, blurb: &str, image_url: &str) {
        self.blurb = Some(blurb.to_string());
        self.image_url = Some(image_url.to_string());

        let _ = writeln!(self.output);
        let _ = writeln!(self.output, "{}", "📖 Blurb".green().bold());
        let _ = writeln!(self.output, "{}", blurb);
        let _ = writeln!(self.output, "{} {}", "🖼️  Cover:".green().bold(), image_url);
        let _ = writeln!(self.output);
        let _ = self.output.flush();
    }

    /// Blocks until the user acknowledges with Enter.
    fn notify_error(&mut self, message: &str) {
        let _ = writeln!(self.output, "{} {}", "⚠️ ".red(), message.red().bold());
        let _ = write!(self.output, "Press Enter to continue...");
        let _ = self.output.flush();

        let mut ack = String::new();
        let _ = self.input.read_line(&mut ack);
    }
}
