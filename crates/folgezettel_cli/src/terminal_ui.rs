//! Terminal implementation of the host UI surface.
//!
//! # Invariants
//! - Notices go to stdout, one per line, in emission order.
//! - `confirm` defaults to "no" on EOF, read errors, or unrecognized input.

use folgezettel_core::{HostUi, Note};
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Prints notices and asks confirmations on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalUi {
    assume_yes: bool,
}

impl TerminalUi {
    /// `assume_yes` answers every confirmation without reading stdin.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl HostUi for TerminalUi {
    fn notify(&self, message: &str, _duration: Option<Duration>) {
        println!("{message}");
    }

    fn confirm(&self, prompt: &str) -> bool {
        println!("{prompt}");
        if self.assume_yes {
            println!("Proceeding (--yes).");
            return true;
        }
        print!("Proceed? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }

    fn open_note(&self, note: &Note) {
        println!("Opened: {}", note.path);
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
