use std::io::{self, BufRead, IsTerminal, Write};

use daydash_engine::host::Prompt;
use tracing::{debug, warn};

/// Confirmations on the terminal. Without `--yes` and without a terminal on
/// stdin every confirmation is declined.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            debug!(message, "confirmed by --yes");
            return true;
        }
        if !io::stdin().is_terminal() {
            warn!(message, "no terminal to confirm on; pass --yes");
            return false;
        }

        let mut err = io::stderr().lock();
        if write!(err, "{message} [y/N] ").and_then(|()| err.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }

    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
        assert!(TerminalPrompt::new(true).confirm("Remove this widget?"));
    }
}
