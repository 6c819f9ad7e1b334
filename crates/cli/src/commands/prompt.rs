//! Interactive y/N confirmation on the terminal.

use std::io::{BufRead, Write};

use circuit_cart_admin::dashboard::ConfirmPrompt;

/// Asks on stderr and reads the answer from stdin. Only `y` or `yes`
/// (any case) confirms; anything else, including EOF, declines.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        let mut stderr = std::io::stderr().lock();
        if write!(stderr, "{question} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
