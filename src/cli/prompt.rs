//! Interactive match confirmation on the terminal.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::enrichment::Confirm;

/// Asks on stdout and reads the answer from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, file: &Path, term: &str, found: &str) -> bool {
        println!("File:   {}", file.display());
        println!("Search: {}", term);
        println!("Found:  {}", found);
        print!("Use this match? [Y/n] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            // EOF counts as no
            Ok(0) => false,
            Ok(_) => parse_answer(&answer),
            Err(e) => {
                tracing::warn!("Could not read answer: {}", e);
                false
            }
        }
    }
}

/// An empty answer or an explicit yes continues
fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}
