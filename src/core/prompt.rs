//! Operator confirmation for overriding an enabled profile.

use std::io::{BufRead, Write};

use crate::constants;
use crate::error::Result;

/// Yes/no decision requested by the lifecycle before a destructive override.
pub trait Confirm {
    /// `Ok(false)` declines; input ending before an answer also declines.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Non-interactive confirmation that always agrees (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self(question))
    }
}

/// Blocking prompt that accepts only `y` or `n`, asking again on anything else.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question}{}", constants::PROMPT_OVERRIDE_SUFFIX)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }

            match line.trim() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => writeln!(self.output, "{}", constants::PROMPT_INVALID_ANSWER)?,
            }
        }
    }
}
