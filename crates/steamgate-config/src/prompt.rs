//! Blocking line-input port for interactive prompts.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use parking_lot::Mutex;

use crate::errors::ConfigError;

/// Blocking request/response channel for interactive input.
///
/// Used by first-run setup and by the session manager when an authentication
/// challenge needs a code the configuration cannot supply.
pub trait Prompter: Send + Sync {
    /// Print `prompt`, then read one trimmed line.
    ///
    /// When `must_not_be_blank` is set, blank input re-prompts with that
    /// message until a non-blank line arrives.
    fn request_line(
        &self,
        prompt: &str,
        must_not_be_blank: Option<&str>,
    ) -> Result<String, ConfigError>;
}

/// `Prompter` over the process terminal (stdout/stdin).
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn request_line(
        &self,
        prompt: &str,
        must_not_be_blank: Option<&str>,
    ) -> Result<String, ConfigError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{prompt}")?;
        stdout.flush()?;
        loop {
            let mut line = String::new();
            let read = stdin.lock().read_line(&mut line)?;
            if read == 0 {
                return Err(ConfigError::InputUnavailable("stdin closed".into()));
            }
            let line = line.trim().to_string();
            match (line.is_empty(), must_not_be_blank) {
                (true, Some(message)) => {
                    writeln!(stdout, "{message}")?;
                    stdout.flush()?;
                }
                _ => return Ok(line),
            }
        }
    }
}

/// `Prompter` that replays a scripted sequence of answers.
///
/// Test and development double; records every prompt it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    /// Prompter answering with `answers` in order.
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt requested so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn request_line(
        &self,
        prompt: &str,
        must_not_be_blank: Option<&str>,
    ) -> Result<String, ConfigError> {
        self.asked.lock().push(prompt.to_string());
        loop {
            let Some(answer) = self.answers.lock().pop_front() else {
                return Err(ConfigError::InputUnavailable(format!(
                    "no scripted answer for prompt: {prompt}"
                )));
            };
            if answer.trim().is_empty() && must_not_be_blank.is_some() {
                continue;
            }
            return Ok(answer.trim().to_string());
        }
    }
}
