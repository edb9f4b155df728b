// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Operator confirmation.
//!
//! Every destructive or structural change to the filesystem is gated behind
//! a yes/no question posed to the operator. The question itself is plain
//! text ending in `(Yes/No)`, and only the exact answer `Yes` counts as
//! consent. Everything else, including `yes`, `y`, or an empty line, is a
//! decline.
//!
//! The [`Confirm`] trait keeps deployment logic ignorant of where answers
//! come from. [`Terminal`] talks to a real operator, [`Scripted`] replays
//! canned answers, and any `FnMut(&str) -> bool` closure works too.

use inquire::{InquireError, Text};
use std::{
    collections::VecDeque,
    io::{stderr, stdin, BufRead, IsTerminal, Write},
};
use tracing::debug;

/// The one answer accepted as consent.
pub const AFFIRMATIVE: &str = "Yes";

/// Check if raw answer counts as consent.
pub fn is_affirmative(answer: &str) -> bool {
    answer == AFFIRMATIVE
}

/// Source of operator confirmation.
pub trait Confirm {
    /// Pose `prompt` to the operator and report whether they consented.
    ///
    /// # Errors
    ///
    /// - Return [`PromptError`] if the operator aborted the prompt, or no
    ///   answer could be read at all.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// Confirmation through the controlling terminal.
///
/// Uses an interactive [`inquire`] prompt when stdin is a terminal. When
/// stdin is piped, the prompt goes to stderr and one line is read from stdin
/// per question, which lets callers script a run with e.g. `yes Yes |`.
#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    /// Construct new terminal prompter.
    pub fn new() -> Self {
        Self
    }

    fn read_piped(prompt: &str) -> Result<Option<String>> {
        let mut err = stderr().lock();
        write!(err, "{prompt} ")?;
        err.flush()?;

        let mut line = String::new();
        if stdin().lock().read_line(&mut line)? == 0 {
            // INVARIANT: Out of input means nobody consented.
            writeln!(err)?;
            return Ok(None);
        }

        let line = line
            .strip_suffix("\r\n")
            .or(line.strip_suffix('\n'))
            .map(ToString::to_string)
            .unwrap_or(line);

        Ok(Some(line))
    }
}

impl Confirm for Terminal {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = if stdin().is_terminal() {
            match Text::new(prompt).prompt() {
                Ok(answer) => Some(answer),
                Err(InquireError::OperationCanceled) => None,
                Err(InquireError::OperationInterrupted) => return Err(PromptError::Interrupted),
                Err(error) => return Err(PromptError::Inquire(error)),
            }
        } else {
            Self::read_piped(prompt)?
        };

        debug!("answer to {prompt:?} was {answer:?}");
        Ok(answer.as_deref().is_some_and(is_affirmative))
    }
}

/// Confirmation from a queue of canned answers.
///
/// Records every prompt it is shown, so callers can check what was asked and
/// in which order. Once the queue runs dry, every further prompt is declined.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl Scripted {
    /// Construct new scripted prompter with answers given in order.
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts shown so far, oldest first.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.asked.push(prompt.to_owned());
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|answer| is_affirmative(&answer)))
    }
}

/// Confirmation error types.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Operator hit Ctrl-C while being prompted.
    #[error("prompt interrupted by operator")]
    Interrupted,

    /// Interactive prompt failed.
    #[error(transparent)]
    Inquire(#[from] InquireError),

    /// Reading a piped answer failed.
    #[error("failed to read answer from stdin")]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
