//! The human on the other side of a maintenance command.
//!
//! Every confirmation goes through [`Operator`], so the same flows run
//! against a terminal or against a scripted list of answers.

#[cfg(any(test, feature = "test-util"))]
use std::collections::VecDeque;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A source of answers and a sink for messages.
pub trait Operator {
    /// Show `prompt` and return the reply, without the trailing newline.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Show an informational message.
    fn say(&mut self, message: &str);

    /// Ask a yes/no question. Only `y` or `yes` (any case) count as yes.
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(prompt)?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Parse one piece of operator input.
pub fn parse_input<T: FromStr>(input: &str) -> Result<T> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("could not read {:?} as a value", input.trim())))
}

/// Ask until the reply parses, giving up after `attempts` tries.
///
/// Bad input is reported to the operator and never becomes an error;
/// `Ok(None)` means every attempt was rejected.
pub fn ask_parsed<T: FromStr>(
    operator: &mut dyn Operator,
    prompt: &str,
    attempts: usize,
) -> Result<Option<T>> {
    for _ in 0..attempts {
        let answer = operator.ask(prompt)?;
        match parse_input(&answer) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => operator.say(&e.to_string()),
        }
    }
    Ok(None)
}

/// Replays a fixed list of answers and records everything shown.
///
/// Once the answers run out every further question gets an empty reply,
/// which reads as "no".
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub said: Vec<String>,
}

#[cfg(any(test, feature = "test-util"))]
impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            said: Vec::new(),
        }
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Operator for ScriptedOperator {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn say(&mut self, message: &str) {
        self.said.push(message.to_string());
    }
}
