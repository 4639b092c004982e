//! Terminal implementation of [`Operator`].

use std::io::{self, BufRead, Write};

use songlink_core::Operator;

/// Prompts on stdout and reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinOperator;

impl Operator for StdinOperator {
    fn ask(&mut self, prompt: &str) -> songlink_core::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}
