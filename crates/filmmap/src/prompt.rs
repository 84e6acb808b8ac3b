use std::io::{self, BufRead, Write};

use thiserror::Error;

pub const PROMPT: &str = "Enter a year: ";

#[derive(Debug, Error)]
pub enum YearInputError {
    #[error("Year should be an integer!")]
    NotAnInteger(String),
    #[error("failed to read year: {0}")]
    Io(#[from] io::Error),
}

/// Parse a year typed by the user. Surrounding whitespace is ignored.
pub fn parse_year(raw: &str) -> Result<i32, YearInputError> {
    let trimmed = raw.trim();
    trimmed
        .parse()
        .map_err(|_| YearInputError::NotAnInteger(trimmed.to_string()))
}

/// Ask once for a year. Invalid input is an error; there is no second prompt.
pub fn prompt_year<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<i32, YearInputError> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_year(&line)
}
