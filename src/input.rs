//! Line input for the interactive shell.
//!
//! Splits a `redis-cli` style command line into arguments. Arguments are
//! separated by whitespace; double quotes group an argument and understand
//! `\n`, `\r`, `\t`, `\"`, `\\` and `\xHH` escapes; single quotes group an
//! argument verbatim except for `\'`.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("Invalid argument(s): unbalanced quotes")]
    UnbalancedQuotes,
    #[error("Invalid argument(s): closing quote must be followed by a space")]
    TrailingCharacterAfterQuote,
}

/// Splits one line into command arguments.
///
/// # Examples
///
/// ```
/// use redis_mock::input::split_command_line;
///
/// let arguments = split_command_line(r#"SET greeting "hello world""#).unwrap();
/// assert_eq!(arguments, vec!["SET", "greeting", "hello world"]);
/// ```
pub fn split_command_line(line: &str) -> Result<Vec<String>, InputError> {
    let mut arguments = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(&first) = chars.peek() else {
            return Ok(arguments);
        };

        let mut current = String::new();

        match first {
            '"' => {
                chars.next();
                loop {
                    match chars.next() {
                        None => return Err(InputError::UnbalancedQuotes),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            None => return Err(InputError::UnbalancedQuotes),
                            Some('n') => current.push('\n'),
                            Some('r') => current.push('\r'),
                            Some('t') => current.push('\t'),
                            Some('a') => current.push('\u{7}'),
                            Some('b') => current.push('\u{8}'),
                            Some('x') => {
                                let hex: String = chars.clone().take(2).collect();
                                match u8::from_str_radix(&hex, 16) {
                                    Ok(byte) if hex.len() == 2 => {
                                        current.push(byte as char);
                                        chars.next();
                                        chars.next();
                                    }
                                    _ => current.push('x'),
                                }
                            }
                            Some(other) => current.push(other),
                        },
                        Some(c) => current.push(c),
                    }
                }

                if chars.peek().is_some_and(|c| !c.is_whitespace()) {
                    return Err(InputError::TrailingCharacterAfterQuote);
                }
            }
            '\'' => {
                chars.next();
                loop {
                    match chars.next() {
                        None => return Err(InputError::UnbalancedQuotes),
                        Some('\'') => break,
                        Some('\\') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            current.push('\'');
                        }
                        Some(c) => current.push(c),
                    }
                }

                if chars.peek().is_some_and(|c| !c.is_whitespace()) {
                    return Err(InputError::TrailingCharacterAfterQuote);
                }
            }
            _ => {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    current.push(c);
                }
            }
        }

        arguments.push(current);
    }
}
