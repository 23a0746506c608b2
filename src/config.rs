use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("Invalid command line flag: {0}")]
    InvalidCommandLineFlag(String),
    #[error("Missing value for command line flag: {0}")]
    MissingCommandLineFlagValue(String),
}

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings of the `redis-mock` binary.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// Tracing filter directive, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Lua file to run once before exiting, instead of the REPL.
    pub eval_file: Option<PathBuf>,
    /// Suppresses the prompt.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            eval_file: None,
            quiet: false,
        }
    }
}

impl Config {
    /// Parses command line arguments. The first item is the program name.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut config = Config::default();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--log-level" => {
                    let Some(level) = iter.next() else {
                        return Err(CliError::MissingCommandLineFlagValue(arg));
                    };

                    config.log_level = level;
                }
                "--eval" => {
                    let Some(path) = iter.next() else {
                        return Err(CliError::MissingCommandLineFlagValue(arg));
                    };

                    config.eval_file = Some(PathBuf::from(path));
                }
                "--quiet" | "-q" => config.quiet = true,
                _ => return Err(CliError::InvalidCommandLineFlag(arg)),
            }
        }

        Ok(config)
    }
}
