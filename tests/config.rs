use std::path::PathBuf;

use redis_mock::config::{CliError, Config, DEFAULT_LOG_LEVEL};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_config_defaults() {
    assert_eq!(
        Config::new(args(&["redis-mock"])),
        Ok(Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            eval_file: None,
            quiet: false,
        })
    );
}

#[test]
fn test_config_flags() {
    assert_eq!(
        Config::new(args(&[
            "redis-mock",
            "--log-level",
            "redis_mock=debug",
            "--eval",
            "script.lua",
            "--quiet",
        ])),
        Ok(Config {
            log_level: "redis_mock=debug".to_string(),
            eval_file: Some(PathBuf::from("script.lua")),
            quiet: true,
        })
    );
}

#[test]
fn test_config_invalid_flags() {
    let test_cases = vec![
        (
            args(&["redis-mock", "--port", "6379"]),
            CliError::InvalidCommandLineFlag("--port".to_string()),
        ),
        (
            args(&["redis-mock", "--eval"]),
            CliError::MissingCommandLineFlagValue("--eval".to_string()),
        ),
        (
            args(&["redis-mock", "--log-level"]),
            CliError::MissingCommandLineFlagValue("--log-level".to_string()),
        ),
    ];

    for (command_line, expected) in test_cases {
        assert_eq!(Config::new(command_line), Err(expected));
    }
}
