use redis_mock::input::{split_command_line, InputError};

#[test]
fn test_split_command_line() {
    let test_cases = vec![
        ("GET grape", Ok(vec!["GET", "grape"])),
        ("  SET   grape  mango ", Ok(vec!["SET", "grape", "mango"])),
        (r#"SET greeting "hello world""#, Ok(vec!["SET", "greeting", "hello world"])),
        (r#"SET quote "say \"hi\"\n""#, Ok(vec!["SET", "quote", "say \"hi\"\n"])),
        (r#"SET hex "\x41\x42""#, Ok(vec!["SET", "hex", "AB"])),
        ("EVAL 'return \"x\"' 0", Ok(vec!["EVAL", "return \"x\"", "0"])),
        (r#"SET empty """#, Ok(vec!["SET", "empty", ""])),
        ("", Ok(vec![])),
        (r#"SET broken "oops"#, Err(InputError::UnbalancedQuotes)),
        (r#"SET broken "a"b"#, Err(InputError::TrailingCharacterAfterQuote)),
        ("SET broken 'a", Err(InputError::UnbalancedQuotes)),
    ];

    for (line, expected) in test_cases {
        let expected = expected.map(|arguments: Vec<&str>| {
            arguments.into_iter().map(String::from).collect::<Vec<_>>()
        });

        assert_eq!(split_command_line(line), expected, "splitting {:?}", line);
    }
}
