mod common;

use common::{TestEnv, TestUtils};
use redis_mock::CommandError;

#[tokio::test]
async fn test_handle_sadd_command() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SADD", "fruits", "apple", "mango", "apple"], TestUtils::integer(2))
        .await;
    env.exec_command_ok(&["SADD", "fruits", "mango", "grape"], TestUtils::integer(1))
        .await;
    env.exec_command_ok(&["SCARD", "fruits"], TestUtils::integer(3)).await;
    env.exec_command_ok(
        &["SMEMBERS", "fruits"],
        TestUtils::bulk_array(&["apple", "grape", "mango"]),
    )
    .await;
}

#[tokio::test]
async fn test_srem_deletes_empty_set() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SADD", "fruits", "apple", "mango"], TestUtils::integer(2))
        .await;
    env.exec_command_ok(&["SREM", "fruits", "apple", "pear"], TestUtils::integer(1))
        .await;
    env.exec_command_ok(&["EXISTS", "fruits"], TestUtils::integer(1)).await;
    env.exec_command_ok(&["SREM", "fruits", "mango"], TestUtils::integer(1))
        .await;
    env.exec_command_ok(&["EXISTS", "fruits"], TestUtils::integer(0)).await;
    env.exec_command_ok(&["SREM", "fruits", "mango"], TestUtils::integer(0))
        .await;
}

#[tokio::test]
async fn test_missing_set_reads_as_empty() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SCARD", "fruits"], TestUtils::integer(0)).await;
    env.exec_command_ok(&["SMEMBERS", "fruits"], TestUtils::bulk_array(&[]))
        .await;
}

#[tokio::test]
async fn test_set_commands_on_wrong_type() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SET", "grape", "1"], TestUtils::ok()).await;

    let test_cases = vec![
        (vec!["SADD", "grape", "x"], CommandError::WrongType),
        (vec!["SREM", "grape", "x"], CommandError::WrongType),
        (vec!["SMEMBERS", "grape"], CommandError::WrongType),
        (vec!["SCARD", "grape"], CommandError::WrongType),
        (vec!["SADD", "grape"], CommandError::WrongArity("sadd".to_string())),
        (vec!["SCARD"], CommandError::WrongArity("scard".to_string())),
    ];

    for (command, expected) in test_cases {
        env.exec_command_err(&command, expected).await;
    }
}

#[tokio::test]
async fn test_typed_set_api() {
    let env = TestEnv::new();
    let client = &env.client;

    assert_eq!(client.sadd("fruits", ["b", "a"]).await, Ok(2));
    assert_eq!(
        client.smembers("fruits").await,
        Ok(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(client.srem("fruits", ["a", "b"]).await, Ok(2));
    assert_eq!(client.exists(["fruits"]).await, Ok(0));
    assert_eq!(client.scard("fruits").await, Ok(0));
}

#[tokio::test]
async fn test_typed_set_api_without_members() {
    let env = TestEnv::new();
    let client = &env.client;

    assert_eq!(client.sadd("fruits", Vec::<String>::new()).await, Ok(0));
    assert_eq!(client.exists(["fruits"]).await, Ok(0));

    assert_eq!(client.sadd("fruits", ["a"]).await, Ok(1));
    assert_eq!(client.srem("fruits", Vec::<String>::new()).await, Ok(0));
    assert_eq!(client.scard("fruits").await, Ok(1));

    env.exec_command_ok(&["SET", "grape", "1"], TestUtils::ok()).await;
    assert_eq!(
        client.sadd("grape", Vec::<String>::new()).await,
        Err(CommandError::WrongType)
    );
}
