mod common;

use common::{TestEnv, TestUtils};
use redis_mock::{CommandError, Reply, SetCondition};
use serde_json::json;

#[tokio::test]
async fn test_json_set_and_get_whole_document() {
    let env = TestEnv::new();

    env.exec_command_ok(&["JSON.SET", "doc", "$", r#"{"a":1,"b":[1,2]}"#], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.GET", "doc"], Reply::Json(json!({"a": 1, "b": [1, 2]})))
        .await;
    env.exec_command_ok(&["JSON.GET", "missing"], Reply::Null).await;
}

#[tokio::test]
async fn test_json_get_paths() {
    let env = TestEnv::new();

    env.exec_command_ok(
        &["JSON.SET", "doc", "$", r#"{"a":{"n":1},"b":{"n":2}}"#],
        TestUtils::ok(),
    )
    .await;

    env.exec_command_ok(&["JSON.GET", "doc", "$.a.n"], Reply::Json(json!([1])))
        .await;
    env.exec_command_ok(&["JSON.GET", "doc", "$..n"], Reply::Json(json!([1, 2])))
        .await;
    env.exec_command_ok(&["JSON.GET", "doc", "$.zzz"], Reply::Json(json!([])))
        .await;
    env.exec_command_ok(
        &["JSON.GET", "doc", "$.a", "$.b.n"],
        Reply::Json(json!({"$.a": [{"n": 1}], "$.b.n": [2]})),
    )
    .await;
}

#[tokio::test]
async fn test_json_set_non_root_path() {
    let env = TestEnv::new();

    env.exec_command_err(&["JSON.SET", "doc", "$.a", "1"], CommandError::RootMustExist)
        .await;

    env.exec_command_ok(&["JSON.SET", "doc", "$", r#"{"a":1,"list":[{"x":1},{"x":2}]}"#], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.a", r#""two""#], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.list[*].x", "0"], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.nothing.here", "0"], Reply::Null)
        .await;

    env.exec_command_ok(
        &["JSON.GET", "doc"],
        Reply::Json(json!({"a": "two", "list": [{"x": 0}, {"x": 0}]})),
    )
    .await;
}

#[tokio::test]
async fn test_json_set_conditions() {
    let env = TestEnv::new();

    env.exec_command_ok(&["JSON.SET", "doc", "$", "1", "XX"], Reply::Null)
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.a", "1", "XX"], Reply::Null)
        .await;
    env.exec_command_ok(&["EXISTS", "doc"], TestUtils::integer(0)).await;
    env.exec_command_err(
        &["JSON.SET", "doc", "$.a", "1", "NX"],
        CommandError::RootMustExist,
    )
    .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$", r#"{"a":1}"#, "NX"], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$", "2", "NX"], Reply::Null)
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.a", "2", "NX"], Reply::Null)
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$.a", "3", "XX"], TestUtils::ok())
        .await;
    env.exec_command_ok(&["JSON.GET", "doc", "$.a"], Reply::Json(json!([3])))
        .await;
}

#[tokio::test]
async fn test_json_root_replace_keeps_expiration() {
    tokio::time::pause();
    let env = TestEnv::new();

    env.exec_command_ok(&["JSON.SET", "doc", "$", "{}"], TestUtils::ok())
        .await;
    env.exec_command_ok(&["PEXPIRE", "doc", "5000"], TestUtils::integer(1))
        .await;
    env.exec_command_ok(&["JSON.SET", "doc", "$", "[1]"], TestUtils::ok())
        .await;
    env.exec_command_ok(&["PTTL", "doc"], TestUtils::integer(5000)).await;
}

#[tokio::test]
async fn test_json_errors() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SET", "grape", "1"], TestUtils::ok()).await;
    env.exec_command_ok(&["JSON.SET", "doc", "$", "{}"], TestUtils::ok())
        .await;

    env.exec_command_err(&["JSON.GET", "grape"], CommandError::WrongType)
        .await;
    env.exec_command_err(&["JSON.SET", "grape", "$", "1"], CommandError::WrongType)
        .await;
    env.exec_command_err(&["GET", "doc"], CommandError::WrongType).await;
    env.exec_command_err(&["JSON.SET", "doc", "$", "1", "MAYBE"], CommandError::SyntaxError)
        .await;
    env.exec_command_err(&["JSON.SET", "doc", "$"], CommandError::WrongArity("json.set".to_string()))
        .await;

    assert!(matches!(
        env.exec_command(&["JSON.SET", "doc", "$", "{oops"]).await,
        Err(CommandError::InvalidJson(_))
    ));
    assert!(matches!(
        env.exec_command(&["JSON.GET", "doc", "$[?"]).await,
        Err(CommandError::InvalidJsonPath(_))
    ));
}

#[tokio::test]
async fn test_typed_json_api() {
    let env = TestEnv::new();
    let json = env.client.json();

    assert_eq!(
        json.set("doc", "$", json!({"name": "grape", "tags": ["a"]})).await,
        Ok(Some("OK".to_string()))
    );
    assert_eq!(
        json.set_with_condition("doc", "$", json!({}), SetCondition::Nx).await,
        Ok(None)
    );
    assert_eq!(
        json.get("doc", ["$.name"]).await,
        Ok(Some(json!(["grape"])))
    );
    assert_eq!(
        json.get("doc", Vec::<String>::new()).await,
        Ok(Some(json!({"name": "grape", "tags": ["a"]})))
    );
}
