mod common;

use common::{TestEnv, TestUtils};
use redis_mock::{CommandError, ExpiryMode, Reply, SetOptions};
use serde_json::json;

#[tokio::test]
async fn test_multi_replays_in_order() {
    let env = TestEnv::new();

    let replies = env
        .client
        .multi()
        .incr("counter")
        .incr("counter")
        .get("counter")
        .exec()
        .await;

    assert_eq!(
        replies,
        Ok(vec![
            TestUtils::integer(1),
            TestUtils::integer(2),
            TestUtils::bulk("2"),
        ])
    );
}

#[tokio::test]
async fn test_multi_covers_the_json_group() {
    let env = TestEnv::new();

    let mut multi = env.client.multi();
    multi
        .json()
        .set("doc", "$", &json!({"a": 1}))
        .json()
        .set("doc", "$.a", &json!(2))
        .json()
        .get("doc", ["$.a"]);

    assert_eq!(multi.len(), 3);
    assert_eq!(
        multi.exec().await,
        Ok(vec![
            TestUtils::ok(),
            TestUtils::ok(),
            Reply::Json(json!([2])),
        ])
    );
    assert!(multi.is_empty());
}

#[tokio::test]
async fn test_multi_records_every_command_family() {
    let env = TestEnv::new();

    let replies = env
        .client
        .multi()
        .set("a", "1")
        .set_with_options("b", "2", SetOptions::new().nx())
        .set_nx("b", "3")
        .mget(["a", "b"])
        .sadd("s", ["x", "y"])
        .srem("s", ["y"])
        .smembers("s")
        .scard("s")
        .expire("a", 100, ExpiryMode::Always)
        .ttl("a")
        .keys("*")
        .exists(["a", "b", "s"])
        .del(["a"])
        .eval("return redis.call('get', KEYS[1])", ["b"], Vec::<String>::new())
        .exec()
        .await;

    assert_eq!(
        replies,
        Ok(vec![
            TestUtils::ok(),
            TestUtils::ok(),
            TestUtils::integer(0),
            TestUtils::bulk_array(&["1", "2"]),
            TestUtils::integer(2),
            TestUtils::integer(1),
            TestUtils::bulk_array(&["x"]),
            TestUtils::integer(1),
            TestUtils::integer(1),
            TestUtils::integer(100),
            TestUtils::bulk_array(&["a", "b", "s"]),
            TestUtils::integer(3),
            TestUtils::integer(1),
            TestUtils::bulk("2"),
        ])
    );
}

#[tokio::test]
async fn test_failing_step_aborts_without_rollback() {
    let env = TestEnv::new();

    env.exec_command_ok(&["SET", "word", "grape"], TestUtils::ok()).await;

    let mut multi = env.client.multi();
    multi.incr("counter").incr("word").incr("counter");

    assert_eq!(multi.exec().await, Err(CommandError::NotAnInteger));
    assert!(multi.is_empty());

    env.exec_command_ok(&["GET", "counter"], TestUtils::bulk("1")).await;
}

#[tokio::test]
async fn test_discard_drops_the_queue() {
    let env = TestEnv::new();

    let mut multi = env.client.multi();
    multi.set("grape", "1").flush_all();

    assert_eq!(multi.discard(), 2);
    assert_eq!(multi.exec().await, Ok(vec![]));
    env.exec_command_ok(&["EXISTS", "grape"], TestUtils::integer(0))
        .await;
}

#[tokio::test]
async fn test_textual_commands_are_resolved_when_recorded() {
    let env = TestEnv::new();

    let mut multi = env.client.multi();

    assert!(multi.command("set", ["grape", "1"]).is_ok());
    assert_eq!(
        multi.command("hset", ["grape"]).err(),
        Some(CommandError::UnknownCommand("hset".to_string()))
    );
    assert_eq!(multi.exec().await, Ok(vec![TestUtils::ok()]));
}
