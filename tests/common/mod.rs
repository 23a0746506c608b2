#![allow(dead_code)]

use bytes::Bytes;
use redis_mock::{
    create_client,
    key_value_store::{KeyValueStore, SharedStore},
    Client, CommandError, Reply,
};

/// Test utilities for simplifying command tests
pub struct TestUtils;

impl TestUtils {
    pub fn ok() -> Reply {
        Reply::SimpleString("OK".to_string())
    }

    pub fn bulk(value: &str) -> Reply {
        Reply::BulkString(Bytes::from(value.to_string()))
    }

    pub fn integer(value: i64) -> Reply {
        Reply::Integer(value)
    }

    pub fn bulk_array(values: &[&str]) -> Reply {
        Reply::Array(values.iter().map(|v| Self::bulk(v)).collect())
    }
}

/// Test environment wrapping one client
pub struct TestEnv {
    pub client: Client,
    pub store: SharedStore,
}

impl TestEnv {
    pub fn new() -> Self {
        let client = create_client().expect("client should start");
        let store = client.store();

        Self { client, store }
    }

    /// Execute a command given as `[name, args...]`
    pub async fn exec_command(&self, command: &[&str]) -> Result<Reply, CommandError> {
        let (name, arguments) = command.split_first().expect("command needs a name");
        self.client
            .execute(name, arguments.iter().map(|argument| argument.to_string()))
            .await
    }

    /// Execute a command and assert it succeeds with the expected reply
    pub async fn exec_command_ok(&self, command: &[&str], expected: Reply) {
        assert_eq!(
            self.exec_command(command).await,
            Ok(expected),
            "running {:?}",
            command
        );
    }

    /// Execute a command and assert it fails with the expected error
    pub async fn exec_command_err(&self, command: &[&str], expected: CommandError) {
        assert_eq!(
            self.exec_command(command).await,
            Err(expected),
            "running {:?}",
            command
        );
    }

    /// Get a reference to the store for inspection
    pub async fn get_store(&self) -> tokio::sync::MutexGuard<'_, KeyValueStore> {
        self.store.lock().await
    }
}
