//! Synchronous dispatch from the Lua interpreter into the async command
//! layer.
//!
//! A script runs on the blocking pool. Each `redis.call` sends one command to
//! the task awaiting the script and blocks the interpreter thread until that
//! command settles, so host commands run strictly one at a time and in the
//! order the script issued them.

use std::{
    cell::RefCell,
    sync::{Arc, Mutex},
};

use mlua::Lua;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{
    commands::{CommandError, CommandHandler, EvalArguments},
    key_value_store::SharedStore,
    reply::{self, Reply},
    scripting::lua,
};

/// Message from the interpreter thread to the task driving the script.
#[derive(Debug)]
pub(crate) enum HostMessage {
    Call {
        command: CommandHandler,
        response_tx: std::sync::mpsc::Sender<Result<Reply, CommandError>>,
    },
}

struct HostBridge {
    tx: mpsc::UnboundedSender<HostMessage>,
}

thread_local! {
    static HOST_BRIDGE: RefCell<Option<Arc<HostBridge>>> = const { RefCell::new(None) };
}

/// Installs the bridge on the current thread and clears it on drop, even if
/// the script panics.
struct HostBridgeGuard;

impl HostBridgeGuard {
    fn set(bridge: Arc<HostBridge>) -> Self {
        HOST_BRIDGE.with(|cell| {
            *cell.borrow_mut() = Some(bridge);
        });
        Self
    }
}

impl Drop for HostBridgeGuard {
    fn drop(&mut self) {
        HOST_BRIDGE.with(|cell| {
            *cell.borrow_mut() = None;
        });
    }
}

/// Hands `command` to the host and blocks until it has completed.
pub(crate) fn call_host(command: CommandHandler) -> Result<Reply, CommandError> {
    HOST_BRIDGE.with(|cell| {
        let bridge = cell.borrow();
        let Some(bridge) = bridge.as_ref() else {
            return Err(CommandError::ScriptError(
                "redis.call is only available while a script runs".to_string(),
            ));
        };

        let (response_tx, response_rx) = std::sync::mpsc::channel();
        bridge
            .tx
            .send(HostMessage::Call {
                command,
                response_tx,
            })
            .map_err(|_| CommandError::ScriptError("script host went away".to_string()))?;

        response_rx
            .recv()
            .map_err(|_| CommandError::ScriptError("script host dropped the call".to_string()))?
    })
}

/// One Lua VM shared by every clone of a client.
#[derive(Clone)]
pub struct ScriptingBridge {
    lua: Arc<Mutex<Lua>>,
}

impl std::fmt::Debug for ScriptingBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptingBridge").finish_non_exhaustive()
    }
}

impl ScriptingBridge {
    pub fn new() -> Result<Self, CommandError> {
        let lua = lua::create_vm().map_err(|e| lua::from_lua_error(&e))?;

        Ok(Self {
            lua: Arc::new(Mutex::new(lua)),
        })
    }

    /// Runs a script against `store` and encodes its first return value.
    pub async fn eval(
        &self,
        store: SharedStore,
        arguments: EvalArguments,
    ) -> Result<Reply, CommandError> {
        debug!(keys = ?arguments.keys, args = ?arguments.args, "running script");

        let (host_tx, mut host_rx) = mpsc::unbounded_channel::<HostMessage>();
        let bridge = Arc::new(HostBridge { tx: host_tx });
        let lua = Arc::clone(&self.lua);

        let mut script_handle = tokio::task::spawn_blocking(move || {
            let _guard = HostBridgeGuard::set(bridge);
            let lua = lua.lock().map_err(|_| {
                CommandError::ScriptError("scripting engine is poisoned".to_string())
            })?;
            lua::run(&lua, arguments)
        });

        let mut calls = 0usize;

        let result = loop {
            tokio::select! {
                result = &mut script_handle => break result,

                Some(message) = host_rx.recv() => {
                    match message {
                        HostMessage::Call { command, response_tx } => {
                            calls += 1;
                            trace!(command = %command.name, "script host call");

                            let reply = command.handle_command(Arc::clone(&store)).await;
                            let _ = response_tx.send(reply);
                        }
                    }
                }
            }
        };

        debug!(calls, "script finished");

        let value = result
            .map_err(|e| CommandError::ScriptError(format!("script panicked: {}", e)))??;

        reply::encode(value)
    }
}
