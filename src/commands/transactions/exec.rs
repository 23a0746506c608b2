use tracing::debug;

use crate::{
    commands::{transactions::Multi, CommandError},
    reply::Reply,
};

impl Multi {
    /// Replays the recorded commands in order and collects their replies.
    ///
    /// The queue is emptied whatever the outcome. The first failing command
    /// aborts the replay and its error is returned; commands that already ran
    /// keep their effects.
    pub async fn exec(&mut self) -> Result<Vec<Reply>, CommandError> {
        let commands = std::mem::take(&mut self.queue);
        debug!(commands = commands.len(), "replaying transaction");

        let mut replies = Vec::with_capacity(commands.len());

        for command in commands {
            replies.push(self.client.dispatch(command).await?);
        }

        Ok(replies)
    }
}
