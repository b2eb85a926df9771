//! Scriptable in-memory invoker for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::types::CommandArgs;

use super::command::Command;
use super::error::{BackendError, InvokeError};
use super::invoker::Invoker;

/// Mock invoker that records calls and replays scripted replies.
///
/// Commands without a scripted reply succeed with `null`.
#[derive(Debug, Default)]
pub struct MockInvoker {
    replies: Mutex<HashMap<Command, Result<Value, InvokeError>>>,
    calls: Mutex<Vec<(Command, CommandArgs)>>,
}

impl MockInvoker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful reply for `command`.
    pub fn respond(&self, command: Command, value: Value) {
        self.replies.lock().unwrap().insert(command, Ok(value));
    }

    /// Scripts a host failure with the given message for `command`.
    pub fn fail(&self, command: Command, message: impl Into<String>) {
        self.fail_with(command, BackendError::new(message).into());
    }

    /// Scripts an arbitrary failure for `command`.
    pub fn fail_with(&self, command: Command, error: InvokeError) {
        self.replies.lock().unwrap().insert(command, Err(error));
    }

    /// Scripts the same failure for every command.
    pub fn fail_all(&self, message: impl Into<String>) {
        let message = message.into();
        for command in Command::ALL {
            self.fail(command, message.clone());
        }
    }

    /// Returns all recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Command, CommandArgs)> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the arguments of the most recent call.
    #[must_use]
    pub fn last_args(&self) -> Option<CommandArgs> {
        self.calls.lock().unwrap().last().map(|(_, args)| args.clone())
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Invoker for MockInvoker {
    async fn invoke(&self, command: Command, args: CommandArgs) -> Result<Value, InvokeError> {
        self.calls.lock().unwrap().push((command, args));
        self.replies
            .lock()
            .unwrap()
            .get(&command)
            .cloned()
            .unwrap_or(Ok(Value::Null))
    }
}
