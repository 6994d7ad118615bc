// crates/sentinel-providers/src/executor.rs
// ============================================================================
// Module: Shell Healing Executor
// Description: Runs a registered shell command per action type to enact a healing resolution.
// Purpose: Implement sentinel_core::HealingExecutor so selected resolutions actually do something.
// Dependencies: sentinel_core::{HealingExecutor, ExecutionError}, tokio::process
// ============================================================================

//! ## Overview
//! [`ShellHealingExecutor`] looks up `action_type` in a registered command
//! table, substitutes `{field}` placeholders from `action_details` into the
//! command's argument list, and runs it under a deadline (spec §5: "all I/O
//! carries an explicit deadline"). Exit status `0` is success; any other
//! status is a reported (not erroring) failure — per spec, "the action
//! running and reporting failure" is distinct from the executor being
//! unable to run it at all, which is an [`ExecutionError`].

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use sentinel_core::ActionId;
use sentinel_core::ExecutionError;
use sentinel_core::HealingExecutor;

/// One registered action's command template: a program and an argument
/// list where any argument of the form `{field}` is substituted from
/// `action_details` at execution time.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    /// Program to invoke.
    pub program: String,
    /// Argument list, `{field}`-templated.
    pub args: Vec<String>,
}

/// Executes healing actions as registered shell commands.
#[derive(Debug, Clone, Default)]
pub struct ShellHealingExecutor {
    commands: HashMap<String, CommandTemplate>,
    timeout: Duration,
}

impl ShellHealingExecutor {
    /// Builds an executor with no registered actions and a 60s default
    /// per-execution timeout; register actions via [`Self::register`].
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { commands: HashMap::new(), timeout }
    }

    /// Registers (or replaces) the command run for `action_type`.
    pub fn register(&mut self, action_type: impl Into<String>, template: CommandTemplate) {
        self.commands.insert(action_type.into(), template);
    }

    fn render(
        template: &CommandTemplate,
        details: &serde_json::Map<String, serde_json::Value>,
    ) -> Vec<String> {
        template
            .args
            .iter()
            .map(|arg| {
                if let Some(field) = arg.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
                    details.get(field).map_or_else(String::new, value_as_arg)
                } else {
                    arg.clone()
                }
            })
            .collect()
    }
}

fn value_as_arg(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl HealingExecutor for ShellHealingExecutor {
    async fn execute(
        &self,
        action_id: &ActionId,
        action_type: &str,
        action_details: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(bool, serde_json::Value), ExecutionError> {
        let Some(template) = self.commands.get(action_type) else {
            return Err(ExecutionError::UnknownActionType(action_type.to_string()));
        };

        let rendered_args = Self::render(template, action_details);
        let mut command = tokio::process::Command::new(&template.program);
        command
            .args(&rendered_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_elapsed| ExecutionError::Timeout(self.timeout))?
            .map_err(|error| ExecutionError::Unavailable(error.to_string()))?;

        let succeeded = output.status.success();
        let details = serde_json::json!({
            "action_id": action_id.as_str(),
            "exit_code": output.status.code(),
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        });
        Ok((succeeded, details))
    }
}
