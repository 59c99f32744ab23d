//! External trainer process adapter

use std::process::Stdio;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Algorithm, Dataset};
use crate::metrics::{parse_trainer_output, MetricSet, TaskType};
use crate::Error;

/// Runs an external trainer and parses its JSON stdout.
///
/// Invocation: `program [args..] <location> <algorithm> <target> <task> [parameters]`,
/// where `<task>` is `classification` or `regression` and `[parameters]` is
/// a JSON object, only passed when set.
///
/// The child is killed if the invocation is abandoned.
#[derive(Debug, Clone)]
pub struct ProcessAlgorithm {
    name: String,
    task_type: TaskType,
    program: String,
    args: Vec<String>,
    parameters: Option<serde_json::Value>,
}

impl ProcessAlgorithm {
    /// Trainer `program` evaluating algorithm `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, task_type: TaskType, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task_type,
            program: program.into(),
            args: Vec::new(),
            parameters: None,
        }
    }

    /// Leading arguments (e.g. the script path for an interpreter).
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Hyperparameters passed as a trailing JSON argument.
    #[must_use]
    pub fn parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    fn command(&self, dataset: &Dataset) -> anyhow::Result<Command> {
        let location = dataset
            .location
            .as_deref()
            .ok_or_else(|| anyhow!("dataset '{}' has no location", dataset.name))?;
        let task = match self.task_type {
            TaskType::Classification => "classification",
            TaskType::Regression => "regression",
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(location)
            .arg(&self.name)
            .arg(dataset.target_column.as_deref().unwrap_or(""))
            .arg(task);
        if let Some(params) = &self.parameters {
            cmd.arg(params.to_string());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

/// Last stdout line that looks like a JSON object; trainers may print noise first.
fn json_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{'))
}

#[async_trait]
impl Algorithm for ProcessAlgorithm {
    fn name(&self) -> &str {
        &self.name
    }

    fn task_type(&self) -> TaskType {
        self.task_type
    }

    async fn evaluate(&self, dataset: &Dataset) -> anyhow::Result<MetricSet> {
        let output = self
            .command(dataset)?
            .output()
            .await
            .with_context(|| format!("failed to spawn trainer '{}'", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(algorithm = %self.name, status = %output.status, "trainer exited");

        let parsed = json_line(&stdout)
            .map(|line| parse_trainer_output(self.task_type, &self.name, line));

        match (output.status.success(), parsed) {
            (true, Some(Ok(set))) => Ok(set.with_algorithm_name(&self.name)),
            (_, Some(Err(Error::AlgorithmOutput(message)))) => Err(anyhow!(message)),
            (true, Some(Err(e))) => Err(anyhow!(e).context("unreadable trainer output")),
            (true, None) => Err(anyhow!("trainer printed no JSON result")),
            (false, _) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(anyhow!(
                    "trainer exited with {}: {}",
                    output.status,
                    stderr.trim()
                ))
            }
        }
    }
}
