//! Named tasks and their dispatch.
//!
//! The registry is built once at startup and handed to the runner together
//! with a [`RuntimeEnvironment`] borrowing the loaded configuration.

use crate::accounts::{AccountProvider, NetworkAccounts, ProviderError};
use crate::config::{Config, ConfigError, NetworkProfile};
use std::io::Write;
use thiserror::Error;
use tracing::debug;

/// Task error types
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task already registered: {0}")]
    Duplicate(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task '{task}' does not accept arguments: {}", .args.join(" "))]
    UnexpectedArguments { task: String, args: Vec<String> },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a task does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskHandler {
    /// Print the address of every account on the selected network
    Accounts,
    /// List the configured networks
    Networks,
    /// Print the resolved configuration
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    pub handler: TaskHandler,
}

/// Everything a running task can see.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeEnvironment<'a> {
    pub config: &'a Config,
    pub network: &'a NetworkProfile,
}

impl<'a> RuntimeEnvironment<'a> {
    /// Environment for the network selected when the configuration was loaded.
    pub fn new(config: &'a Config) -> Result<Self, ConfigError> {
        Ok(RuntimeEnvironment {
            config,
            network: config.selected()?,
        })
    }
}

/// Tasks in registration order.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<TaskDefinition>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in tasks.
    pub fn with_builtins() -> Result<Self, TaskError> {
        let mut registry = Self::new();
        registry.register("accounts", "Prints the list of accounts", TaskHandler::Accounts)?;
        registry.register(
            "networks",
            "Lists the configured networks",
            TaskHandler::Networks,
        )?;
        registry.register(
            "config",
            "Prints the resolved configuration (--json for JSON)",
            TaskHandler::Config,
        )?;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: TaskHandler,
    ) -> Result<(), TaskError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(TaskError::Duplicate(name));
        }
        self.tasks.push(TaskDefinition {
            name,
            description: description.into(),
            handler,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    /// Print the available tasks
    pub fn write_help(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "AVAILABLE TASKS:")?;
        writeln!(out)?;
        let width = self.tasks.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for task in &self.tasks {
            writeln!(out, "  {:width$}  {}", task.name, task.description, width = width)?;
        }
        Ok(())
    }

    /// Run the named task against `env`, writing its output to `out`.
    pub async fn run<W: Write>(
        &self,
        name: &str,
        args: &[String],
        env: &RuntimeEnvironment<'_>,
        out: &mut W,
    ) -> Result<(), TaskError> {
        let task = self
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;
        debug!(task = %task.name, network = %env.network.name, "running task");

        match task.handler {
            TaskHandler::Accounts => {
                no_arguments(&task.name, args)?;
                let provider = NetworkAccounts::for_network(env.network)?;
                print_accounts(&provider, out).await?;
            }
            TaskHandler::Networks => {
                no_arguments(&task.name, args)?;
                print_networks(env, out)?;
            }
            TaskHandler::Config => match args {
                [] => env.config.write_summary(out)?,
                [flag] if flag == "--json" => writeln!(out, "{}", env.config.to_json()?)?,
                _ => {
                    return Err(TaskError::UnexpectedArguments {
                        task: task.name.clone(),
                        args: args.to_vec(),
                    })
                }
            },
        }
        Ok(())
    }
}

fn no_arguments(task: &str, args: &[String]) -> Result<(), TaskError> {
    if args.is_empty() {
        return Ok(());
    }
    Err(TaskError::UnexpectedArguments {
        task: task.to_string(),
        args: args.to_vec(),
    })
}

/// Write one address per line in provider order; returns how many were written.
pub async fn print_accounts<P, W>(provider: &P, out: &mut W) -> Result<usize, TaskError>
where
    P: AccountProvider,
    W: Write,
{
    let accounts = provider.accounts().await?;
    for account in &accounts {
        writeln!(out, "{}", account)?;
    }
    out.flush()?;
    Ok(accounts.len())
}

fn print_networks<W: Write>(env: &RuntimeEnvironment<'_>, out: &mut W) -> Result<(), TaskError> {
    for profile in env.config.networks.values() {
        let marker = if profile.name == env.network.name { "*" } else { " " };
        let location = profile.url.as_deref().unwrap_or("(in-process)");
        match profile.chain_id {
            Some(id) => writeln!(out, "{} {} (chain {}) {}", marker, profile.name, id, location)?,
            None => writeln!(out, "{} {} {}", marker, profile.name, location)?,
        }
    }
    Ok(())
}
