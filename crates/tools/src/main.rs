use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use devkit_tools::config::{Config, LoadOptions, ENV_CONFIG, ENV_NETWORK};
use devkit_tools::logging;
use devkit_tools::tasks::{RuntimeEnvironment, TaskRegistry};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devkit")]
#[command(about = "Network profiles and tasks for smart-contract development")]
struct Cli {
    /// Path to devkit.toml
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Network to run against (defaults to default_network)
    #[arg(short, long, env = ENV_NETWORK)]
    network: Option<String>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Task to run; lists the available tasks when omitted
    task: Option<String>,

    /// Arguments passed to the task
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(|e| anyhow!(e))?;

    let registry = TaskRegistry::with_builtins()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let Some(task) = cli.task else {
        registry.write_help(&mut out)?;
        return Ok(());
    };

    let config = Config::load(&LoadOptions {
        config_path: cli.config,
        network: cli.network,
    })
    .context("failed to load configuration")?;
    let env = RuntimeEnvironment::new(&config)?;

    registry
        .run(&task, &cli.args, &env, &mut out)
        .await
        .with_context(|| format!("task '{}' failed", task))?;

    Ok(())
}
