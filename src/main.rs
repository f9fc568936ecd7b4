// float_cmp: only in tests where assert_eq! on f64 is intentional.
#![cfg_attr(test, allow(clippy::float_cmp))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{self, EnvFilter};

use volquant_engine::config::Config;
use volquant_engine::orchestrate;

#[derive(Parser)]
#[command(name = "volquant-engine", about = "Event-driven options volatility decision engine")]
struct Cli {
    /// Optional TOML config file; falls back to built-in defaults when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensures the session's input/output files exist for SYMBOL/DATE.
    Cmd {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(short = 'd', long)]
        date: String,
        /// Accepted for symmetry with `task`; unused by `cmd` itself.
        #[arg(short = 'c', long)]
        context: Option<String>,
        #[arg(long = "runtime-dir")]
        runtime_dir: Option<String>,
    },
    /// Validates input, runs the light feature path, appends an update record.
    Updated {
        #[arg(short = 'i', long)]
        input: PathBuf,
        #[arg(short = 'c', long = "output")]
        output: PathBuf,
    },
    /// Runs the full decision/strategy/strike/EV/gate pipeline.
    Task {
        #[arg(short = 'i', long)]
        input: PathBuf,
        #[arg(short = 'c', long = "output")]
        output: PathBuf,
        /// `rim=<f64>,conservative=<bool>`; see `orchestrate::ExternalContext`.
        #[arg(long)]
        context: Option<String>,
        /// Reserved for backtest mode; currently a no-op.
        #[arg(long)]
        replay: bool,
    },
}

fn apply_runtime_dir_override(config: &mut Config, runtime_dir: Option<&str>) {
    let Some(dir) = runtime_dir else {
        return;
    };
    config.runtime.runtime_dir = dir.to_string();
    config.runtime.inputs_dir = format!("{dir}/inputs");
    config.runtime.outputs_dir = format!("{dir}/outputs");
    config.runtime.logs_dir = format!("{dir}/logs");
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Cmd {
            symbol,
            date,
            context: _,
            runtime_dir,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            apply_runtime_dir_override(&mut config, runtime_dir.as_deref());
            let (input_path, output_path) = orchestrate::cmd_init(&symbol, &date, &config)?;
            println!("{}", input_path.display());
            println!("{}", output_path.display());
        }
        Commands::Updated { input, output } => {
            let config = Config::load(cli.config.as_deref())?;
            orchestrate::run_update(&input, &output, &config)?;
            println!("{}", output.display());
        }
        Commands::Task {
            input,
            output,
            context,
            replay,
        } => {
            if replay {
                tracing::info!("--replay accepted, backtest mode has no effect on the core today");
            }
            let config = Config::load(cli.config.as_deref())?;
            let external = orchestrate::parse_external_context(context.as_deref());
            orchestrate::run_task(&input, &output, &config, external).await?;
            println!("{}", output.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
