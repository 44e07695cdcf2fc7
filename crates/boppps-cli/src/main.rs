mod config;
mod generate_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use boppps_core::LessonPlanner;
use boppps_core::llm::ChatCompletionsClient;

use config::{BopppsConfig, CliOverrides};
use generate_cmd::GenerateArgs;

#[derive(Parser)]
#[command(name = "boppps", about = "BOPPPS lesson plan generator")]
struct Cli {
    /// Model identifier (overrides BOPPPS_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat-completion base URL (overrides BOPPPS_BASE_URL env var)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for generated documents (overrides BOPPPS_OUTPUT_DIR env var)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a boppps config file
    Init {
        /// API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Serve the lesson plan form over HTTP
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one lesson plan and print the document path
    Generate(GenerateArgs),
}

/// Execute the `boppps init` command: write config file.
fn cmd_init(api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let masked = api_key.as_deref().map(config::mask_secret);
    let cfg = config::default_config_file(api_key);
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match masked {
        Some(masked) => println!("  llm.api_key = {masked}"),
        None => println!(
            "  llm.api_key not set; export {} or edit the file",
            config::API_KEY_ENV
        ),
    }
    println!();
    println!("Next: run `boppps serve` and open the form in a browser.");

    Ok(())
}

/// Build the planner from resolved configuration.
fn build_planner(resolved: &BopppsConfig) -> LessonPlanner {
    if resolved.api_key.is_none() {
        tracing::warn!(
            "no API key configured ({} unset); completion requests will be unauthenticated",
            config::API_KEY_ENV
        );
    }
    let client = ChatCompletionsClient::new(resolved.base_url.clone(), resolved.api_key.clone());
    LessonPlanner::new(
        Arc::new(client),
        resolved.planner.clone(),
        resolved.output.clone(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut overrides = CliOverrides {
        model: cli.model,
        base_url: cli.base_url,
        output_dir: cli.output_dir,
        ..Default::default()
    };

    match cli.command {
        Commands::Init { api_key, force } => {
            cmd_init(api_key, force)?;
        }
        Commands::Serve { bind, port } => {
            overrides.bind = bind;
            overrides.port = port;
            let resolved = BopppsConfig::resolve(&overrides)?;
            tracing::info!(
                model = %resolved.planner.model,
                output_dir = %resolved.output.root().display(),
                "starting lesson plan server"
            );
            let planner = Arc::new(build_planner(&resolved));
            serve_cmd::run_serve(planner, &resolved.bind, resolved.port).await?;
        }
        Commands::Generate(args) => {
            let resolved = BopppsConfig::resolve(&overrides)?;
            let planner = build_planner(&resolved);
            match generate_cmd::run_generate(&planner, args).await {
                Ok(plan) => println!("{}", plan.path.display()),
                Err(err) => {
                    eprintln!("{}", err.user_message());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
