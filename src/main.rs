use anyhow::Context;
use binsight_lib::commands::{analyze, health, model, terminal};
use binsight_lib::config::{resolve_api_url, ClientConfig};
use binsight_lib::{HttpApiClient, WorkflowController};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "binsight", version, about = "Classify waste-bin photos against a remote model")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "BINSIGHT_API_URL", conflicts_with = "origin")]
    api_url: Option<Url>,

    /// Page origin to derive the backend from (loopback for localhost).
    #[arg(long)]
    origin: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up.
    Health,
    /// Analyze one or more images.
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Describe the model served by the backend.
    ModelInfo,
    /// Save the model weights as best.pt.
    DownloadModel {
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("binsight=info")),
        )
        .init();

    let cli = Cli::parse();

    let api_url = match (&cli.api_url, &cli.origin) {
        (Some(url), _) => url.clone(),
        (None, Some(origin)) => resolve_api_url(origin)?,
        (None, None) => ClientConfig::default().api_url,
    };
    let config = ClientConfig::new(api_url).with_request_timeout(Duration::from_secs(cli.timeout));
    tracing::info!(api_url = %config.api_url, "binsight starting");

    // Everything runs on one thread; suspension only happens at awaits.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(run(cli.command, config))
}

async fn run(command: Commands, config: ClientConfig) -> anyhow::Result<()> {
    let client = Arc::new(HttpApiClient::new(config.clone())?);

    match command {
        Commands::Health => {
            let status = health::check_health(client.as_ref()).await?;
            println!("{}", health::format_status(&status));
        }
        Commands::Analyze { files } => {
            let renderer = terminal::TerminalRenderer::new(std::io::stdout());
            let mut controller = WorkflowController::new(client, renderer, &config);
            controller.check_health();

            let summary = analyze::analyze_files(&mut controller, &files).await?;
            if let Some(stats) = controller.session().view().stats {
                println!("{}", terminal::format_stats(&stats));
            }
            tracing::info!(
                analyzed = summary.analyzed,
                rejected = summary.rejected,
                failed = summary.failed,
                "done"
            );
        }
        Commands::ModelInfo => {
            let info = client.model_info().await?;
            println!("{}", model::format_model_info(&info));
        }
        Commands::DownloadModel { output_dir } => {
            let path = model::download_model(client, &config, &output_dir).await?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}
