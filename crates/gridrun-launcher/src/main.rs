//! GridRun Launcher Server

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridrun_launcher::dispatch::AsyncDispatcher;
use gridrun_launcher::fetch::WhitelistedFetcher;
use gridrun_launcher::lifecycle::TaskLifecycleCoordinator;
use gridrun_launcher::mapper::FileResourceMapper;
use gridrun_launcher::reference::ReferenceDocumentParser;
use gridrun_launcher::storage::S3Presigner;
use gridrun_launcher::{
    http, AppState, AutoLauncher, Config, LaunchGate, LaunchService, ManualLauncher, StorageConfig,
};
use gridrun_task_client::{ComputeClient, StatusUpdatePublisher, TaskManagerClient};

/// GridRun launcher: starts compute runs for ready tasks.
#[derive(Parser, Debug)]
#[command(name = "gridrun-launcher", about = "Starts compute runs for ready tasks")]
struct Args {
    /// HTTP server address
    #[arg(long, env = "GRIDRUN_HTTP_ADDR", default_value = "0.0.0.0:8080")]
    http_addr: String,

    /// Task manager URL, the task timestamp is appended to it
    #[arg(long, env = "GRIDRUN_TASK_MANAGER_TIMESTAMP_URL", default_value = "http://localhost:8081/tasks/")]
    task_manager_timestamp_url: String,

    /// File types triggering an automatic launch (comma-separated)
    #[arg(long, env = "GRIDRUN_AUTO_TRIGGER_FILETYPES", value_delimiter = ',')]
    auto_trigger_filetypes: Vec<String>,

    /// URL prefixes documents may be downloaded from (comma-separated)
    #[arg(long, env = "GRIDRUN_WHITELIST", value_delimiter = ',', default_value = "http://localhost:9000")]
    whitelist: Vec<String>,

    /// Compute engine run endpoint
    #[arg(long, env = "GRIDRUN_COMPUTE_URL", default_value = "http://localhost:8082/run")]
    compute_url: String,

    /// Task status update endpoint
    #[arg(long, env = "GRIDRUN_STATUS_UPDATE_URL", default_value = "http://localhost:8081/tasks/status-update")]
    status_update_url: String,

    /// Object storage endpoint
    #[arg(long, env = "GRIDRUN_STORAGE_ENDPOINT", default_value = "http://localhost:9000")]
    storage_endpoint: String,

    /// Object storage region
    #[arg(long, env = "GRIDRUN_STORAGE_REGION", default_value = "us-east-1")]
    storage_region: String,

    /// Object storage access key
    #[arg(long, env = "GRIDRUN_STORAGE_ACCESS_KEY", default_value = "gridrun")]
    storage_access_key: String,

    /// Object storage secret key
    #[arg(long, env = "GRIDRUN_STORAGE_SECRET_KEY", default_value = "gridrun", hide_env_values = true)]
    storage_secret_key: String,

    /// Lifetime of presigned download URLs in hours
    #[arg(long, env = "GRIDRUN_PRESIGNED_URL_EXPIRY_HOURS", default_value = "1")]
    presigned_url_expiry_hours: u32,

    /// Capacity of the task update queue
    #[arg(long, default_value = "64")]
    notification_buffer: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            http_addr: args.http_addr,
            task_manager_timestamp_url: args.task_manager_timestamp_url,
            auto_trigger_filetypes: args.auto_trigger_filetypes,
            whitelist: args.whitelist,
            compute_url: args.compute_url,
            status_update_url: args.status_update_url,
            storage: StorageConfig {
                endpoint: args.storage_endpoint,
                region: args.storage_region,
                access_key: args.storage_access_key,
                secret_key: args.storage_secret_key,
            },
            presigned_url_expiry_hours: args.presigned_url_expiry_hours,
            notification_buffer: args.notification_buffer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from(Args::parse());

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gridrun=info".parse()?))
        .with_target(true)
        .init();

    let http_addr: SocketAddr = config.http_addr.parse()?;

    // Collaborators
    let tasks = Arc::new(TaskManagerClient::new(&config.task_manager_timestamp_url));
    let publisher = Arc::new(StatusUpdatePublisher::new(&config.status_update_url));
    let compute = Arc::new(ComputeClient::new(&config.compute_url));
    let storage = Arc::new(S3Presigner::new(&config.storage)?);
    let fetcher = Arc::new(WhitelistedFetcher::new(config.whitelist.clone()));

    let launcher = LaunchService::new(
        LaunchGate::new(),
        ReferenceDocumentParser::new(fetcher),
        FileResourceMapper::new(storage, config.presigned_url_expiry_hours),
        TaskLifecycleCoordinator::new(tasks.clone(), publisher),
        AsyncDispatcher::new(compute),
    );

    // Automatic launches
    let (tx, rx) = mpsc::channel(config.notification_buffer);
    let auto = AutoLauncher::new(
        tasks.clone(),
        launcher.clone(),
        config.auto_trigger_filetypes.clone(),
    );
    tokio::spawn(async move { auto.consume(ReceiverStream::new(rx)).await });

    // HTTP server
    let state = Arc::new(AppState::new(ManualLauncher::new(tasks, launcher), tx));
    let router = http::create_router(state);

    info!(
        http_addr = %http_addr,
        task_manager = %config.task_manager_timestamp_url,
        trigger_types = ?config.auto_trigger_filetypes,
        "Starting GridRun launcher"
    );

    let listener = TcpListener::bind(http_addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
