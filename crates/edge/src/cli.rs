// crates/edge/src/cli.rs

use adapt::{
    http::{build_app, AppOptions},
    mql::{load_json_file, FilterCache, QueryExecutor, RecordStore},
};
use axum::{http::HeaderValue, Router};
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub const SETTINGS_FILE: &str = "settings.toml";

/// Search service CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
    };

    result.map_or_else(
        |e| {
            error!("Search service failed: {}", e);
            ExitCode::FAILURE
        },
        |_| {
            info!("Search service stopped");
            ExitCode::SUCCESS
        },
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> Result<()> {
    let then = Instant::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start)?;
    info!("Settings parsed in {} milliseconds", then.elapsed().as_millis());

    let then = Instant::now();
    let process = process.load_dataset().await?;
    info!("Dataset loaded in {} milliseconds", then.elapsed().as_millis());

    let process = process.build_router()?;

    let process = process.bind().await?;
    process.serve().await
}

#[derive(Parser, Debug)]
#[command(name = "search-service", version, about = "Filtered search over a JSON dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the dataset configured in `<DIR>/settings.toml`
    Start(StartCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Directory holding settings.toml (or set SEARCH_SERVICE_DIR)
    #[arg(
        value_name = "DIR",
        env = "SEARCH_SERVICE_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

/// Read and deserialize `<dir>/settings.toml`.
pub fn read_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILE);

    if !path.exists() {
        return Err(Error::Config(format!(
            "{SETTINGS_FILE} not found at {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|err| Error::Config(format!("Failed reading {}: {}", path.display(), err)))?;

    toml::from_str(&text).map_err(|err| {
        Error::Config(format!(
            "Invalid {SETTINGS_FILE} at {}: {}",
            path.display(),
            err
        ))
    })
}

/// Translate settings into the HTTP layer's options.
pub fn app_options(settings: &Settings) -> Result<AppOptions> {
    let cors_origin = settings
        .server
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .map_err(|err| Error::Config(format!("Invalid cors_origin: {err}")))?;

    Ok(AppOptions {
        query_timeout: Duration::from_millis(settings.server.query_timeout_ms),
        cors_origin,
        max_concurrent_queries: settings.server.max_concurrent_queries,
    })
}

/// Executor over `store`, with a filter cache unless capacity is 0.
pub fn executor(settings: &Settings, store: Arc<dyn RecordStore>) -> QueryExecutor {
    let executor = QueryExecutor::new(store);
    match settings.query.filter_cache_capacity {
        0 => {
            debug!("filter cache disabled");
            executor
        }
        capacity => executor.with_cache(Arc::new(FilterCache::new(capacity))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    command: StartCmd,
    settings: Settings,
}

struct DatasetLoaded {
    settings: Settings,
    store: Arc<dyn RecordStore>,
}

struct RouterCreated {
    settings: Settings,
    router: Router,
}

struct Bound {
    router: Router,
    listener: TcpListener,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for DatasetLoaded {}
impl ProcessState for RouterCreated {}
impl ProcessState for Bound {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: StartCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = read_settings(&command.dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { command, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    async fn load_dataset(self) -> Result<StartProcess<DatasetLoaded>> {
        let path = self.state.command.dir.join(&self.state.settings.dataset.path);
        let store = load_json_file(&path).await?;

        if store.is_empty() {
            warn!("dataset {} holds no records", path.display());
        }

        Ok(StartProcess {
            state: DatasetLoaded {
                settings: self.state.settings,
                store: Arc::new(store),
            },
        })
    }
}

impl StartProcess<DatasetLoaded> {
    #[tracing::instrument(skip_all)]
    fn build_router(self) -> Result<StartProcess<RouterCreated>> {
        let options = app_options(&self.state.settings)?;
        let executor = executor(&self.state.settings, self.state.store);
        let router = build_app(Arc::new(executor), options);

        Ok(StartProcess {
            state: RouterCreated {
                settings: self.state.settings,
                router,
            },
        })
    }
}

impl StartProcess<RouterCreated> {
    #[tracing::instrument(skip_all)]
    async fn bind(self) -> Result<StartProcess<Bound>> {
        let addr = SocketAddr::new(self.state.settings.server.ip, self.state.settings.server.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;

        info!("listening on http://{}", listener.local_addr()?);

        Ok(StartProcess {
            state: Bound {
                router: self.state.router,
                listener,
            },
        })
    }
}

impl StartProcess<Bound> {
    #[tracing::instrument(skip_all)]
    async fn serve(self) -> Result<()> {
        axum::serve(self.state.listener, self.state.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
