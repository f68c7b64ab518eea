//! Server process startup and shutdown sequence

use crate::app::cli::Args;
use crate::core::error_handling::ContextualError;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version;
use crate::server::api::{LoggingSettings, RemoteCacheServer, ServerError, ServerSettings};
use clap::Parser;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Could not initialise logging: {message}")]
    Logging { message: String },

    #[error("Could not start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Logging { .. } => true,
            StartupError::Runtime(_) => false,
            StartupError::Server(error) => error.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Logging { message } => Some(message),
            StartupError::Runtime(_) => None,
            StartupError::Server(error) => error.user_message(),
        }
    }
}

pub type StartupResult<T> = Result<T, StartupError>;

/// Parse the command line and run the server until a shutdown signal
pub fn startup() -> StartupResult<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("remcache-worker")
        .build()
        .map_err(StartupError::Runtime)?;

    runtime.block_on(run(args))
}

/// Load settings, install logging and serve until shutdown is requested
pub async fn run(args: Args) -> StartupResult<()> {
    let settings = match ServerSettings::discover(args.config.as_deref()).await {
        Ok((settings, source)) => {
            let settings = args.apply_to(settings);
            start_logging(&settings.logging, args.color_enabled())?;
            match source {
                Some(path) => log::info!("Using settings from {}", path.display()),
                None => log::info!("Using default settings"),
            }
            settings
        }
        Err(error) => {
            // Report the failure through the logger the command line asked for
            let fallback = args.apply_to(ServerSettings::default());
            start_logging(&fallback.logging, args.color_enabled())?;
            return Err(ServerError::from(error).into());
        }
    };

    log::info!("{}", version::banner());

    let (coordinator, shutdown_rx) = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    let server = serve(settings)?;
    coordinator.wait(shutdown_rx).await;
    stop(&server);
    Ok(())
}

fn start_logging(logging: &LoggingSettings, color_enabled: bool) -> StartupResult<()> {
    init_logging(
        logging.level.as_deref(),
        logging.format.as_deref(),
        logging.file.as_deref(),
        color_enabled && logging.file.is_none(),
    )
    .map_err(|e| StartupError::Logging {
        message: e.to_string(),
    })
}

/// Build the server on the process-wide pool manager
pub fn serve(settings: ServerSettings) -> StartupResult<RemoteCacheServer> {
    Ok(RemoteCacheServer::new(settings)?)
}

/// Drop all registrations, then stop every pool
pub fn stop(server: &RemoteCacheServer) {
    log::info!("Shutting down remote cache server");
    let listeners = server.shutdown();
    let discarded = server.pool_manager().shutdown_all();
    log::info!(
        "Shutdown complete: {} listener(s) removed, {} queued task(s) discarded",
        listeners,
        discarded
    );
}
